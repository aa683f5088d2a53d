//! Turn hrStorage rows into a check result

use itertools::Itertools;
use tracing::debug;

use remote_check_plugins::snmp::{DeviceRow, SnmpError, StorageTable};
use remote_check_plugins::{CheckResult, Status};

use crate::args::CheckConfig;

/// How many description rows the initial GET-BULK asks for
pub(crate) const MAX_TABLE_ROWS: u32 = 200;

/// Where one storage area falls relative to the thresholds
///
/// Both comparisons are strict: sitting exactly on a threshold is not over it.
pub(crate) fn classify(percent: f64, warning: u32, critical: u32) -> Status {
    if percent > f64::from(critical) {
        Status::Critical
    } else if percent > f64::from(warning) {
        Status::Warning
    } else {
        Status::Ok
    }
}

/// Round to two decimals and always show at least one, e.g. `90.0`, `33.33`
pub(crate) fn format_percent(percent: f64) -> String {
    format!("{:?}", (percent * 100.0).round() / 100.0)
}

/// The storage areas that crossed a threshold
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Usage {
    critical: Vec<String>,
    warning: Vec<String>,
}

impl Usage {
    pub fn record(&mut self, row: &DeviceRow, percent: f64, status: Status) {
        let entry = format!("{} = {}%", row.description, format_percent(percent));
        match status {
            Status::Critical => self.critical.push(entry),
            Status::Warning => self.warning.push(entry),
            Status::Ok | Status::Unknown => {}
        }
    }

    /// Critical rows first, then warning rows
    pub fn summary(&self) -> String {
        self.critical.iter().chain(self.warning.iter()).join(", ")
    }

    pub fn into_result(self, warning: u32) -> CheckResult {
        if !self.critical.is_empty() {
            CheckResult::new(Status::Critical, self.summary())
        } else if !self.warning.is_empty() {
            CheckResult::new(Status::Warning, self.summary())
        } else {
            CheckResult::new(Status::Ok, format!("All disk usage under {}%", warning))
        }
    }
}

/// Indexes of every row whose description matches the mount point pattern
pub(crate) fn matching_indexes(descriptions: &[(u64, String)], config: &CheckConfig) -> Vec<u64> {
    descriptions
        .iter()
        .filter(|&&(_, ref description)| config.mount_point.is_match(description))
        .map(|&(index, _)| index)
        .collect()
}

/// Run the whole check against a storage table
///
/// Any failed request aborts the check, so a partial view of the table never
/// produces a warning or critical result.
pub(crate) fn check_disks<T: StorageTable>(
    table: &mut T,
    config: &CheckConfig,
) -> Result<CheckResult, SnmpError> {
    let descriptions = table.descriptions(MAX_TABLE_ROWS)?;
    let indexes = matching_indexes(&descriptions, config);
    debug!(
        "{} of {} devices match {}",
        indexes.len(),
        descriptions.len(),
        config.mount_point
    );

    let mut usage = Usage::default();
    for index in indexes {
        let row = table.row(index)?;
        if config.is_ignored(row.mount_point()) {
            debug!("ignoring {}", row.description);
            continue;
        }
        let percent = match row.percent_used() {
            Some(percent) => percent,
            None => {
                debug!("skipping {}: reports zero size", row.description);
                continue;
            }
        };
        let status = classify(percent, config.warning, config.critical);
        debug!(
            "{} {:.2}% used ({} of {} bytes): {}",
            row.description,
            percent,
            row.used_bytes(),
            row.size_bytes(),
            status
        );
        usage.record(&row, percent, status);
    }

    Ok(usage.into_result(config.warning))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use regex::Regex;

    use remote_check_plugins::snmp::{DeviceRow, SnmpError, SnmpVersion, StorageTable};
    use remote_check_plugins::{CheckResult, Status};

    use super::*;
    use crate::args::CheckConfig;

    /// An in-memory hrStorage table
    struct FakeTable {
        rows: Vec<DeviceRow>,
        unresponsive_at: Option<u64>,
        rows_read: Vec<u64>,
    }

    impl FakeTable {
        fn new(rows: &[(&str, u64, u64)]) -> FakeTable {
            FakeTable {
                rows: rows
                    .iter()
                    .enumerate()
                    .map(|(i, &(description, used, size))| DeviceRow {
                        index: i as u64 + 1,
                        description: description.to_owned(),
                        allocation_units: 4096,
                        size,
                        used,
                    })
                    .collect(),
                unresponsive_at: None,
                rows_read: Vec::new(),
            }
        }
    }

    impl StorageTable for FakeTable {
        fn descriptions(&mut self, max_rows: u32) -> Result<Vec<(u64, String)>, SnmpError> {
            Ok(self
                .rows
                .iter()
                .take(max_rows as usize)
                .map(|row| (row.index, row.description.clone()))
                .collect())
        }

        fn row(&mut self, index: u64) -> Result<DeviceRow, SnmpError> {
            if self.unresponsive_at == Some(index) {
                return Err(SnmpError::Timeout {
                    host: "10.0.0.9".into(),
                });
            }
            self.rows_read.push(index);
            Ok(self.rows[index as usize - 1].clone())
        }
    }

    fn config(pattern: &str, ignore: &[&str], warning: u32, critical: u32) -> CheckConfig {
        CheckConfig {
            host: "10.0.0.9".into(),
            community: "public".into(),
            mount_point: Regex::new(pattern).unwrap(),
            ignore_mnt: ignore.iter().map(|s| s.to_string()).collect(),
            warning,
            critical,
            snmp_version: SnmpVersion::V2c,
            timeout: Duration::from_secs(1),
        }
    }

    fn run(table: &mut FakeTable, config: &CheckConfig) -> CheckResult {
        check_disks(table, config).unwrap()
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify(80.0, 80, 90), Status::Ok);
        assert_eq!(classify(80.01, 80, 90), Status::Warning);
        assert_eq!(classify(90.0, 80, 90), Status::Warning);
        assert_eq!(classify(90.5, 80, 90), Status::Critical);
        assert_eq!(classify(0.0, 80, 90), Status::Ok);
        assert_eq!(classify(100.0, 80, 90), Status::Critical);
    }

    #[test]
    fn percentages_display_like_floats() {
        assert_eq!(format_percent(90.0), "90.0");
        assert_eq!(format_percent(100.0 / 3.0), "33.33");
        assert_eq!(format_percent(12.5), "12.5");
        assert_eq!(format_percent(85.456), "85.46");
    }

    #[test]
    fn one_row_over_warning() {
        let mut table = FakeTable::new(&[("/data", 90, 100), ("/tmp", 50, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &[], 80, 95)),
            CheckResult::new(Status::Warning, "/data = 90.0%")
        );
    }

    #[test]
    fn one_row_over_critical() {
        let mut table = FakeTable::new(&[("/data", 90, 100), ("/tmp", 50, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &[], 80, 85)),
            CheckResult::new(Status::Critical, "/data = 90.0%")
        );
    }

    #[test]
    fn critical_message_lists_critical_then_warning() {
        let mut table = FakeTable::new(&[("/var", 82, 100), ("/data", 97, 100), ("/", 10, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &[], 80, 90)),
            CheckResult::new(Status::Critical, "/data = 97.0%, /var = 82.0%")
        );
    }

    #[test]
    fn no_matches_is_ok() {
        let mut table = FakeTable::new(&[("Physical memory", 90, 100), ("Swap space", 99, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &[], 80, 90)),
            CheckResult::new(Status::Ok, "All disk usage under 80%")
        );
        assert!(table.rows_read.is_empty());
    }

    #[test]
    fn only_matching_rows_are_read() {
        let mut table = FakeTable::new(&[("/", 10, 100), ("Physical memory", 99, 100), ("/mnt/a", 10, 100)]);
        run(&mut table, &config("/", &[], 80, 90));
        assert_eq!(table.rows_read, vec![1, 3]);
    }

    #[test]
    fn pattern_is_a_regex() {
        let mut table = FakeTable::new(&[("/mnt/a", 95, 100), ("/mnt/b", 95, 100), ("/srv", 95, 100)]);
        assert_eq!(
            run(&mut table, &config("^/mnt/[ab]$", &[], 80, 90)),
            CheckResult::new(Status::Critical, "/mnt/a = 95.0%, /mnt/b = 95.0%")
        );
    }

    #[test]
    fn trailing_comma_pins_a_labelled_device() {
        let mut table = FakeTable::new(&[("/, ext4", 95, 100), ("/boot, ext4", 95, 100)]);
        assert_eq!(
            run(&mut table, &config("^/,", &[], 80, 90)),
            CheckResult::new(Status::Critical, "/, ext4 = 95.0%")
        );
    }

    #[test]
    fn ignored_rows_do_not_count() {
        let mut table = FakeTable::new(&[("/boot", 99, 100), ("/data", 85, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &["/boot"], 80, 90)),
            CheckResult::new(Status::Warning, "/data = 85.0%")
        );

        let mut table = FakeTable::new(&[("/boot,vfat", 99, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &["/boot"], 80, 90)),
            CheckResult::new(Status::Ok, "All disk usage under 80%")
        );
    }

    #[test]
    fn zero_sized_rows_are_skipped() {
        let mut table = FakeTable::new(&[("/proc", 0, 0), ("/", 10, 100)]);
        assert_eq!(
            run(&mut table, &config("/", &[], 80, 90)),
            CheckResult::new(Status::Ok, "All disk usage under 80%")
        );
    }

    #[test]
    fn timeout_aborts_without_partial_result() {
        let mut table = FakeTable::new(&[("/data", 99, 100), ("/var", 99, 100)]);
        table.unresponsive_at = Some(2);
        match check_disks(&mut table, &config("/", &[], 80, 90)) {
            Err(e) => assert_eq!(e.to_string(), "10.0.0.9 not responding"),
            Ok(result) => panic!("expected a timeout, got {:?}", result),
        }
    }

    #[test]
    fn repeated_runs_agree() {
        let rows = [("/data", 90, 100), ("/tmp", 50, 100)];
        let config = config("/", &[], 80, 95);
        let first = run(&mut FakeTable::new(&rows), &config);
        let second = run(&mut FakeTable::new(&rows), &config);
        assert_eq!(first, second);
    }
}
