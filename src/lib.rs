//! Remote check plugins: Sensu-style checks that talk to other machines
//!
//! Every binary in this crate follows the check-plugin convention: it
//! prints a short status line (or Graphite metric lines) to stdout and exits
//! with one of the codes described by [`Status`]. Diagnostics go to stderr
//! via [`logging::init`], so stdout stays parseable by the agent.
//!
//! The scripts themselves are documented in [`scripts`].

use std::ffi::OsString;
use std::fmt;
use std::process;
use std::str::FromStr;

use regex::Regex;
use structopt::clap::ErrorKind;
use structopt::StructOpt;

pub mod couchbase;
pub mod logging;
pub mod metrics;
pub mod scripts;
pub mod snmp;

/// The final state of a check, ordered by severity
///
/// `max` over several statuses gives the worst one.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Exit the process with the code the check agent expects for this status
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn str_values() -> [&'static str; 4] {
        ["ok", "warning", "critical", "unknown"]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", msg)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Status, String> {
        match s.to_ascii_lowercase().as_ref() {
            "ok" => Ok(Status::Ok),
            "warn" | "warning" => Ok(Status::Warning),
            "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(format!(
                "Unexpected exit status: {} (expected one of {})",
                s,
                Status::str_values().join(", ")
            )),
        }
    }
}

/// A status together with the one-line message that explains it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    pub status: Status,
    pub message: String,
}

impl CheckResult {
    pub fn new<S: Into<String>>(status: Status, message: S) -> CheckResult {
        CheckResult {
            status,
            message: message.into(),
        }
    }

    pub fn unknown<S: Into<String>>(message: S) -> CheckResult {
        CheckResult::new(Status::Unknown, message)
    }

    /// The line printed to stdout, e.g. `WARNING [check-snmp-disk]: / = 85.0%`
    pub fn line(&self, check_name: &str) -> String {
        format!("{} [{}]: {}", self.status, check_name, self.message)
    }

    /// Print the status line and exit with the matching code
    pub fn report(self, check_name: &str) -> ! {
        println!("{}", self.line(check_name));
        self.status.exit()
    }
}

/// Parse the command line, turning usage errors into an UNKNOWN result
///
/// `--help` and `--version` still print and exit 0. Anything else clap
/// rejects is reported through the check protocol instead of clap's own
/// exit code 1, which the agent would read as WARNING.
pub fn parse_args<T, I>(argv: I) -> Result<T, CheckResult>
where
    T: StructOpt,
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    T::from_iter_safe(argv).map_err(|e| match e.kind {
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
        _ => CheckResult::unknown(usage_message(&e.message)),
    })
}

/// The first line of a clap error, without colours or its `error: ` prefix
fn usage_message(message: &str) -> String {
    let plain = match Regex::new(r"\x1b\[[0-9;]*m") {
        Ok(ansi) => ansi.replace_all(message, "").into_owned(),
        Err(_) => message.to_owned(),
    };
    let first = plain.lines().next().unwrap_or("").trim();
    first.trim_start_matches("error:").trim().to_owned()
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use super::{parse_args, usage_message, CheckResult, Status};

    #[derive(Debug, StructOpt)]
    struct Opts {
        #[structopt(short = "w", default_value = "80")]
        warning: u32,
    }

    #[test]
    fn statuses_are_ordered_by_severity() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(Status::Critical < Status::Unknown);
        assert_eq!(
            std::cmp::max(Status::Warning, Status::Critical),
            Status::Critical
        );
    }

    #[test]
    fn exit_codes_follow_plugin_convention() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Warning.code(), 1);
        assert_eq!(Status::Critical.code(), 2);
        assert_eq!(Status::Unknown.code(), 3);
    }

    #[test]
    fn parse_accepts_every_advertised_value() {
        for s in &Status::str_values() {
            assert!(s.parse::<Status>().is_ok());
        }
        assert_eq!("warn".parse::<Status>(), Ok(Status::Warning));
        assert_eq!("CRITICAL".parse::<Status>(), Ok(Status::Critical));
        assert!("bad".parse::<Status>().is_err());
    }

    #[test]
    fn status_line_includes_check_name() {
        let result = CheckResult::new(Status::Warning, "/data = 90.0%");
        assert_eq!(
            result.line("check-snmp-disk"),
            "WARNING [check-snmp-disk]: /data = 90.0%"
        );
    }

    #[test]
    fn usage_message_is_one_plain_line() {
        assert_eq!(
            usage_message("\u{1b}[1;31merror:\u{1b}[0m Found argument '-x'\n\nUSAGE:\n    check"),
            "Found argument '-x'"
        );
    }

    #[test]
    fn good_arguments_parse() {
        let opts: Opts = parse_args(vec!["check", "-w", "70"]).unwrap();
        assert_eq!(opts.warning, 70);
    }

    #[test]
    fn bad_arguments_are_unknown() {
        let err = parse_args::<Opts, _>(vec!["check", "-w", "abc"]).unwrap_err();
        assert_eq!(err.status, Status::Unknown);
        assert!(err.message.contains("-w <warning>"), "{}", err.message);
        assert!(!err.message.starts_with("error:"), "{}", err.message);
        assert!(!err.message.contains('\n'), "{}", err.message);

        let err = parse_args::<Opts, _>(vec!["check", "--nope"]).unwrap_err();
        assert_eq!(err.status, Status::Unknown);
        assert!(err.message.contains("--nope"), "{}", err.message);
    }
}
