use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use structopt::clap::AppSettings;
use structopt::StructOpt;

use remote_check_plugins::snmp::SnmpVersion;

/// Check disk usage on a remote host over SNMP
///
/// Walks the hrStorage table of the agent, picks every storage area whose
/// description matches the mount point pattern, and compares how full it is
/// against the thresholds.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-snmp-disk (part of remote-check-plugins)",
    setting = AppSettings::ColoredHelp,
    after_help = "About Mount Points:

    The mount point is a regular expression matched anywhere in the device
    description, so `-m /` matches every mounted file system. To match one
    device exactly, add a comma to the pattern:

        check-snmp-disk -h host -C public -m /,

    To list the device descriptions your agent reports, run:

        snmpwalk -v2c -c public host 1.3.6.1.2.1.25.2.3.1.3"
)]
pub(crate) struct Args {
    #[structopt(short = "h", long = "host", default_value = "127.0.0.1", help = "SNMP agent to query")]
    pub host: String,
    #[structopt(short = "C", long = "community", default_value = "public", help = "SNMP community")]
    pub community: String,
    #[structopt(
        short = "m",
        long = "mount-point",
        default_value = "/",
        help = "Regex matched against device descriptions"
    )]
    pub mount_point: Regex,
    #[structopt(
        short = "i",
        long = "ignore-mnt",
        help = "Ignore mount point(s), e.g. /boot,/run"
    )]
    pub ignore_mnt: Option<MountList>,
    #[structopt(short = "w", long = "warning", default_value = "80", help = "Percent used to warn at")]
    pub warning: u32,
    #[structopt(short = "c", long = "critical", default_value = "90", help = "Percent used to go critical at")]
    pub critical: u32,
    #[structopt(
        short = "v",
        long = "snmp-version",
        default_value = "SNMPv2c",
        help = "SNMP version to use (SNMPv1, SNMPv2c)"
    )]
    pub snmp_version: SnmpVersion,
    #[structopt(short = "t", long = "timeout", default_value = "1", help = "Request timeout in seconds")]
    pub timeout: u64,
}

/// A comma separated list of mount points
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MountList(pub Vec<String>);

impl FromStr for MountList {
    type Err = String;

    fn from_str(s: &str) -> Result<MountList, String> {
        Ok(MountList(
            s.split(',')
                .map(str::trim)
                .filter(|mnt| !mnt.is_empty())
                .map(String::from)
                .collect(),
        ))
    }
}

/// Everything the check needs, resolved once at startup
#[derive(Debug)]
pub(crate) struct CheckConfig {
    pub host: String,
    pub community: String,
    pub mount_point: Regex,
    pub ignore_mnt: Vec<String>,
    pub warning: u32,
    pub critical: u32,
    pub snmp_version: SnmpVersion,
    pub timeout: Duration,
}

impl CheckConfig {
    pub fn is_ignored(&self, mount_point: &str) -> bool {
        self.ignore_mnt.iter().any(|mnt| mnt == mount_point)
    }
}

impl From<Args> for CheckConfig {
    fn from(args: Args) -> CheckConfig {
        CheckConfig {
            host: args.host,
            community: args.community,
            mount_point: args.mount_point,
            ignore_mnt: args.ignore_mnt.unwrap_or_default().0,
            warning: args.warning,
            critical: args.critical,
            snmp_version: args.snmp_version,
            timeout: Duration::from_secs(args.timeout),
        }
    }
}
