//! Check disk usage of a remote host through its SNMP hrStorage table

mod args;
mod usage;

use tracing::warn;

use remote_check_plugins::snmp::StorageSession;
use remote_check_plugins::{logging, parse_args, CheckResult};

use crate::args::{Args, CheckConfig};
use crate::usage::check_disks;

const NAME: &str = "check-snmp-disk";

/// Query the agent and evaluate its storage
///
/// The session lives only inside this function, so it is closed before the
/// caller exits the process, whatever the outcome.
fn run(config: &CheckConfig) -> CheckResult {
    let outcome = StorageSession::open(
        &config.host,
        &config.community,
        config.snmp_version,
        config.timeout,
    )
    .and_then(|mut session| check_disks(&mut session, config));

    match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!("{} failed: {:?}", NAME, e);
            CheckResult::unknown(e.to_string())
        }
    }
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    logging::init();
    let result = match parse_args::<Args, _>(std::env::args_os()) {
        Ok(args) => run(&CheckConfig::from(args)),
        Err(usage) => usage,
    };
    result.report(NAME);
}
