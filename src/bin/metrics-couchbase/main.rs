//! Emit Couchbase node statistics as Graphite metrics

mod args;
mod format;

use tracing::warn;

use remote_check_plugins::couchbase::{CouchbaseClient, CouchbaseError};
use remote_check_plugins::metrics::{now_timestamp, Metric};
use remote_check_plugins::{logging, parse_args, CheckResult, Status};

use crate::args::{local_hostname, Args, MetricsConfig};
use crate::format::node_metrics;

const NAME: &str = "metrics-couchbase";

/// Fetch the cluster overview and turn it into metrics
///
/// Nothing is printed here, so a failure never leaves half the metrics on
/// stdout.
fn collect(config: &MetricsConfig) -> Result<Vec<Metric>, CouchbaseError> {
    let timestamp = now_timestamp();
    let client = CouchbaseClient::new(
        config.api.clone(),
        config.credentials.clone(),
        config.timeout,
    )?;
    let snapshot = client.pools_default()?;
    Ok(node_metrics(
        &snapshot,
        &config.hostname,
        &config.scheme,
        timestamp,
    ))
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    logging::init();
    let args = match parse_args::<Args, _>(std::env::args_os()) {
        Ok(args) => args,
        Err(usage) => usage.report(NAME),
    };
    let config = MetricsConfig::resolve(args, &local_hostname());

    match collect(&config) {
        Ok(metrics) => {
            for metric in &metrics {
                println!("{}", metric);
            }
            Status::Ok.exit();
        }
        Err(e) => {
            warn!("{} failed: {:?}", NAME, e);
            CheckResult::unknown(e.to_string()).report(NAME);
        }
    }
}
