use tracing::debug;

use remote_check_plugins::couchbase::ClusterSnapshot;
use remote_check_plugins::metrics::Metric;

/// One metric per statistic of every node whose hostname contains `hostname`
///
/// Paths use the node's own hostname, not the filter. Every metric gets the
/// same `timestamp`.
pub(crate) fn node_metrics(
    snapshot: &ClusterSnapshot,
    hostname: &str,
    scheme: &str,
    timestamp: i64,
) -> Vec<Metric> {
    let mut metrics = Vec::new();
    for node in snapshot.nodes_matching(hostname) {
        for (stat, value) in &node.interesting_stats {
            let path = format!("{}.{}.{}", scheme, node.hostname, stat);
            match Metric::from_json(path, value, timestamp) {
                Some(metric) => metrics.push(metric),
                None => debug!("{} {} has no scalar value: {}", node.hostname, stat, value),
            }
        }
    }
    metrics
}
