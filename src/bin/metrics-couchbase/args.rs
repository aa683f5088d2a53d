use std::time::Duration;

use structopt::clap::AppSettings;
use structopt::StructOpt;
use tracing::warn;
use url::Url;

use remote_check_plugins::couchbase::Credentials;

/// Collect node statistics from the Couchbase REST API
///
/// Prints the `interestingStats` of every matching cluster node as Graphite
/// plaintext: `<scheme>.<node hostname>.<stat> <value> <timestamp>`.
#[derive(Debug, StructOpt)]
#[structopt(
    name = "metrics-couchbase (part of remote-check-plugins)",
    setting = AppSettings::ColoredHelp
)]
pub(crate) struct Args {
    #[structopt(short = "u", long = "user", help = "Couchbase Admin Rest API auth username")]
    pub user: Option<String>,
    #[structopt(short = "P", long = "password", help = "Couchbase Admin Rest API auth password")]
    pub password: Option<String>,
    #[structopt(
        short = "a",
        long = "api",
        default_value = "http://localhost:8091",
        help = "Couchbase Admin Rest API base URL"
    )]
    pub api: Url,
    #[structopt(
        long = "hostname",
        help = "Only report nodes whose hostname contains this. Default: this host's name"
    )]
    pub hostname: Option<String>,
    #[structopt(
        long = "scheme",
        help = "Metric naming scheme, text to prepend to $hostname.$metric. \
                Default: <this host's name>.couchbase"
    )]
    pub scheme: Option<String>,
    #[structopt(long = "timeout", default_value = "10", help = "HTTP timeout in seconds")]
    pub timeout: u64,
}

/// Everything the collector needs, resolved once at startup
#[derive(Debug, PartialEq)]
pub(crate) struct MetricsConfig {
    pub api: Url,
    pub credentials: Option<Credentials>,
    pub hostname: String,
    pub scheme: String,
    pub timeout: Duration,
}

impl MetricsConfig {
    /// Fill in the defaults that depend on the machine we run on
    pub fn resolve(args: Args, local_hostname: &str) -> MetricsConfig {
        let credentials = match (args.user, args.password) {
            (Some(user), password) => Some(Credentials { user, password }),
            (None, Some(_)) => {
                warn!("ignoring --password without --user");
                None
            }
            (None, None) => None,
        };
        MetricsConfig {
            api: args.api,
            credentials,
            hostname: args.hostname.unwrap_or_else(|| local_hostname.to_owned()),
            scheme: args
                .scheme
                .unwrap_or_else(|| format!("{}.couchbase", local_hostname)),
            timeout: Duration::from_secs(args.timeout),
        }
    }
}

/// This machine's hostname, or `localhost` if it cannot be read
pub(crate) fn local_hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("unable to read hostname, using localhost: {}", e);
            "localhost".to_owned()
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use structopt::StructOpt;

    use super::{Args, MetricsConfig};
    use remote_check_plugins::couchbase::Credentials;
    use remote_check_plugins::{parse_args, Status};

    fn config(argv: Vec<&str>) -> MetricsConfig {
        MetricsConfig::resolve(Args::from_iter(argv.into_iter()), "web01")
    }

    #[test]
    fn defaults_come_from_the_local_host() {
        let config = config(vec!["metrics-couchbase"]);
        assert_eq!(config.api.as_str(), "http://localhost:8091/");
        assert_eq!(config.credentials, None);
        assert_eq!(config.hostname, "web01");
        assert_eq!(config.scheme, "web01.couchbase");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn flags_override_defaults() {
        let config = config(vec![
            "metrics-couchbase",
            "-u",
            "admin",
            "-P",
            "hunter2",
            "-a",
            "https://cb.example.com:18091",
            "--hostname",
            "cb1",
            "--scheme",
            "stats.cb",
            "--timeout",
            "3",
        ]);
        assert_eq!(config.api.as_str(), "https://cb.example.com:18091/");
        assert_eq!(
            config.credentials,
            Some(Credentials {
                user: "admin".into(),
                password: Some("hunter2".into()),
            })
        );
        assert_eq!(config.hostname, "cb1");
        assert_eq!(config.scheme, "stats.cb");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn password_alone_sends_no_credentials() {
        let config = config(vec!["metrics-couchbase", "-P", "hunter2"]);
        assert_eq!(config.credentials, None);
    }

    #[test]
    fn api_must_be_a_url() {
        let result = parse_args::<Args, _>(vec!["metrics-couchbase", "-a", "not a url"]).unwrap_err();
        assert_eq!(result.status, Status::Unknown);
        assert!(result.message.contains("--api"), "{}", result.message);
    }

    #[test]
    fn non_numeric_timeout_is_unknown() {
        let result =
            parse_args::<Args, _>(vec!["metrics-couchbase", "--timeout", "soon"]).unwrap_err();
        assert_eq!(result.status, Status::Unknown);
        assert!(result.message.contains("--timeout"), "{}", result.message);
    }
}
