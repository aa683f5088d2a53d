//! Talk to the Couchbase REST management API
//!
//! Only the cluster overview at `/pools/default` is needed: it lists every
//! node together with a handful of "interesting" statistics.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const POOLS_DEFAULT: &str = "/pools/default";

#[derive(Debug, Error)]
pub enum CouchbaseError {
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Connection timed out")]
    Timeout,
    #[error("Missing or incorrect Couchbase REST API credentials")]
    Unauthorized,
    #[error("couchbase REST API returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

/// The parts of `/pools/default` we care about
#[derive(Debug, Deserialize, PartialEq)]
pub struct ClusterSnapshot {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Node {
    /// `host:port` as the cluster knows it, e.g. `cb1.example.com:8091`
    pub hostname: String,
    #[serde(rename = "interestingStats", default)]
    pub interesting_stats: Map<String, Value>,
}

impl ClusterSnapshot {
    /// Nodes whose hostname contains `hostname`
    pub fn nodes_matching<'a>(&'a self, hostname: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.hostname.contains(hostname))
    }
}

/// A blocking client for one cluster
pub struct CouchbaseClient {
    client: Client,
    api: Url,
    credentials: Option<Credentials>,
}

impl CouchbaseClient {
    pub fn new(
        api: Url,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<CouchbaseClient, CouchbaseError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CouchbaseError::RequestFailed(e.to_string()))?;
        Ok(CouchbaseClient {
            client,
            api,
            credentials,
        })
    }

    /// `resource` appended to the API base, ignoring a trailing slash on the base
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}{}", self.api.as_str().trim_end_matches('/'), resource)
    }

    /// Fetch and parse `/pools/default`
    pub fn pools_default(&self) -> Result<ClusterSnapshot, CouchbaseError> {
        let body = self.get(POOLS_DEFAULT)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, resource: &str) -> Result<String, CouchbaseError> {
        let url = self.resource_url(resource);
        debug!("GET {}", url);
        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(ref credentials) = self.credentials {
            request = request.basic_auth(&credentials.user, credentials.password.as_ref());
        }

        let response = request.send().map_err(transport_error)?;
        let status = response.status();
        debug!("{} answered {}", url, status);
        match status {
            s if s.is_success() => response.text().map_err(transport_error),
            StatusCode::UNAUTHORIZED => Err(CouchbaseError::Unauthorized),
            StatusCode::NOT_FOUND => Err(CouchbaseError::NotFound(resource.to_owned())),
            StatusCode::REQUEST_TIMEOUT => Err(CouchbaseError::Timeout),
            s => Err(CouchbaseError::RequestFailed(format!("{} returned {}", url, s))),
        }
    }
}

fn transport_error(e: reqwest::Error) -> CouchbaseError {
    if e.is_timeout() {
        CouchbaseError::Timeout
    } else if is_connection_refused(&e) {
        CouchbaseError::ConnectionRefused
    } else {
        CouchbaseError::RequestFailed(e.to_string())
    }
}

/// Walk the error chain looking for the socket's ECONNREFUSED
fn is_connection_refused(e: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(e);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = err.source();
    }
    false
}
