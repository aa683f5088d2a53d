//! Read the hrStorage table from an SNMP agent
//!
//! The hrStorage table (`HOST-RESOURCES-MIB::hrStorageEntry`,
//! `1.3.6.1.2.1.25.2.3.1`) describes every storage area an agent knows about:
//! mounted file systems, RAM, swap and so on. Each area is a row, and each
//! attribute of the row lives in its own column sub-table at the same index:
//!
//! * `.3` hrStorageDescr, e.g. `/` or `/data`
//! * `.4` hrStorageAllocationUnits, bytes per unit
//! * `.5` hrStorageSize, in units
//! * `.6` hrStorageUsed, in units
//!
//! [`StorageTable`] is the read interface the checks use, and
//! [`StorageSession`] is the implementation backed by a real agent.

use std::fmt;
use std::io;
use std::net::{Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use snmp2::{Oid, SyncSession, Value};
use thiserror::Error;
use tracing::debug;

/// `1.3.6.1.2.1.25.2.3.1`
pub const HR_STORAGE_ENTRY: [u64; 10] = [1, 3, 6, 1, 2, 1, 25, 2, 3, 1];
pub const DESCR_COLUMN: u64 = 3;
pub const ALLOCATION_UNITS_COLUMN: u64 = 4;
pub const SIZE_COLUMN: u64 = 5;
pub const USED_COLUMN: u64 = 6;

/// The columns that make up a `DeviceRow`, in the order they are requested
const ROW_COLUMNS: [u64; 4] = [
    DESCR_COLUMN,
    ALLOCATION_UNITS_COLUMN,
    SIZE_COLUMN,
    USED_COLUMN,
];

const DEFAULT_PORT: u16 = 161;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnmpVersion {
    V1,
    V2c,
}

impl SnmpVersion {
    pub fn str_values() -> [&'static str; 2] {
        ["SNMPv1", "SNMPv2c"]
    }
}

impl FromStr for SnmpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<SnmpVersion, String> {
        let lower = s.to_ascii_lowercase();
        match lower.trim_start_matches("snmp") {
            "v1" | "1" => Ok(SnmpVersion::V1),
            "v2c" | "2c" | "v2" | "2" => Ok(SnmpVersion::V2c),
            _ => Err(format!(
                "Unknown SNMP version '{}', expected one of: {}",
                s,
                SnmpVersion::str_values().join(", ")
            )),
        }
    }
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SnmpVersion::V1 => write!(f, "SNMPv1"),
            SnmpVersion::V2c => write!(f, "SNMPv2c"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SnmpError {
    #[error("{host} not responding")]
    Timeout { host: String },
    #[error("Unable to open SNMP session to {host}: {source}")]
    Session {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} has no GET-BULK request, use SNMPv2c")]
    UnsupportedVersion(SnmpVersion),
    #[error("SNMP agent returned error status {status} for varbind {index}")]
    Agent { status: u32, index: u32 },
    #[error("Unexpected SNMP response: {0}")]
    UnexpectedVarbind(String),
    #[error("SNMP request failed: {0}")]
    Protocol(snmp2::Error),
    #[error("Invalid OID {0}")]
    InvalidOid(String),
}

/// One row of the hrStorage table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRow {
    pub index: u64,
    pub description: String,
    /// Bytes per allocation unit
    pub allocation_units: u64,
    /// Total size in allocation units
    pub size: u64,
    /// Used size in allocation units
    pub used: u64,
}

impl DeviceRow {
    /// The part of the description before the first comma
    ///
    /// Some agents append labels to the mount point, e.g.
    /// `C:\ Label:  Serial Number 1a2b3c4d`.
    pub fn mount_point(&self) -> &str {
        self.description
            .split(',')
            .next()
            .unwrap_or(&self.description)
    }

    /// `used / size * 100`, or `None` for zero-sized pseudo storage
    pub fn percent_used(&self) -> Option<f64> {
        if self.size == 0 {
            None
        } else {
            Some(self.used as f64 / self.size as f64 * 100.0)
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.size.saturating_mul(self.allocation_units)
    }

    pub fn used_bytes(&self) -> u64 {
        self.used.saturating_mul(self.allocation_units)
    }
}

/// Read access to an agent's hrStorage table
pub trait StorageTable {
    /// Up to `max_rows` `(index, hrStorageDescr)` pairs, fetched in one request
    fn descriptions(&mut self, max_rows: u32) -> Result<Vec<(u64, String)>, SnmpError>;

    /// All four columns of the row at `index`, fetched in one request
    fn row(&mut self, index: u64) -> Result<DeviceRow, SnmpError>;
}

/// An open SNMPv2c session with an agent
///
/// The UDP socket is closed when this is dropped.
pub struct StorageSession {
    host: String,
    session: SyncSession,
}

impl StorageSession {
    pub fn open(
        host: &str,
        community: &str,
        version: SnmpVersion,
        timeout: Duration,
    ) -> Result<StorageSession, SnmpError> {
        if version == SnmpVersion::V1 {
            return Err(SnmpError::UnsupportedVersion(version));
        }
        let address = agent_address(host);
        debug!("opening {} session to {}", version, address);
        let session =
            SyncSession::new_v2c(address.as_str(), community.as_bytes(), Some(timeout), 0)
                .map_err(|source| SnmpError::Session {
                    host: host.to_owned(),
                    source,
                })?;
        Ok(StorageSession {
            host: host.to_owned(),
            session,
        })
    }
}

impl StorageTable for StorageSession {
    fn descriptions(&mut self, max_rows: u32) -> Result<Vec<(u64, String)>, SnmpError> {
        let column = column_oid(DESCR_COLUMN)?;
        let host = &self.host;
        let pdu = self
            .session
            .getbulk(&[&column], 0, max_rows)
            .map_err(|e| request_error(host, e))?;
        check_error_status(pdu.error_status, pdu.error_index)?;

        let rows = parse_descriptions(&column, pdu.varbinds)?;
        debug!("{} returned {} storage descriptions", host, rows.len());
        Ok(rows)
    }

    fn row(&mut self, index: u64) -> Result<DeviceRow, SnmpError> {
        let expected = ROW_COLUMNS
            .iter()
            .map(|&column| cell_oid(column, index))
            .collect::<Result<Vec<_>, _>>()?;
        let expected_refs = expected.iter().collect::<Vec<&Oid>>();

        let host = &self.host;
        let pdu = self
            .session
            .get_many(&expected_refs)
            .map_err(|e| request_error(host, e))?;
        check_error_status(pdu.error_status, pdu.error_index)?;

        parse_row(index, &expected, pdu.varbinds)
    }
}

/// `(index, description)` for every varbind inside the description column
///
/// A bulk response runs on into the next column once this one ends, those
/// varbinds are dropped.
fn parse_descriptions<'a, I>(column: &Oid, varbinds: I) -> Result<Vec<(u64, String)>, SnmpError>
where
    I: IntoIterator<Item = (Oid<'a>, Value<'a>)>,
{
    let mut rows = Vec::new();
    for (oid, value) in varbinds {
        if !oid.starts_with(column) {
            continue;
        }
        let index = last_arc(&oid)?;
        rows.push((index, as_string(&oid, &value)?));
    }
    Ok(rows)
}

/// Build a row from the answer to a GET of `expected`, in that order
fn parse_row<'a, I>(index: u64, expected: &[Oid], varbinds: I) -> Result<DeviceRow, SnmpError>
where
    I: IntoIterator<Item = (Oid<'a>, Value<'a>)>,
{
    let mut varbinds = varbinds.into_iter();
    let mut cells = Vec::with_capacity(expected.len());
    for expected_oid in expected {
        let (oid, value) = varbinds.next().ok_or_else(|| {
            SnmpError::UnexpectedVarbind(format!("no value for {}", expected_oid.to_id_string()))
        })?;
        if oid.to_id_string() != expected_oid.to_id_string() {
            return Err(SnmpError::UnexpectedVarbind(format!(
                "asked for {}, got {}",
                expected_oid.to_id_string(),
                oid.to_id_string()
            )));
        }
        if let Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView = value {
            return Err(SnmpError::UnexpectedVarbind(format!(
                "agent has no {}",
                oid.to_id_string()
            )));
        }
        cells.push((oid, value));
    }
    if cells.len() != ROW_COLUMNS.len() {
        return Err(SnmpError::UnexpectedVarbind(format!(
            "expected {} columns for row {}, got {}",
            ROW_COLUMNS.len(),
            index,
            cells.len()
        )));
    }

    Ok(DeviceRow {
        index,
        description: as_string(&cells[0].0, &cells[0].1)?,
        allocation_units: as_u64(&cells[1].0, &cells[1].1)?,
        size: as_u64(&cells[2].0, &cells[2].1)?,
        used: as_u64(&cells[3].0, &cells[3].1)?,
    })
}

impl Drop for StorageSession {
    fn drop(&mut self) {
        debug!("closing SNMP session to {}", self.host);
    }
}

/// `host:161` unless the host already names a port
fn agent_address(host: &str) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        host.to_owned()
    } else if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]:{}", host, DEFAULT_PORT)
    } else if host.contains(':') {
        host.to_owned()
    } else {
        format!("{}:{}", host, DEFAULT_PORT)
    }
}

fn request_error(host: &str, error: snmp2::Error) -> SnmpError {
    match error {
        snmp2::Error::Receive => SnmpError::Timeout {
            host: host.to_owned(),
        },
        other => SnmpError::Protocol(other),
    }
}

fn check_error_status(status: u32, index: u32) -> Result<(), SnmpError> {
    if status != 0 {
        return Err(SnmpError::Agent { status, index });
    }
    Ok(())
}

fn build_oid(arcs: &[u64]) -> Result<Oid<'static>, SnmpError> {
    Oid::from(arcs).map_err(|e| {
        let dotted = arcs.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        SnmpError::InvalidOid(format!("{} ({:?})", dotted.join("."), e))
    })
}

pub fn column_oid(column: u64) -> Result<Oid<'static>, SnmpError> {
    let mut arcs = HR_STORAGE_ENTRY.to_vec();
    arcs.push(column);
    build_oid(&arcs)
}

pub fn cell_oid(column: u64, index: u64) -> Result<Oid<'static>, SnmpError> {
    let mut arcs = HR_STORAGE_ENTRY.to_vec();
    arcs.push(column);
    arcs.push(index);
    build_oid(&arcs)
}

fn last_arc(oid: &Oid) -> Result<u64, SnmpError> {
    oid.iter()
        .and_then(|arcs| arcs.last())
        .ok_or_else(|| SnmpError::UnexpectedVarbind(format!("no index in {}", oid.to_id_string())))
}

fn as_string(oid: &Oid, value: &Value) -> Result<String, SnmpError> {
    match *value {
        Value::OctetString(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        ref other => Err(SnmpError::UnexpectedVarbind(format!(
            "{} is {:?}, expected a string",
            oid.to_id_string(),
            other
        ))),
    }
}

fn as_u64(oid: &Oid, value: &Value) -> Result<u64, SnmpError> {
    match *value {
        Value::Integer(n) if n >= 0 => Ok(n as u64),
        Value::Counter32(n) | Value::Unsigned32(n) => Ok(u64::from(n)),
        Value::Counter64(n) => Ok(n),
        ref other => Err(SnmpError::UnexpectedVarbind(format!(
            "{} is {:?}, expected a non-negative number",
            oid.to_id_string(),
            other
        ))),
    }
}
