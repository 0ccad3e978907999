//! # Catalog sources
//!
//! A [`CatalogSource`] names where a batch of element sets comes from and in which format. It is
//! resolved from a plain descriptor string:
//!
//! | Descriptor | Source |
//! |---|---|
//! | `http(s)://…FORMAT=tle` / `FORMAT=3le`, or ending in `.tle` / `.txt` | remote TLE text |
//! | any other `http(s)://…` | remote OMM JSON (Celestrak `FORMAT=json`) |
//! | `*.json` | local OMM JSON file |
//! | `*.tle` / `*.txt` | local TLE text file |
//!
//! [`CatalogSource::fetch`] returns the raw records of the batch, unvalidated. Fetching is
//! all-or-nothing: an unreadable file, an HTTP failure or a payload that is not a JSON array is a
//! single [`SatcatError::SourceFetch`] for the whole batch. Individual records are only checked
//! later, during ingestion.
use std::fmt;

use camino::Utf8PathBuf;
use serde_json::Value;

use crate::{env_state::TrackerEnv, orbit_record::RawRecord, satcat_errors::SatcatError};

/// Where a batch of element sets is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    JsonFile(Utf8PathBuf),
    TleFile(Utf8PathBuf),
    JsonUrl(String),
    TleUrl(String),
}

impl TryFrom<&str> for CatalogSource {
    type Error = SatcatError;

    fn try_from(descriptor: &str) -> Result<Self, Self::Error> {
        let descriptor = descriptor.trim();
        let lower = descriptor.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            let is_tle = lower.contains("format=tle")
                || lower.contains("format=3le")
                || lower.ends_with(".tle")
                || lower.ends_with(".txt");
            return Ok(if is_tle {
                CatalogSource::TleUrl(descriptor.to_string())
            } else {
                CatalogSource::JsonUrl(descriptor.to_string())
            });
        }

        let path = Utf8PathBuf::from(descriptor);
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Ok(CatalogSource::JsonFile(path)),
            Some("tle") | Some("txt") => Ok(CatalogSource::TleFile(path)),
            _ => Err(SatcatError::InvalidSource(descriptor.to_string())),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.location())
    }
}

impl CatalogSource {
    /// Path or URL of the source.
    pub fn location(&self) -> &str {
        match self {
            CatalogSource::JsonFile(path) | CatalogSource::TleFile(path) => path.as_str(),
            CatalogSource::JsonUrl(url) | CatalogSource::TleUrl(url) => url,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, CatalogSource::JsonUrl(_) | CatalogSource::TleUrl(_))
    }

    /// Read the whole batch of raw records.
    ///
    /// Arguments
    /// ---------
    /// * `env`: environment providing the HTTP client for remote sources
    ///
    /// Return
    /// ------
    /// * The raw records in source order, or [`SatcatError::SourceFetch`] if the payload could
    ///   not be obtained or is not a record sequence.
    pub async fn fetch(&self, env: &TrackerEnv) -> Result<Vec<RawRecord>, SatcatError> {
        let location = self.location();
        let payload = match self {
            CatalogSource::JsonFile(path) | CatalogSource::TleFile(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| SatcatError::fetch(location, e))?
            }
            CatalogSource::JsonUrl(url) | CatalogSource::TleUrl(url) => env
                .get_from_url(url)
                .await
                .map_err(|e| SatcatError::fetch(location, e))?,
        };

        match self {
            CatalogSource::JsonFile(_) | CatalogSource::JsonUrl(_) => {
                parse_json_array(&payload).map_err(|reason| SatcatError::fetch(location, reason))
            }
            CatalogSource::TleFile(_) | CatalogSource::TleUrl(_) => Ok(split_tle_text(&payload)),
        }
    }
}

/// Split an OMM JSON payload into one raw record per array element.
fn parse_json_array(payload: &str) -> Result<Vec<RawRecord>, String> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(items)) => Ok(items.into_iter().map(RawRecord::Omm).collect()),
        Ok(other) => Err(format!("expected a JSON array of records, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Split TLE text into 2-line or 3-line element sets.
///
/// A line starting with `1 ` opens a set and must be followed by a line starting with `2 `; any
/// other non-blank line is taken as the title of the next set (a leading `0 ` is removed, as in
/// 3LE files). Lines that cannot be paired are still emitted as records with an empty line so
/// that they are counted as malformed by ingestion instead of vanishing silently.
pub fn split_tle_text(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut name: Option<String> = None;
    let mut lines = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .peekable();

    while let Some(line) = lines.next() {
        if line.starts_with("1 ") {
            let line2 = lines.next_if(|l| l.starts_with("2 ")).unwrap_or_default();
            records.push(RawRecord::Tle {
                name: name.take(),
                line1: line.to_string(),
                line2: line2.to_string(),
            });
        } else if line.starts_with("2 ") {
            records.push(RawRecord::Tle {
                name: name.take(),
                line1: String::new(),
                line2: line.to_string(),
            });
        } else if let Some(orphan) = name.replace(title(line)) {
            records.push(RawRecord::Tle {
                name: Some(orphan),
                line1: String::new(),
                line2: String::new(),
            });
        }
    }

    if let Some(orphan) = name {
        records.push(RawRecord::Tle {
            name: Some(orphan),
            line1: String::new(),
            line2: String::new(),
        });
    }
    records
}

fn title(line: &str) -> String {
    line.strip_prefix("0 ").unwrap_or(line).trim().to_string()
}
