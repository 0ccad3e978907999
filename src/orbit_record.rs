//! # Orbit element records
//!
//! A catalog source yields a sequence of [`RawRecord`]s, each kept exactly as the provider
//! shipped it (an OMM JSON object or a 2/3-line TLE set). [`OrbitElementRecord::parse`] turns one
//! raw record into a validated, immutable [`OrbitElementRecord`]:
//!
//! | Raw form | Element decoding | Freshness epoch |
//! |---|---|---|
//! | OMM JSON | `sgp4::Elements` serde decoder | the already parsed `EPOCH` timestamp |
//! | TLE      | `sgp4::Elements::from_tle` | line 1, columns 19-32, `YYDDD.dddddd` |
//!
//! The element fields themselves stay opaque to the catalog: they are only handed to the
//! propagator (see [`crate::propagator`]).
use std::fmt;

use hifitime::Epoch;
use serde_json::Value;

use crate::{
    constants::CatalogId,
    satcat_errors::SatcatError,
    time::{naive_to_epoch, tle_epoch_str_to_utc},
};

/// Column range of the packed epoch in TLE line 1.
const TLE_EPOCH_COLUMNS: std::ops::Range<usize> = 18..32;

/// One record as delivered by a catalog source, before any validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// An Orbit Mean-Elements Message object (Celestrak `FORMAT=json`).
    Omm(Value),
    /// A two-line element set with its optional title line.
    Tle {
        name: Option<String>,
        line1: String,
        line2: String,
    },
}

/// A validated orbital element set.
///
/// Immutable once created: a fresher element set for the same object produces a new record that
/// replaces this one inside the catalog.
#[derive(Debug)]
pub struct OrbitElementRecord {
    /// NORAD catalog number, unique key in the catalog.
    pub catalog_id: CatalogId,
    /// Display name, possibly empty.
    pub name: String,
    /// Instant at which the elements are valid, used for freshness comparisons.
    pub epoch: Epoch,
    /// Mean elements consumed by the propagation library.
    pub elements: sgp4::Elements,
}

impl OrbitElementRecord {
    /// Parse a raw record.
    ///
    /// Arguments
    /// ---------
    /// * `raw`: the record as received from the source
    ///
    /// Return
    /// ------
    /// * The validated record, or [`SatcatError::ParseError`] when the record is structurally
    ///   invalid (missing fields, wrong types, truncated lines, undecodable epoch).
    pub fn parse(raw: RawRecord) -> Result<Self, SatcatError> {
        match raw {
            RawRecord::Omm(value) => Self::from_omm(value),
            RawRecord::Tle { name, line1, line2 } => Self::from_tle(name, &line1, &line2),
        }
    }

    fn from_omm(value: Value) -> Result<Self, SatcatError> {
        let elements: sgp4::Elements = serde_json::from_value(value)
            .map_err(|e| SatcatError::ParseError(format!("OMM record: {e}")))?;

        Ok(OrbitElementRecord {
            catalog_id: elements.norad_id,
            name: display_name(elements.object_name.as_deref()),
            epoch: naive_to_epoch(&elements.datetime),
            elements,
        })
    }

    fn from_tle(name: Option<String>, line1: &str, line2: &str) -> Result<Self, SatcatError> {
        let epoch = line1
            .get(TLE_EPOCH_COLUMNS)
            .and_then(tle_epoch_str_to_utc)
            .ok_or_else(|| SatcatError::ParseError(format!("TLE epoch field in {line1:?}")))?;

        let elements = sgp4::Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| SatcatError::ParseError(format!("TLE record: {e}")))?;

        Ok(OrbitElementRecord {
            catalog_id: elements.norad_id,
            name: display_name(elements.object_name.as_deref()),
            epoch,
            elements,
        })
    }
}

impl TryFrom<RawRecord> for OrbitElementRecord {
    type Error = SatcatError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        OrbitElementRecord::parse(raw)
    }
}

impl fmt::Display for OrbitElementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {:?} @ {}", self.catalog_id, self.name, self.epoch)
    }
}

fn display_name(name: Option<&str>) -> String {
    name.map(str::trim).unwrap_or_default().to_string()
}
