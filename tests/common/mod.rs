#![allow(dead_code)]

use hifitime::{Epoch, Unit};
use nalgebra::Vector3;
use satcat::orbit_record::{OrbitElementRecord, RawRecord};
use satcat::{Propagator, SatcatError, StateVector};
use serde_json::json;

pub const ISS_L1: &str = "1 25544U 98067A   25313.96830531  .00008626  00000+0  16179-3 0  9997";
pub const ISS_L2: &str = "2 25544  51.6342 304.7042 0004075  52.7615 307.3745 15.49490024537771";

/// Instant used as "now" by the fixtures, a few hours after every fixture epoch.
pub fn reference() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2025, 11, 11)
}

/// ISO epoch `hours` after 2025-11-10T00:00:00.
pub fn epoch_iso(hours: u32) -> String {
    format!("2025-11-10T{hours:02}:00:00.000000")
}

/// OMM record built on the CSS (TIANHE) mean elements with another id, name and epoch.
pub fn omm(id: u64, name: &str, epoch: &str) -> RawRecord {
    RawRecord::Omm(omm_value(id, name, epoch))
}

pub fn omm_value(id: u64, name: &str, epoch: &str) -> serde_json::Value {
    json!({
        "OBJECT_NAME": name,
        "OBJECT_ID": "2021-035A",
        "EPOCH": epoch,
        "MEAN_MOTION": 15.60859823,
        "ECCENTRICITY": 0.00047056,
        "INCLINATION": 41.4651,
        "RA_OF_ASC_NODE": 209.7335,
        "ARG_OF_PERICENTER": 1.026,
        "MEAN_ANOMALY": 359.0588,
        "EPHEMERIS_TYPE": 0,
        "CLASSIFICATION_TYPE": "U",
        "NORAD_CAT_ID": id,
        "ELEMENT_SET_NO": 999,
        "REV_AT_EPOCH": 25906,
        "BSTAR": 0.0004154796,
        "MEAN_MOTION_DOT": 0.00035552,
        "MEAN_MOTION_DDOT": 0
    })
}

/// `count` distinct objects with ids starting at `first_id`, all at the same epoch.
pub fn omm_batch(first_id: u64, count: u64) -> Vec<RawRecord> {
    (first_id..first_id + count)
        .map(|id| omm(id, &format!("OBJ {id}"), &epoch_iso(0)))
        .collect()
}

/// Propagator whose behaviour is driven by the object name:
///
/// * `BROKEN-INIT` – construction fails,
/// * `BROKEN` – every propagation fails,
/// * `DECAY+<minutes>` – propagation fails past `epoch + minutes`,
/// * anything else – a fixed state depending on the id and the elapsed time.
#[derive(Debug)]
pub struct ScriptedPropagator {
    id: u64,
    epoch: Epoch,
    fails_after: Option<Epoch>,
    always_fails: bool,
}

impl Propagator for ScriptedPropagator {
    fn from_record(record: &OrbitElementRecord) -> Result<Self, SatcatError> {
        if record.name == "BROKEN-INIT" {
            return Err(SatcatError::PropagationInit("scripted".into()));
        }
        let fails_after = record
            .name
            .strip_prefix("DECAY+")
            .and_then(|m| m.parse::<f64>().ok())
            .map(|minutes| record.epoch + Unit::Minute * minutes);
        Ok(ScriptedPropagator {
            id: record.catalog_id,
            epoch: record.epoch,
            fails_after,
            always_fails: record.name == "BROKEN",
        })
    }

    fn propagate(&self, at: &Epoch) -> Result<StateVector, SatcatError> {
        if self.always_fails || self.fails_after.is_some_and(|limit| *at > limit) {
            return Err(SatcatError::PropagationRuntime(format!("#{} decayed", self.id)));
        }
        let minutes = (*at - self.epoch).to_seconds() / 60.0;
        Ok(StateVector::new(
            Vector3::new(7000.0, self.id as f64, minutes),
            Vector3::new(0.0, 7.5, 0.0),
        ))
    }
}
