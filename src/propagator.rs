//! # Propagation seam
//!
//! The numerical orbit model is supplied by an external library. The catalog only needs two
//! things from it, captured by the [`Propagator`] trait:
//!
//! 1. build an opaque propagator state once from an [`OrbitElementRecord`],
//! 2. evaluate the inertial state vector at an arbitrary instant, or report failure.
//!
//! [`Sgp4Propagator`] implements the trait on top of the [`sgp4`] crate (SGP4/SDP4, TEME frame,
//! km and km/s). Every failure is reported as a [`SatcatError`] and never panics, so a corrupt or
//! decayed element set only ever affects its own object.
use std::fmt;

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    orbit_record::OrbitElementRecord,
    satcat_errors::SatcatError,
    time::{minutes_between, naive_to_epoch},
};

/// Position (km) and velocity (km/s) of an object in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }

    /// Apply the same linear map to both vectors.
    pub fn map(&self, f: impl Fn(&Vector3<f64>) -> Vector3<f64>) -> Self {
        StateVector {
            position: f(&self.position),
            velocity: f(&self.velocity),
        }
    }

    fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

/// Interface to an orbit propagation model.
///
/// Implementations hold whatever derived state the model needs; the catalog creates one
/// propagator per element record and discards it when the record is superseded.
pub trait Propagator: Sized {
    /// Build the propagator state for a record.
    ///
    /// Errors
    /// ------
    /// * [`SatcatError::PropagationInit`] if the model rejects the elements.
    fn from_record(record: &OrbitElementRecord) -> Result<Self, SatcatError>;

    /// Inertial state vector at `at`.
    ///
    /// Errors
    /// ------
    /// * [`SatcatError::PropagationRuntime`] if the model cannot produce a physical state
    ///   (decay, diverging eccentricity, non finite output…).
    fn propagate(&self, at: &Epoch) -> Result<StateVector, SatcatError>;
}

/// SGP4/SDP4 propagator backed by the `sgp4` crate.
pub struct Sgp4Propagator {
    constants: sgp4::Constants,
    epoch: Epoch,
}

impl fmt::Debug for Sgp4Propagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sgp4Propagator")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Propagator for Sgp4Propagator {
    fn from_record(record: &OrbitElementRecord) -> Result<Self, SatcatError> {
        let constants = sgp4::Constants::from_elements(&record.elements)
            .map_err(|e| SatcatError::PropagationInit(format!("#{}: {e}", record.catalog_id)))?;

        // the model counts minutes from its own epoch, which may differ from the
        // freshness epoch for TLEs outside the 2000-2099 window
        Ok(Sgp4Propagator {
            constants,
            epoch: naive_to_epoch(&record.elements.datetime),
        })
    }

    fn propagate(&self, at: &Epoch) -> Result<StateVector, SatcatError> {
        let minutes = minutes_between(&self.epoch, at);
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| SatcatError::PropagationRuntime(format!("t{minutes:+.3} min: {e}")))?;

        let state = StateVector::new(
            Vector3::from(prediction.position),
            Vector3::from(prediction.velocity),
        );
        if !state.is_finite() {
            return Err(SatcatError::PropagationRuntime(format!(
                "t{minutes:+.3} min: non finite state"
            )));
        }
        Ok(state)
    }
}
