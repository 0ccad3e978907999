//! # Tracked objects
//!
//! A [`TrackedObject`] owns the current [`OrbitElementRecord`] of one catalog entry, the
//! propagator state derived from it, the most recently computed [`ComputedState`] and the handle
//! of the marker currently displayed for it (if any).
//!
//! [`TrackedObject::update`] runs the full per-object pipeline at a given instant:
//!
//! ```text
//! propagator ─► ECI (pos, vel) ─► ECF (rotation by GMST) ─► geodetic (WGS-84)
//!                                         └──────────────► render frame (x, z, −y)
//! ```
//!
//! A propagation failure leaves the previous state untouched and is reported as
//! [`UpdateOutcome::Failed`]; the scheduler then detaches the object's marker without attaching a
//! new one, and the object is retried on its next pass.
use std::fmt;

use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    constants::CatalogId,
    orbit_record::OrbitElementRecord,
    propagator::{Propagator, StateVector},
    ref_system::{ecf_to_geodetic, eci_to_ecf, to_render_frame, Geodetic},
    satcat_errors::SatcatError,
    time::gmst_at,
    visual::MarkerHandle,
};

/// Everything derived from one successful propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedState {
    /// Instant the state refers to.
    pub at: Epoch,
    /// Inertial (TEME) position/velocity, km and km/s.
    pub inertial: StateVector,
    /// Earth-fixed position/velocity.
    pub fixed: StateVector,
    /// Sub-satellite point and altitude.
    pub geodetic: Geodetic,
    /// Earth-fixed state permuted into the Y-up render frame.
    pub render: StateVector,
}

impl ComputedState {
    /// Derive every frame from an inertial state at `at`.
    pub fn from_inertial(inertial: StateVector, at: &Epoch) -> Self {
        let gmst = gmst_at(at);
        let fixed = inertial.map(|v| eci_to_ecf(v, gmst));
        ComputedState {
            at: *at,
            inertial,
            fixed,
            geodetic: ecf_to_geodetic(&fixed.position),
            render: fixed.map(to_render_frame),
        }
    }
}

/// Result of [`TrackedObject::update`].
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// Fresh render-frame position/velocity and geodetic position.
    Updated {
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        geodetic: Geodetic,
    },
    /// The propagator could not produce a state; no marker should be shown this pass.
    Failed(SatcatError),
}

/// One catalog entry.
#[derive(Debug)]
pub struct TrackedObject<P> {
    record: OrbitElementRecord,
    propagator: P,
    last: Option<ComputedState>,
    marker: Option<MarkerHandle>,
    consecutive_failures: u32,
}

impl<P: Propagator> TrackedObject<P> {
    pub fn new(record: OrbitElementRecord, propagator: P) -> Self {
        TrackedObject {
            record,
            propagator,
            last: None,
            marker: None,
            consecutive_failures: 0,
        }
    }

    pub fn catalog_id(&self) -> CatalogId {
        self.record.catalog_id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Epoch of the current element set.
    pub fn epoch(&self) -> &Epoch {
        &self.record.epoch
    }

    pub fn record(&self) -> &OrbitElementRecord {
        &self.record
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    /// Last successfully computed state, if any.
    pub fn last_state(&self) -> Option<&ComputedState> {
        self.last.as_ref()
    }

    /// Handle of the marker currently attached for this object.
    pub fn marker(&self) -> Option<MarkerHandle> {
        self.marker
    }

    /// Number of failed updates since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Propagate to `at` and refresh every derived frame.
    ///
    /// Arguments
    /// ---------
    /// * `at`: the instant to evaluate
    ///
    /// Return
    /// ------
    /// * [`UpdateOutcome::Updated`] with the render-frame state and geodetic position, or
    ///   [`UpdateOutcome::Failed`] carrying the propagator error. On failure the previously
    ///   computed state is kept as is.
    pub fn update(&mut self, at: &Epoch) -> UpdateOutcome {
        match self.propagator.propagate(at) {
            Ok(inertial) => {
                let state = ComputedState::from_inertial(inertial, at);
                self.last = Some(state);
                self.consecutive_failures = 0;
                UpdateOutcome::Updated {
                    position: state.render.position,
                    velocity: state.render.velocity,
                    geodetic: state.geodetic,
                }
            }
            Err(err) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                UpdateOutcome::Failed(err)
            }
        }
    }

    /// Swap in a fresher element set, keeping the object's identity, marker and last state.
    pub(crate) fn replace_record(&mut self, record: OrbitElementRecord, propagator: P) {
        debug_assert_eq!(record.catalog_id, self.record.catalog_id);
        self.record = record;
        self.propagator = propagator;
    }

    /// Install `handle` as the current marker and hand back the previous one.
    pub(crate) fn swap_marker(&mut self, handle: MarkerHandle) -> Option<MarkerHandle> {
        self.marker.replace(handle)
    }

    pub(crate) fn take_marker(&mut self) -> Option<MarkerHandle> {
        self.marker.take()
    }
}

impl<P> fmt::Display for TrackedObject<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(state) = &self.last else {
            return write!(f, "Sat: {} (#{}) not propagated yet", self.record.name, self.record.catalog_id);
        };
        writeln!(f, "Sat: {} Time: {}", self.record.name, state.at)?;
        writeln!(
            f,
            "  GP: Lat: {:.2}°, Lon: {:.2}°, Alt: {:.3} km",
            state.geodetic.latitude.to_degrees(),
            state.geodetic.longitude.to_degrees(),
            state.geodetic.height
        )?;
        let (p, v) = (&state.inertial.position, &state.inertial.velocity);
        writeln!(f, "   P:  x = {}, y = {}, z = {}", p.x, p.y, p.z)?;
        writeln!(f, "   V:  xdot = {}, ydot = {}, zdot = {}", v.x, v.y, v.z)?;
        let r = &state.render.position;
        write!(f, "  JS:  X = {}, Y = {}, Z = {}", r.x, r.y, r.z)
    }
}
