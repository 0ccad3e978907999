//! # Reference frames
//!
//! Stateless conversions between the frames a tracked object's state passes through:
//!
//! ```text
//! ECI / TEME (propagator output, Z = celestial pole)
//!   --(rotation about Z by −GMST)-->  ECF (Earth-fixed, Z = pole, X = Greenwich)
//!   --(WGS-84 iterative inversion)--> geodetic (latitude, longitude, height)
//!   --(axis permutation (x, y, z) ↦ (x, z, −y))--> render frame (Y up)
//! ```
//!
//! ## Units
//!
//! - Positions: **km**, velocities: **km/s** (as produced by SGP4).
//! - Angles: **radians**; longitude normalized to `(−π, π]`.
//!
//! ## Conventions
//!
//! The velocity is rotated exactly like the position (no `ω × r` transport term): the Earth-fixed
//! velocity is the inertial velocity expressed in rotated axes.
//!
//! The render-frame permutation only moves and negates components, so it is exact: no rounding is
//! introduced and signs/axis order are reproduced bit for bit.
use nalgebra::{Rotation3, Vector3};

use crate::constants::{
    Kilometer, Radian, DPI, EARTH_ECC_SQUARED, EARTH_MAJOR_AXIS_KM, EARTH_MINOR_AXIS_KM,
};

/// Maximum number of fixed-point iterations of the geodetic latitude.
const GEODETIC_MAX_ITER: usize = 20;

/// Convergence threshold on the geodetic latitude (radians).
const GEODETIC_TOL: f64 = 1e-12;

/// Geodetic position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    /// Geodetic latitude in **radians**, in `[−π/2, π/2]`.
    pub latitude: Radian,
    /// Longitude in **radians** east of Greenwich, in `(−π, π]`.
    pub longitude: Radian,
    /// Height above the ellipsoid in **km**.
    pub height: Kilometer,
}

/// Rotation taking inertial (ECI/TEME) components to Earth-fixed components.
///
/// Arguments
/// ---------
/// * `gmst`: Greenwich Mean Sidereal Time in radians
///
/// Return
/// ------
/// * The rotation about the Z axis by `−gmst`
pub fn earth_rotation(gmst: Radian) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst)
}

/// Express an inertial vector (position or velocity) in the Earth-fixed frame.
pub fn eci_to_ecf(vector: &Vector3<f64>, gmst: Radian) -> Vector3<f64> {
    earth_rotation(gmst) * vector
}

/// Convert an Earth-fixed position into geodetic coordinates on the WGS-84 ellipsoid.
///
/// The latitude is obtained by fixed-point iteration on
/// `φ = atan2(z + a·C·e²·sin φ, R)` with `C = 1 / sqrt(1 − e² sin² φ)`,
/// starting from the geocentric latitude. Positions on (or extremely close to) the polar axis
/// are handled separately since `R / cos φ` degenerates there.
///
/// Arguments
/// ---------
/// * `ecf`: Earth-fixed position in km
///
/// Return
/// ------
/// * The geodetic latitude/longitude (radians) and height (km)
pub fn ecf_to_geodetic(ecf: &Vector3<f64>) -> Geodetic {
    let a = EARTH_MAJOR_AXIS_KM;
    let e2 = EARTH_ECC_SQUARED;
    let r = (ecf.x * ecf.x + ecf.y * ecf.y).sqrt();

    if r < 1e-9 {
        let latitude = if ecf.z >= 0.0 {
            std::f64::consts::FRAC_PI_2
        } else {
            -std::f64::consts::FRAC_PI_2
        };
        return Geodetic {
            latitude,
            longitude: 0.0,
            height: ecf.z.abs() - EARTH_MINOR_AXIS_KM,
        };
    }

    let longitude = normalize_longitude(ecf.y.atan2(ecf.x));

    let prime_vertical = |lat: f64| 1.0 / (1.0 - e2 * lat.sin() * lat.sin()).sqrt();

    let mut latitude = ecf.z.atan2(r);
    for _ in 0..GEODETIC_MAX_ITER {
        let c = prime_vertical(latitude);
        let next = (ecf.z + a * c * e2 * latitude.sin()).atan2(r);
        let converged = (next - latitude).abs() < GEODETIC_TOL;
        latitude = next;
        if converged {
            break;
        }
    }
    let height = r / latitude.cos() - a * prime_vertical(latitude);

    Geodetic {
        latitude,
        longitude,
        height,
    }
}

/// Fold a longitude into `(−π, π]`.
fn normalize_longitude(longitude: Radian) -> Radian {
    let mut lon = longitude % DPI;
    if lon > std::f64::consts::PI {
        lon -= DPI;
    } else if lon <= -std::f64::consts::PI {
        lon += DPI;
    }
    lon
}

/// Permute a Z-up vector into the Y-up render frame: `(x, y, z) ↦ (x, z, −y)`.
pub fn to_render_frame(vector: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(vector.x, vector.z, -vector.y)
}
