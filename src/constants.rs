//! # Constants and type definitions for satcat
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `satcat` library.
//!
//! ## Overview
//!
//! - Geodetic constants of the WGS-84 ellipsoid (kilometers)
//! - Time conversions (days → milliseconds, minutes → seconds)
//! - Core type aliases used across the crate
//! - Defaults for the catalog scheduler

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of milliseconds in a day
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Number of seconds in a minute (SGP4 propagates in minutes since epoch)
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Earth equatorial radius in kilometers (WGS-84)
pub const EARTH_MAJOR_AXIS_KM: f64 = 6378.137;

/// Earth polar radius in kilometers (WGS-84)
pub const EARTH_MINOR_AXIS_KM: f64 = 6356.7523142;

/// Flattening of the reference ellipsoid
pub const EARTH_FLATTENING: f64 = (EARTH_MAJOR_AXIS_KM - EARTH_MINOR_AXIS_KM) / EARTH_MAJOR_AXIS_KM;

/// First eccentricity squared, e² = 2f − f²
pub const EARTH_ECC_SQUARED: f64 = 2.0 * EARTH_FLATTENING - EARTH_FLATTENING * EARTH_FLATTENING;

/// Default number of scheduler shards
pub const DEFAULT_SHARD_COUNT: usize = 32;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// NORAD catalog number, the unique key of a tracked object
pub type CatalogId = u64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
