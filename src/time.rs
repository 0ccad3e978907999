//! Time handling for element sets and propagation.
//!
//! All instants inside the crate are [`hifitime::Epoch`] values in the UTC scale. The helpers
//! below bridge the formats found in element-set catalogs:
//!
//! - [`tle_epoch_to_utc`] decodes the packed `YYDDD.dddddd` epoch of two-line element sets,
//! - [`naive_to_epoch`] converts the `chrono` timestamps produced by the `sgp4` parser,
//! - [`gmst`] / [`gmst_at`] give the Greenwich Mean Sidereal Time used for Earth-fixed frames.
use chrono::{Datelike, NaiveDateTime, Timelike};
use hifitime::{Epoch, Unit};

use crate::constants::{DPI, MS_PER_DAY, SECONDS_PER_MINUTE, T2000};

/// Decode a packed TLE epoch `YYDDD.dddddd` into a UTC instant.
///
/// The two leading digits are the year in the 2000-2099 window and the remainder is the 1-based
/// fractional day of the year. The fractional part of the day is converted to milliseconds with
/// **truncation**, so floating-point noise in the fraction never pushes the instant into the next
/// millisecond (or the next day).
///
/// Argument
/// --------
/// * `epoch`: the numeric epoch, e.g. `25313.96830531`
///
/// Return
/// ------
/// * The decoded epoch, or `None` if the value is not a plausible `YYDDD.dddddd` number
///   (negative, non finite, or a day of year outside `[1, 367)`).
///
/// Example
/// -------
/// `25313.96830531` decodes to `2025-11-09T23:14:21.578 UTC`.
pub fn tle_epoch_to_utc(epoch: f64) -> Option<Epoch> {
    if !epoch.is_finite() || epoch < 0.0 {
        return None;
    }

    let yy = (epoch / 1000.0).floor();
    let day_of_year = epoch - yy * 1000.0;
    if yy > 99.0 || !(1.0..367.0).contains(&day_of_year) {
        return None;
    }

    let year = 2000 + yy as i32;
    let day_integer = day_of_year.floor();
    let fractional_ms = ((day_of_year - day_integer) * MS_PER_DAY).floor();
    let offset_ms = (day_integer - 1.0) * MS_PER_DAY + fractional_ms;

    Some(Epoch::from_gregorian_utc_at_midnight(year, 1, 1) + Unit::Millisecond * offset_ms)
}

/// Decode the textual form of a packed TLE epoch (columns 19-32 of line 1).
pub fn tle_epoch_str_to_utc(epoch: &str) -> Option<Epoch> {
    epoch.trim().parse::<f64>().ok().and_then(tle_epoch_to_utc)
}

/// Convert a naive (implicitly UTC) `chrono` timestamp into a UTC [`Epoch`].
///
/// Leap-second nanoseconds (≥ 1e9 in chrono) are clamped to the last nanosecond of the second.
pub fn naive_to_epoch(datetime: &NaiveDateTime) -> Epoch {
    Epoch::from_gregorian_utc(
        datetime.year(),
        datetime.month() as u8,
        datetime.day() as u8,
        datetime.hour() as u8,
        datetime.minute() as u8,
        datetime.second() as u8,
        datetime.nanosecond().min(999_999_999),
    )
}

/// Signed number of minutes elapsed from `from` to `to`.
pub fn minutes_between(from: &Epoch, to: &Epoch) -> f64 {
    (*to - *from).to_seconds() / SECONDS_PER_MINUTE
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982/2000 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # References
/// * IAU 1982, IERS Conventions 1996/2000.
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / 86400.0;

    // fraction of the current day, sped up to sidereal rate
    let h = tjm.fract() * DPI;
    let mut gmst = gmst0 + h * RAP;

    let mut i: i64 = (gmst / DPI).floor() as i64;
    if gmst < 0.0 {
        i -= 1;
    }
    gmst -= i as f64 * DPI;

    gmst
}

/// GMST at an epoch. UTC stands in for UT1; the sub-second difference is far below what a
/// catalog display needs.
pub fn gmst_at(epoch: &Epoch) -> f64 {
    gmst(epoch.to_mjd_utc_days())
}
