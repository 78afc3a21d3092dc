//! Time scales and reference-frame conversions.
//!
//! Linear quantities are kilometres throughout. "ECI" here is the
//! true-equator mean-equinox frame that SGP4 produces; the Earth-fixed frame
//! is obtained from it by a rotation about Z by GMST.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::f64::consts::TAU;

// WGS-84 constants
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const EARTH_ECCENTRICITY_SQ: f64 = 0.00669437999014;
pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

const LATITUDE_TOLERANCE_RAD: f64 = 1e-14;
const LATITUDE_MAX_ITERATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Continuous Julian Day for a proleptic Gregorian UTC date (Meeus, ch. 7).
pub fn julian_day(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> f64 {
    let (year, month) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };
    let century = (year / 100.0).floor();
    let gregorian = 2.0 - century + (century / 4.0).floor();

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day as f64
        + gregorian
        - 1524.5
        + ((second / 60.0 + minute as f64) / 60.0 + hour as f64) / 24.0
}

pub fn julian_day_of(at: &DateTime<Utc>) -> f64 {
    let second = at.second() as f64 + at.nanosecond() as f64 * 1e-9;
    julian_day(at.year(), at.month(), at.day(), at.hour(), at.minute(), second)
}

/// Greenwich Mean Sidereal Time (IAU-82) in radians, in `[0, 2π)`.
pub fn gmst(jd: f64) -> f64 {
    let ut = (jd + 0.5).rem_euclid(1.0);
    let jd_midnight = jd - ut;
    let tu = (jd_midnight - J2000_JD) / DAYS_PER_CENTURY;
    let seconds = 24_110.548_41 + tu * (8_640_184.812_866 + tu * (0.093_104 - tu * 6.2e-6));
    let seconds = (seconds + SECONDS_PER_DAY * 1.002_737_909_34 * ut).rem_euclid(SECONDS_PER_DAY);
    (TAU * seconds / SECONDS_PER_DAY).rem_euclid(TAU)
}

pub fn eci_to_ecef_position(pos_eci: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_eci[0] * cos_gmst + pos_eci[1] * sin_gmst,
        -pos_eci[0] * sin_gmst + pos_eci[1] * cos_gmst,
        pos_eci[2],
    ]
}

pub fn ecef_to_eci_position(pos_ecef: [f64; 3], gmst: f64) -> [f64; 3] {
    eci_to_ecef_position(pos_ecef, -gmst)
}

/// Earth-fixed velocity, including the transport term from Earth rotation.
pub fn eci_to_ecef_velocity(pos_eci: [f64; 3], vel_eci: [f64; 3], gmst: f64) -> [f64; 3] {
    let pos = eci_to_ecef_position(pos_eci, gmst);
    let rotated = eci_to_ecef_position(vel_eci, gmst);
    [
        rotated[0] + EARTH_ROTATION_RAD_S * pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * pos[0],
        rotated[2],
    ]
}

/// Project a vector onto the local east/north/up axes at the given latitude
/// and longitude (or local sidereal angle, for inertial vectors).
pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt_km: f64) -> [f64; 3] {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let n = prime_vertical_radius(sin_lat);
    [
        (n + alt_km) * cos_lat * lon.cos(),
        (n + alt_km) * cos_lat * lon.sin(),
        (n * (1.0 - EARTH_ECCENTRICITY_SQ) + alt_km) * sin_lat,
    ]
}

pub fn geodetic_to_eci(lat_deg: f64, lon_deg: f64, alt_km: f64, jd: f64) -> [f64; 3] {
    ecef_to_eci_position(geodetic_to_ecef(lat_deg, lon_deg, alt_km), gmst(jd))
}

pub fn ecef_to_geodetic(pos: [f64; 3]) -> GeodeticPosition {
    let [x, y, z] = pos;
    let p = x.hypot(y);
    let longitude = y.atan2(x);

    let mut latitude = z.atan2(p * (1.0 - EARTH_ECCENTRICITY_SQ));
    for _ in 0..LATITUDE_MAX_ITERATIONS {
        let n = prime_vertical_radius(latitude.sin());
        let next = (z + EARTH_ECCENTRICITY_SQ * n * latitude.sin()).atan2(p);
        let converged = (next - latitude).abs() < LATITUDE_TOLERANCE_RAD;
        latitude = next;
        if converged {
            break;
        }
    }

    // Height along the ellipsoid normal; well-conditioned at the poles too.
    let sin_lat = latitude.sin();
    let altitude = p * latitude.cos() + z * sin_lat
        - EARTH_EQUATORIAL_RADIUS_KM * (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();

    GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km: altitude,
    }
}

pub fn eci_to_geodetic(pos_eci: [f64; 3], gmst: f64) -> GeodeticPosition {
    ecef_to_geodetic(eci_to_ecef_position(pos_eci, gmst))
}

fn prime_vertical_radius(sin_lat: f64) -> f64 {
    EARTH_EQUATORIAL_RADIUS_KM / (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt()
}

pub(crate) fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
