use chrono::{DateTime, Utc};

use crate::frames::{ecef_to_enu, gmst, julian_day_of, norm};
use crate::predict::types::{LookAngles, StateVector};
use crate::predict::{Observer, PredictError};

const DEGENERATE_RANGE_KM: f64 = 1e-9;

/// Azimuth, elevation, range and range rate of a satellite as seen by the
/// observer at `at`.
///
/// The topocentric vector is formed in the inertial frame and projected onto
/// the observer's horizon using the local sidereal angle (GMST + longitude).
pub fn look_angles(
    state: &StateVector,
    observer: &Observer,
    at: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let jd = julian_day_of(&at);
    let local_sidereal = gmst(jd) + observer.lon_rad();

    let obs_pos = observer.position_eci_km(jd);
    let obs_vel = observer.velocity_eci_km_s(jd);

    let dr = [
        state.position_km[0] - obs_pos[0],
        state.position_km[1] - obs_pos[1],
        state.position_km[2] - obs_pos[2],
    ];
    let range_km = norm(dr);
    if range_km.is_nan() || range_km <= DEGENERATE_RANGE_KM {
        return Err(PredictError::DegenerateGeometry { range_km });
    }

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), local_sidereal);
    let elevation = (up / range_km).clamp(-1.0, 1.0).asin().to_degrees();
    let azimuth = normalize_azimuth(east.atan2(north).to_degrees());

    let rel_vel = [
        state.velocity_km_s[0] - obs_vel[0],
        state.velocity_km_s[1] - obs_vel[1],
        state.velocity_km_s[2] - obs_vel[2],
    ];
    let range_rate_km_s =
        (rel_vel[0] * dr[0] + rel_vel[1] * dr[1] + rel_vel[2] * dr[2]) / range_km;

    Ok(LookAngles {
        azimuth_deg: azimuth,
        elevation_deg: elevation,
        range_km,
        range_rate_km_s,
    })
}

fn normalize_azimuth(deg: f64) -> f64 {
    let az = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if az >= 360.0 {
        0.0
    } else {
        az
    }
}
