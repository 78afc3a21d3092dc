use chrono::{DateTime, Duration, Utc};

use crate::predict::look_angles::look_angles;
use crate::predict::types::{LookAngles, Pass};
use crate::predict::{Observer, PredictError, Propagator};

const COARSE_STEP_SECONDS: i64 = 60; // 1 minute for initial scan
const FINE_STEP_SECONDS: i64 = 1; // 1 second for refinement
const HORIZON_ELEVATION: f64 = 0.0;

/// Find all passes of a satellite over the observer within a time range
pub fn predict_passes<P: Propagator + ?Sized>(
    propagator: &P,
    observer: &Observer,
    satellite_name: &str,
    catalog_number: Option<u32>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
) -> Result<Vec<Pass>, PredictError> {
    if start > end {
        return Err(PredictError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }

    let mut passes = Vec::new();
    let mut cursor = start;
    let mut prev_cursor = start;
    let coarse_step = Duration::seconds(COARSE_STEP_SECONDS);

    let mut prev_visible = false;
    let mut pass_start: Option<(DateTime<Utc>, f64)> = None;
    let mut max_el = 0.0;
    let mut max_el_time = cursor;

    let make_pass = |aos: (DateTime<Utc>, f64),
                     los: (DateTime<Utc>, f64),
                     tca: DateTime<Utc>,
                     max_el: f64| Pass {
        satellite: satellite_name.to_string(),
        catalog_number,
        aos: aos.0,
        los: los.0,
        tca,
        max_elevation_deg: round2(max_el),
        aos_azimuth_deg: round2(aos.1),
        los_azimuth_deg: round2(los.1),
        duration_seconds: (los.0 - aos.0).num_seconds(),
    };

    loop {
        let look = look_at(propagator, observer, cursor)?;
        let visible = look.elevation_deg >= HORIZON_ELEVATION;

        if visible && !prev_visible {
            // AOS detected - refine to find exact crossing, unless the window
            // opens mid-pass
            pass_start = Some(if cursor == start {
                (cursor, look.azimuth_deg)
            } else {
                refine_crossing(propagator, observer, prev_cursor, cursor, true)?
            });
            max_el = look.elevation_deg;
            max_el_time = cursor;
        } else if visible {
            // Track maximum elevation during pass
            if look.elevation_deg > max_el {
                max_el = look.elevation_deg;
                max_el_time = cursor;
            }
        } else if prev_visible {
            if let Some(aos) = pass_start.take() {
                // LOS detected - refine and create pass
                let los = refine_crossing(propagator, observer, prev_cursor, cursor, false)?;
                if max_el >= min_elevation {
                    passes.push(make_pass(aos, los, max_el_time, max_el));
                }
            }
            max_el = 0.0;
        }

        prev_visible = visible;
        if cursor >= end {
            break;
        }
        // The last step is shortened so `end` itself is always scanned.
        prev_cursor = cursor;
        cursor = cursor
            .checked_add_signed(coarse_step)
            .map_or(end, |next| next.min(end));
    }

    // Handle pass in progress at end of window
    if let Some(aos) = pass_start {
        if max_el >= min_elevation {
            let look = look_at(propagator, observer, end)?;
            passes.push(make_pass(aos, (end, look.azimuth_deg), max_el_time, max_el));
        }
    }

    log::debug!(
        "Found {} passes of {} between {} and {}",
        passes.len(),
        satellite_name,
        start,
        end
    );
    Ok(passes)
}

fn look_at<P: Propagator + ?Sized>(
    propagator: &P,
    observer: &Observer,
    at: DateTime<Utc>,
) -> Result<LookAngles, PredictError> {
    let state = propagator.state_at(at)?;
    look_angles(&state, observer, at)
}

/// Binary search to find exact horizon crossing time
fn refine_crossing<P: Propagator + ?Sized>(
    propagator: &P,
    observer: &Observer,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    is_aos: bool, // true = rising, false = setting
) -> Result<(DateTime<Utc>, f64), PredictError> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = look_at(propagator, observer, mid)?.elevation_deg >= HORIZON_ELEVATION;
        if above == is_aos {
            high = mid;
        } else {
            low = mid;
        }
    }

    let final_look = look_at(propagator, observer, high)?;
    Ok((high, final_look.azimuth_deg))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::{geodetic_to_eci, julian_day_of};
    use crate::predict::types::StateVector;
    use chrono::TimeZone;

    /// Circles the equator eastward at 4 degrees per minute, 500 km up,
    /// crossing longitude 0 at t0 + 45 min.
    struct EquatorialStub {
        origin: DateTime<Utc>,
    }

    impl Propagator for EquatorialStub {
        fn state_at(&self, at: DateTime<Utc>) -> Result<StateVector, PredictError> {
            let minutes = (at - self.origin).num_milliseconds() as f64 / 60_000.0;
            let lon = (minutes * 4.0).rem_euclid(360.0) - 180.0;
            Ok(StateVector {
                epoch: at,
                position_km: geodetic_to_eci(0.0, lon, 500.0, julian_day_of(&at)),
                velocity_km_s: [0.0; 3],
            })
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn finds_single_overhead_pass() {
        let stub = EquatorialStub { origin: t0() };
        let observer = Observer::default();
        let passes = predict_passes(
            &stub,
            &observer,
            "STUB",
            Some(1),
            t0(),
            t0() + Duration::minutes(80),
            10.0,
        )
        .unwrap();

        assert_eq!(passes.len(), 1);
        let pass = &passes[0];
        assert!(pass.aos < pass.tca && pass.tca < pass.los);
        assert_eq!(pass.tca, t0() + Duration::minutes(45));
        assert!(pass.max_elevation_deg > 89.0);
        // Rises in the west, sets in the east
        assert!((pass.aos_azimuth_deg - 270.0).abs() < 1.0);
        assert!((pass.los_azimuth_deg - 90.0).abs() < 1.0);
        // Symmetric around TCA, within the refinement step
        let before = (pass.tca - pass.aos).num_seconds();
        let after = (pass.los - pass.tca).num_seconds();
        assert!((before - after).abs() <= 2);
        assert!((pass.duration_seconds - (before + after)).abs() <= 1);
    }

    #[test]
    fn low_passes_are_filtered() {
        let stub = EquatorialStub { origin: t0() };
        // 15 degrees north of the ground track: the stub never climbs high
        let observer = Observer::new(15.0, 0.0, 0.0).unwrap();
        let passes = predict_passes(
            &stub,
            &observer,
            "STUB",
            None,
            t0(),
            t0() + Duration::minutes(80),
            45.0,
        )
        .unwrap();
        assert!(passes.is_empty());
    }

    #[test]
    fn pass_open_at_window_end_closes_at_end() {
        let stub = EquatorialStub { origin: t0() };
        let observer = Observer::default();
        let end = t0() + Duration::minutes(45);
        let passes =
            predict_passes(&stub, &observer, "STUB", None, t0(), end, 0.0).unwrap();

        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].los, end);
    }

    #[test]
    fn pass_rising_inside_last_partial_step_is_reported() {
        let stub = EquatorialStub { origin: t0() };
        let observer = Observer::default();
        // Rises at about 39m30s, after the last whole-minute scan instant
        let end = t0() + Duration::seconds(39 * 60 + 55);
        let passes =
            predict_passes(&stub, &observer, "STUB", None, t0(), end, 0.0).unwrap();

        assert_eq!(passes.len(), 1);
        let pass = &passes[0];
        assert_eq!(pass.los, end);
        assert!(pass.aos > t0() + Duration::minutes(39) && pass.aos < end);
        assert!((pass.aos_azimuth_deg - 270.0).abs() < 1.0);
        assert!(pass.max_elevation_deg > 0.0);
    }

    #[test]
    fn rejects_reversed_window() {
        let stub = EquatorialStub { origin: t0() };
        let err = predict_passes(
            &stub,
            &Observer::default(),
            "STUB",
            None,
            t0() + Duration::hours(1),
            t0(),
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, PredictError::InvalidRange(_)));
    }
}
