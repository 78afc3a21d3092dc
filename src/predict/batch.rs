use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::TAU;

use crate::predict::sampler::evaluate;
use crate::predict::types::TrajectorySample;
use crate::predict::{Observer, PredictError, Propagator, Sgp4Propagator};
use crate::tle::OrbitalElementSet;

const EARTH_MU_KM3_S2: f64 = 398_600.4418;
const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Evaluate every element set at `at` in parallel. The output is
/// index-aligned with `sets`; a failing set does not affect the others.
/// With a `validity_window`, sets whose epoch is further than that from `at`
/// fail like any other propagation error.
pub fn evaluate_batch(
    sets: &[OrbitalElementSet],
    at: DateTime<Utc>,
    observer: Option<&Observer>,
    validity_window: Option<Duration>,
) -> Vec<Result<TrajectorySample, PredictError>> {
    sets.par_iter()
        .map(|set| {
            Sgp4Propagator::new(set)
                .map(|propagator| match validity_window {
                    Some(window) => propagator.with_validity_window(window),
                    None => propagator,
                })
                .and_then(|propagator| evaluate(&propagator, at, observer))
                .map_err(|e| {
                    log::warn!("Failed to evaluate {}: {}", set.name, e);
                    e
                })
        })
        .collect()
}

pub fn evaluate_all<P: Propagator>(
    propagators: &[P],
    at: DateTime<Utc>,
    observer: Option<&Observer>,
) -> Vec<Result<TrajectorySample, PredictError>> {
    propagators
        .par_iter()
        .map(|propagator| evaluate(propagator, at, observer))
        .collect()
}

/// Aggregate figures over a batch of parsed records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub average_inclination_deg: Option<f64>,
    pub average_mean_motion: Option<f64>,
    pub lowest_altitude_km: Option<f64>,
    pub highest_altitude_km: Option<f64>,
}

impl BatchSummary {
    pub fn from_results<E>(results: &[Result<OrbitalElementSet, E>]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };

        let mut inclinations = Vec::new();
        let mut mean_motions = Vec::new();
        let mut altitudes = Vec::new();

        for result in results {
            let set = match result {
                Ok(set) => set,
                Err(_) => {
                    summary.failed += 1;
                    continue;
                }
            };
            summary.successful += 1;

            if let Some(inclination) = set.inclination_deg.filter(|i| *i > 0.0) {
                inclinations.push(inclination);
            }
            if let Some(n) = set.mean_motion.filter(|n| *n > 0.0) {
                mean_motions.push(n);
                if let Some(alt) = mean_altitude_km(n) {
                    altitudes.push(alt);
                }
            }
        }

        summary.average_inclination_deg = mean(&inclinations);
        summary.average_mean_motion = mean(&mean_motions);
        summary.lowest_altitude_km = altitudes.iter().copied().reduce(f64::min);
        summary.highest_altitude_km = altitudes.iter().copied().reduce(f64::max);
        summary
    }
}

/// Mean altitude above a spherical Earth implied by a mean motion in rev/day,
/// from Kepler's third law. `None` for sub-surface orbits.
pub fn mean_altitude_km(mean_motion_rev_day: f64) -> Option<f64> {
    if mean_motion_rev_day <= 0.0 {
        return None;
    }
    let n = mean_motion_rev_day * TAU / SECONDS_PER_DAY;
    let semi_major_axis = (EARTH_MU_KM3_S2 / (n * n)).cbrt();
    Some(semi_major_axis - EARTH_MEAN_RADIUS_KM).filter(|alt| *alt > 0.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::{parse_catalog, TleError};
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    const CATALOG: &str = "ISS (ZARYA)
1 25544U 98067A   04236.56031392  .00020137  00000-0  16538-3 0  9993
2 25544  51.6335 344.7760 0007976 126.2523 325.9359 15.70406856328906
BROKEN
1 99999U
2 99999 10.0
DEAD
1 11111U 98067A   04236.56031392  .00020137  00000-0  16538-3 0  9993
2 11111  51.6335 344.7760 0007976 126.2523 325.9359 0.0000000";

    #[test]
    fn summary_counts_and_statistics() {
        let results = parse_catalog(CATALOG);
        assert_eq!(results.len(), 3);

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_abs_diff_eq!(summary.average_inclination_deg.unwrap(), 51.6335, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.average_mean_motion.unwrap(), 15.70406856, epsilon = 1e-9);
        let low = summary.lowest_altitude_km.unwrap();
        assert!((340.0..390.0).contains(&low), "altitude {}", low);
        assert_eq!(summary.lowest_altitude_km, summary.highest_altitude_km);
    }

    #[test]
    fn empty_summary_has_no_statistics() {
        let summary = BatchSummary::from_results::<TleError>(&[]);
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn geostationary_altitude() {
        let alt = mean_altitude_km(1.0027).unwrap();
        assert!((35_700.0..35_900.0).contains(&alt), "altitude {}", alt);
        assert_eq!(mean_altitude_km(0.0), None);
        assert_eq!(mean_altitude_km(100.0), None);
    }

    #[test]
    fn batch_results_stay_in_input_order() {
        let sets: Vec<_> = parse_catalog(CATALOG)
            .into_iter()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(sets.len(), 2);

        let at = Utc.with_ymd_and_hms(2004, 8, 23, 14, 0, 0).unwrap();
        let results = evaluate_batch(&sets, at, None, None);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(PredictError::Propagation(_))));

        let observer = Observer::new(51.5, -0.1, 20.0).unwrap();
        let sequential = evaluate(&Sgp4Propagator::new(&sets[0]).unwrap(), at, Some(&observer))
            .unwrap();
        let parallel = evaluate_batch(&sets[..1], at, Some(&observer), None);
        assert_eq!(parallel[0].as_ref().unwrap(), &sequential);
    }

    #[test]
    fn batch_honours_validity_window() {
        let sets: Vec<_> = parse_catalog(CATALOG)
            .into_iter()
            .filter_map(Result::ok)
            .take(1)
            .collect();
        // 27 days after the element epoch
        let at = Utc.with_ymd_and_hms(2004, 9, 20, 0, 0, 0).unwrap();

        let open = evaluate_batch(&sets, at, None, None);
        assert!(open[0].is_ok());

        let limited = evaluate_batch(&sets, at, None, Some(Duration::days(1)));
        assert!(matches!(limited[0], Err(PredictError::Propagation(_))));

        let wide = evaluate_batch(&sets, at, None, Some(Duration::days(30)));
        assert_eq!(wide[0].as_ref().unwrap(), open[0].as_ref().unwrap());
    }

    #[test]
    fn evaluate_all_uses_each_propagator() {
        let sets: Vec<_> = parse_catalog(CATALOG)
            .into_iter()
            .filter_map(Result::ok)
            .take(1)
            .collect();
        let propagators: Vec<_> = (0..4)
            .map(|_| Sgp4Propagator::new(&sets[0]).unwrap())
            .collect();

        let at = Utc.with_ymd_and_hms(2004, 8, 23, 14, 0, 0).unwrap();
        let results = evaluate_all(&propagators, at, None);
        assert_eq!(results.len(), 4);
        let first = results[0].as_ref().unwrap();
        for r in &results {
            assert_eq!(r.as_ref().unwrap(), first);
        }
    }
}
