use chrono::{DateTime, Duration, Utc};

use crate::frames::{eci_to_ecef_velocity, eci_to_geodetic, gmst, julian_day_of, norm};
use crate::predict::look_angles::look_angles;
use crate::predict::types::{Trajectory, TrajectorySample};
use crate::predict::{Observer, PredictError, Propagator, Sgp4Propagator};
use crate::tle::parse_record;

/// The instants `start, start + interval, ...` up to and including `end`.
#[derive(Debug, Clone)]
pub struct SampleInstants {
    next: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
    interval: Duration,
}

impl SampleInstants {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Duration,
    ) -> Result<Self, PredictError> {
        if start > end {
            return Err(PredictError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        if interval <= Duration::zero() {
            return Err(PredictError::InvalidRange(format!(
                "interval must be positive, got {}",
                interval
            )));
        }
        Ok(Self {
            next: Some(start),
            end,
            interval,
        })
    }
}

impl Iterator for SampleInstants {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|t| *t <= self.end)?;
        self.next = current.checked_add_signed(self.interval);
        Some(current)
    }
}

/// Evaluate the pipeline at a single instant.
pub fn evaluate<P: Propagator + ?Sized>(
    propagator: &P,
    at: DateTime<Utc>,
    observer: Option<&Observer>,
) -> Result<TrajectorySample, PredictError> {
    let state = propagator.state_at(at)?;
    let g = gmst(julian_day_of(&at));
    let position = eci_to_geodetic(state.position_km, g);
    let earth_fixed_velocity = eci_to_ecef_velocity(state.position_km, state.velocity_km_s, g);
    let look = observer
        .map(|o| look_angles(&state, o, at))
        .transpose()?;

    Ok(TrajectorySample {
        epoch: at,
        position,
        speed_km_s: state.speed_km_s(),
        earth_fixed_speed_km_s: norm(earth_fixed_velocity),
        look_angles: look,
    })
}

/// Sample a trajectory over `[start, end]`. The first failing instant aborts
/// the whole run.
pub fn sample<P: Propagator + ?Sized>(
    propagator: &P,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
    observer: Option<&Observer>,
) -> Result<Trajectory, PredictError> {
    let instants = SampleInstants::new(start, end, interval)?;

    let samples = instants
        .map(|at| {
            evaluate(propagator, at, observer).map_err(|e| {
                log::debug!("Sampling aborted at {}: {}", at, e);
                e
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("Sampled {} points from {} to {}", samples.len(), start, end);
    Ok(Trajectory::new(samples))
}

/// Parse a 2- or 3-line record and sample it with the SGP4 kernel.
pub fn sample_text(
    tle: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
    observer: Option<&Observer>,
) -> Result<Trajectory, PredictError> {
    // Bounds are checked before any parsing or propagation happens.
    SampleInstants::new(start, end, interval)?;

    let elements = parse_record(tle)?;
    let propagator = Sgp4Propagator::new(&elements)?;
    sample(&propagator, start, end, interval, observer)
}
