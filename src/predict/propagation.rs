use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::predict::types::StateVector;
use crate::predict::PredictError;
use crate::tle::OrbitalElementSet;

/// Produces the inertial state of one satellite at arbitrary instants.
pub trait Propagator: Send + Sync {
    fn state_at(&self, at: DateTime<Utc>) -> Result<StateVector, PredictError>;
}

/// SGP4/SDP4 kernel from the `sgp4` crate.
pub struct Sgp4Propagator {
    elements: Elements,
    constants: Constants,
    validity_window: Option<Duration>,
}

impl Sgp4Propagator {
    pub fn new(set: &OrbitalElementSet) -> Result<Self, PredictError> {
        match set.mean_motion {
            Some(n) if n > 0.0 => {}
            other => {
                return Err(PredictError::Propagation(format!(
                    "mean motion must be positive, got {:?}",
                    other
                )))
            }
        }

        let elements = Elements::from_tle(
            Some(set.name.clone()),
            set.line1.as_bytes(),
            set.line2.as_bytes(),
        )?;
        let constants = Constants::from_elements(&elements)?;

        Ok(Self {
            elements,
            constants,
            validity_window: None,
        })
    }

    /// Refuse instants further than `window` from the element epoch.
    pub fn with_validity_window(mut self, window: Duration) -> Self {
        self.validity_window = Some(window);
        self
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }
}

impl Propagator for Sgp4Propagator {
    fn state_at(&self, at: DateTime<Utc>) -> Result<StateVector, PredictError> {
        if let Some(window) = self.validity_window {
            let age = at - self.epoch();
            if age > window || age < -window {
                return Err(PredictError::Propagation(format!(
                    "{} is {} days from element epoch {}, beyond the {} day window",
                    at,
                    age.num_days(),
                    self.epoch(),
                    window.num_days()
                )));
            }
        }

        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))?;
        let prediction = self.constants.propagate(minutes)?;

        Ok(StateVector {
            epoch: at,
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}
