use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::frames::{norm, GeodeticPosition};

/// Inertial (TEME) state at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateVector {
    pub epoch: DateTime<Utc>,
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

impl StateVector {
    pub fn speed_km_s(&self) -> f64 {
        norm(self.velocity_km_s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub epoch: DateTime<Utc>,
    pub position: GeodeticPosition,
    pub speed_km_s: f64,
    /// Speed relative to the rotating Earth.
    pub earth_fixed_speed_km_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub look_angles: Option<LookAngles>,
}

/// Ordered samples produced by one sampler run. Iterating does not consume
/// it, so the sequence can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn new(samples: Vec<TrajectorySample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectorySample> {
        self.samples.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = (DateTime<Utc>, GeodeticPosition)> + '_ {
        self.samples.iter().map(|s| (s.epoch, s.position))
    }

    pub fn look_angles(&self) -> impl Iterator<Item = (DateTime<Utc>, LookAngles)> + '_ {
        self.samples
            .iter()
            .filter_map(|s| s.look_angles.map(|look| (s.epoch, look)))
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectorySample;
    type IntoIter = std::slice::Iter<'a, TrajectorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// A predicted pass over an observer
#[derive(Debug, Clone, Serialize)]
pub struct Pass {
    pub satellite: String,
    pub catalog_number: Option<u32>,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub tca: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub duration_seconds: i64,
}
