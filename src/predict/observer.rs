use serde::Serialize;

use crate::frames::{geodetic_to_ecef, geodetic_to_eci, EARTH_ROTATION_RAD_S};
use crate::predict::PredictError;

/// A fixed point on the ground. Altitude is in metres at this boundary and
/// converted to kilometres for every frame computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Observer {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Result<Self, PredictError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(PredictError::InvalidObserver(format!(
                "latitude {} outside [-90, 90]",
                latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(PredictError::InvalidObserver(format!(
                "longitude {} outside [-180, 180]",
                longitude_deg
            )));
        }
        if !altitude_m.is_finite() {
            return Err(PredictError::InvalidObserver(format!(
                "altitude {} is not finite",
                altitude_m
            )));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        })
    }

    /// Parse `"lat,lon"` in degrees.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Result<Self, PredictError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(PredictError::InvalidObserver(format!(
                "expected \"lat,lon\", got {:?}",
                coordinates
            )));
        }
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| PredictError::InvalidObserver(format!("{:?}: {}", s, e)))
        };
        Self::new(parse(parts[0])?, parse(parts[1])?, altitude_m.unwrap_or(0.0))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_m / 1000.0
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        geodetic_to_ecef(self.latitude_deg, self.longitude_deg, self.altitude_km())
    }

    pub fn position_eci_km(&self, jd: f64) -> [f64; 3] {
        geodetic_to_eci(self.latitude_deg, self.longitude_deg, self.altitude_km(), jd)
    }

    /// Inertial velocity due to Earth rotation.
    pub fn velocity_eci_km_s(&self, jd: f64) -> [f64; 3] {
        let pos = self.position_eci_km(jd);
        [
            -EARTH_ROTATION_RAD_S * pos[1],
            EARTH_ROTATION_RAD_S * pos[0],
            0.0,
        ]
    }
}
