use thiserror::Error;

use crate::tle::TleError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid tle: {0}")]
    Format(#[from] TleError),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("degenerate geometry: observer and satellite coincide (range {range_km} km)")]
    DegenerateGeometry { range_km: f64 },
    #[error("invalid time range: {0}")]
    InvalidRange(String),
    #[error("invalid observer: {0}")]
    InvalidObserver(String),
}

impl From<sgp4::Error> for PredictError {
    fn from(err: sgp4::Error) -> Self {
        PredictError::Propagation(err.to_string())
    }
}

impl From<sgp4::TleError> for PredictError {
    fn from(err: sgp4::TleError) -> Self {
        PredictError::Propagation(format!("kernel rejected elements: {}", err))
    }
}

impl From<sgp4::ElementsError> for PredictError {
    fn from(err: sgp4::ElementsError) -> Self {
        PredictError::Propagation(format!("kernel rejected elements: {}", err))
    }
}
