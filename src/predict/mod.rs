mod batch;
mod error;
mod look_angles;
mod observer;
mod pass_finder;
mod propagation;
mod sampler;
mod types;

pub use batch::{evaluate_all, evaluate_batch, mean_altitude_km, BatchSummary};
pub use error::PredictError;
pub use look_angles::look_angles;
pub use observer::Observer;
pub use pass_finder::predict_passes;
pub use propagation::{Propagator, Sgp4Propagator};
pub use sampler::{evaluate, sample, sample_text, SampleInstants};
pub use types::{LookAngles, Pass, StateVector, Trajectory, TrajectorySample};
