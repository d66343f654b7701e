pub mod estimator;
pub mod features;
pub mod model;
pub mod predictor;

pub use estimator::{Estimate, FareEstimator, ModelState};
pub use features::{FeatureSchema, FeatureVector, TripRequest};
pub use model::{FareModel, LinearRegressionModel, ModelOutput};
pub use predictor::{FareOutcome, FarePredictor};
