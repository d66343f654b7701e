use crate::error::{AppError, AppResult};
use crate::fare::features::{FeatureSchema, FeatureVector, TripRequest};
use crate::fare::predictor::{FareOutcome, FarePredictor};
use crate::utils::currency::format_amount;
use crate::utils::geo::{is_within_radius, Coordinate};

/// Pickup and dropoff closer than this are treated as the same place
pub const MIN_TRIP_KM: f64 = 0.01;

/// Result of the one-time model load at startup
#[derive(Clone)]
pub enum ModelState {
    Ready(FarePredictor),
    Unavailable(String),
}

impl ModelState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }

    pub fn predictor(&self) -> AppResult<&FarePredictor> {
        match self {
            ModelState::Ready(predictor) => Ok(predictor),
            ModelState::Unavailable(reason) => Err(AppError::ModelUnavailable(reason.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Estimate {
    pub outcome: FareOutcome,
    pub features: FeatureVector,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub degenerate_trip: bool,
}

impl Estimate {
    pub fn fare(&self) -> Option<f64> {
        match self.outcome {
            FareOutcome::Fare { amount } => Some(amount),
            FareOutcome::NegativeFareWarning { .. } => None,
        }
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.features.distance_km
    }

    /// Text shown to the user for this estimate
    pub fn display(&self, currency_symbol: &str) -> String {
        match self.outcome {
            FareOutcome::Fare { amount } => {
                format!("Estimated Fare: {}", format_amount(currency_symbol, amount))
            }
            FareOutcome::NegativeFareWarning { .. } => self.warning().unwrap_or_default(),
        }
    }

    pub fn warning(&self) -> Option<String> {
        match self.outcome {
            FareOutcome::Fare { .. } => None,
            FareOutcome::NegativeFareWarning { .. } if self.degenerate_trip => Some(
                "The model predicted a negative fare: pickup and dropoff are the same location."
                    .to_string(),
            ),
            FareOutcome::NegativeFareWarning { .. } => Some(
                "The model predicted a negative fare. Please check the trip coordinates."
                    .to_string(),
            ),
        }
    }

    pub fn distance_display(&self) -> Option<String> {
        self.distance_km()
            .map(|km| format!("Calculated Distance: {:.2} km", km))
    }
}

/// Feature construction, model invocation, and result classification for one trip.
#[derive(Clone)]
pub struct FareEstimator {
    schema: FeatureSchema,
    default_day: u8,
    model: ModelState,
}

impl FareEstimator {
    pub fn new(schema: FeatureSchema, default_day: u8, model: ModelState) -> Self {
        if let ModelState::Ready(predictor) = &model {
            if let Some(expected) = predictor.expected_features() {
                if expected != schema.feature_count() {
                    tracing::warn!(
                        schema = %schema,
                        schema_features = schema.feature_count(),
                        model_features = expected,
                        "Model feature count does not match the configured schema"
                    );
                }
            }
        }

        Self {
            schema,
            default_day,
            model,
        }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn model(&self) -> &ModelState {
        &self.model
    }

    pub fn estimate(&self, trip: &TripRequest) -> AppResult<Estimate> {
        let predictor = self.model.predictor()?;
        trip.validate()?;

        let features = self.schema.build(trip, self.default_day);
        let outcome = predictor.classify(&features)?;
        let degenerate_trip = is_within_radius(trip.pickup, trip.dropoff, MIN_TRIP_KM);

        if let FareOutcome::NegativeFareWarning { amount } = outcome {
            tracing::warn!(amount, degenerate_trip, "Negative fare predicted");
        }

        Ok(Estimate {
            outcome,
            features,
            pickup: trip.pickup,
            dropoff: trip.dropoff,
            degenerate_trip,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fare::features::DEFAULT_DAY_OF_WEEK;
    use crate::fare::model::{LinearRegressionModel, ModelOutput};
    use crate::fare::predictor::tests::StubModel;

    fn lagos_trip() -> TripRequest {
        TripRequest {
            pickup: Coordinate::new(6.5244, 3.3792),
            dropoff: Coordinate::new(6.4531, 3.4682),
            hour: 12,
            day_of_week: Some(4),
            passengers: 1,
        }
    }

    fn estimator_with(model: Arc<StubModel>, schema: FeatureSchema) -> FareEstimator {
        FareEstimator::new(
            schema,
            DEFAULT_DAY_OF_WEEK,
            ModelState::Ready(FarePredictor::new(model)),
        )
    }

    #[test]
    fn test_distance_schema_end_to_end() {
        let stub = Arc::new(StubModel::returning(ModelOutput::from(vec![2500.0])));
        let estimator = estimator_with(stub.clone(), FeatureSchema::Distance);

        let estimate = estimator.estimate(&lagos_trip()).unwrap();

        let distance = estimate.distance_km().unwrap();
        assert!((distance - 12.631).abs() < 0.01);
        assert_eq!(estimate.features.values, vec![distance, 12.0, 4.0, 1.0]);
        assert_eq!(
            stub.calls.lock().unwrap().as_slice(),
            &[vec![vec![distance, 12.0, 4.0, 1.0]]]
        );
        assert_eq!(estimate.fare(), Some(2500.0));
        assert_eq!(estimate.display("₦"), "Estimated Fare: ₦2,500.00");
        assert_eq!(
            estimate.distance_display().as_deref(),
            Some("Calculated Distance: 12.63 km")
        );
    }

    #[test]
    fn test_nested_output_is_displayed() {
        let nested = ModelOutput::List(vec![ModelOutput::from(vec![42.5])]);
        let estimator = estimator_with(Arc::new(StubModel::returning(nested)), FeatureSchema::Distance);

        let estimate = estimator.estimate(&lagos_trip()).unwrap();
        assert_eq!(estimate.display("₦"), "Estimated Fare: ₦42.50");
    }

    #[test]
    fn test_negative_fare_emits_warning() {
        let estimator = estimator_with(
            Arc::new(StubModel::returning(ModelOutput::Scalar(-3.2))),
            FeatureSchema::Distance,
        );

        let estimate = estimator.estimate(&lagos_trip()).unwrap();

        assert_eq!(estimate.outcome, FareOutcome::NegativeFareWarning { amount: -3.2 });
        assert_eq!(estimate.fare(), None);
        assert!(estimate.warning().is_some());
        assert!(!estimate.display("₦").contains('₦'));
    }

    #[test]
    fn test_degenerate_trip_is_flagged() {
        let estimator = estimator_with(
            Arc::new(StubModel::returning(ModelOutput::Scalar(-0.5))),
            FeatureSchema::Distance,
        );
        let mut trip = lagos_trip();
        trip.dropoff = trip.pickup;

        let estimate = estimator.estimate(&trip).unwrap();
        assert!(estimate.degenerate_trip);
        assert_eq!(estimate.features.values[0], 0.0);
        assert!(estimate.warning().unwrap().contains("same location"));
    }

    #[test]
    fn test_coordinates_schema_has_no_distance() {
        let stub = Arc::new(StubModel::returning(ModelOutput::Scalar(10.0)));
        let estimator = estimator_with(stub.clone(), FeatureSchema::Coordinates);
        let mut trip = lagos_trip();
        trip.day_of_week = None;

        let estimate = estimator.estimate(&trip).unwrap();
        assert_eq!(estimate.distance_km(), None);
        assert_eq!(estimate.distance_display(), None);
        assert_eq!(
            estimate.features.values,
            vec![3.3792, 6.5244, 3.4682, 6.4531, 1.0, 12.0, 4.0]
        );
    }

    #[test]
    fn test_unavailable_model() {
        let estimator = FareEstimator::new(
            FeatureSchema::Distance,
            DEFAULT_DAY_OF_WEEK,
            ModelState::Unavailable("lrmodel.json not found".to_string()),
        );

        let err = estimator.estimate(&lagos_trip()).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
        assert!(!estimator.model().is_ready());
    }

    #[test]
    fn test_invalid_trip_does_not_call_model() {
        let stub = Arc::new(StubModel::returning(ModelOutput::Scalar(10.0)));
        let estimator = estimator_with(stub.clone(), FeatureSchema::Distance);
        let mut trip = lagos_trip();
        trip.passengers = 9;

        let err = estimator.estimate(&trip).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_schema_mismatch_surfaces_prediction_error() {
        let model = LinearRegressionModel::new(1.0, vec![1.0; 4]);
        let estimator = FareEstimator::new(
            FeatureSchema::Coordinates,
            DEFAULT_DAY_OF_WEEK,
            ModelState::Ready(FarePredictor::new(Arc::new(model))),
        );

        let err = estimator.estimate(&lagos_trip()).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));

        // Next request goes through the same path without lingering state
        let err = estimator.estimate(&lagos_trip()).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));
    }
}
