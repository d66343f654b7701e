use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::utils::geo::{haversine_distance, Coordinate};

pub const MAX_HOUR: u8 = 23;
pub const MAX_DAY_OF_WEEK: u8 = 6;
pub const MIN_PASSENGERS: u8 = 1;
pub const MAX_PASSENGERS: u8 = 6;

/// Friday, the day the distance-based model was fed when no day is chosen
pub const DEFAULT_DAY_OF_WEEK: u8 = 4;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TripRequest {
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub hour: u8,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    pub passengers: u8,
}

impl TripRequest {
    /// Reject values outside the ranges the input form allows.
    /// Coordinates are passed through as-is.
    pub fn validate(&self) -> AppResult<()> {
        if self.hour > MAX_HOUR {
            return Err(AppError::BadRequest(format!(
                "Hour must be between 0 and {} (got {})",
                MAX_HOUR, self.hour
            )));
        }

        if let Some(day) = self.day_of_week {
            if day > MAX_DAY_OF_WEEK {
                return Err(AppError::BadRequest(format!(
                    "Day of week must be between 0 and {} (got {})",
                    MAX_DAY_OF_WEEK, day
                )));
            }
        }

        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&self.passengers) {
            return Err(AppError::BadRequest(format!(
                "Passengers must be between {} and {} (got {})",
                MIN_PASSENGERS, MAX_PASSENGERS, self.passengers
            )));
        }

        Ok(())
    }
}

/// Feature layout the model was trained on. Only one is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// `[distance_km, hour, day_of_week, passengers]`
    Distance,
    /// `[pickup_lon, pickup_lat, dropoff_lon, dropoff_lat, passengers, hour, day_of_week]`
    Coordinates,
}

impl FeatureSchema {
    pub fn feature_names(&self) -> &'static [&'static str] {
        match self {
            FeatureSchema::Distance => &["distance_km", "hour", "day_of_week", "passengers"],
            FeatureSchema::Coordinates => &[
                "pickup_lon",
                "pickup_lat",
                "dropoff_lon",
                "dropoff_lat",
                "passengers",
                "hour",
                "day_of_week",
            ],
        }
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names().len()
    }

    pub fn build(&self, trip: &TripRequest, default_day: u8) -> FeatureVector {
        let day = f64::from(trip.day_of_week.unwrap_or(default_day));
        let hour = f64::from(trip.hour);
        let passengers = f64::from(trip.passengers);

        match self {
            FeatureSchema::Distance => {
                let distance_km = haversine_distance(trip.pickup, trip.dropoff);
                FeatureVector {
                    values: vec![distance_km, hour, day, passengers],
                    distance_km: Some(distance_km),
                }
            }
            FeatureSchema::Coordinates => FeatureVector {
                values: vec![
                    trip.pickup.lng,
                    trip.pickup.lat,
                    trip.dropoff.lng,
                    trip.dropoff.lat,
                    passengers,
                    hour,
                    day,
                ],
                distance_km: None,
            },
        }
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSchema::Distance => write!(f, "distance"),
            FeatureSchema::Coordinates => write!(f, "coordinates"),
        }
    }
}

impl FromStr for FeatureSchema {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(FeatureSchema::Distance),
            "coordinates" => Ok(FeatureSchema::Coordinates),
            other => Err(AppError::Config(format!(
                "Unknown feature schema '{}', expected 'distance' or 'coordinates'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub values: Vec<f64>,
    /// Set only when the schema derives distance from the coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}
