use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::fare::features::{FeatureSchema, DEFAULT_DAY_OF_WEEK, MAX_DAY_OF_WEEK};

#[derive(Clone, Debug)]
pub struct Config {
    pub model_path: PathBuf,
    pub feature_schema: FeatureSchema,
    pub default_day_of_week: u8,
    pub currency_symbol: String,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_per_ms: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_day_of_week: u8 = parse_or(&lookup, "DEFAULT_DAY_OF_WEEK", DEFAULT_DAY_OF_WEEK)?;
        if default_day_of_week > MAX_DAY_OF_WEEK {
            return Err(AppError::Config(format!(
                "DEFAULT_DAY_OF_WEEK must be between 0 and {}",
                MAX_DAY_OF_WEEK
            )));
        }

        Ok(Self {
            model_path: lookup("MODEL_PATH")
                .unwrap_or_else(|| "lrmodel.json".to_string())
                .into(),
            feature_schema: lookup("FEATURE_SCHEMA")
                .map(|s| s.parse::<FeatureSchema>())
                .transpose()?
                .unwrap_or(FeatureSchema::Distance),
            default_day_of_week,
            currency_symbol: lookup("CURRENCY_SYMBOL").unwrap_or_else(|| "₦".to_string()),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 3000)?,
            rate_limit_per_ms: parse_or(&lookup, "RATE_LIMIT_PER_MS", 60)?,
            rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", 100)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number", key))),
        None => Ok(default),
    }
}
