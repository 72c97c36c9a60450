use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::UnknownVariant;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Wearable the measurement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    AppleWatch,
    SamsungWatch,
    WearOs,
    Fitbit,
    #[default]
    Other,
}

impl FromStr for DeviceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apple-watch" => Ok(Self::AppleWatch),
            "samsung-watch" => Ok(Self::SamsungWatch),
            "wear-os" => Ok(Self::WearOs),
            "fitbit" => Ok(Self::Fitbit),
            "other" => Ok(Self::Other),
            _ => Err(UnknownVariant::new("device type", s)),
        }
    }
}

/// Storage model for one set of wearable measurements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: String,
    pub user_id: String,
    pub device_type: DeviceType,
    pub device_id: Option<String>,
    /// Beats per minute
    pub heart_rate: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub steps: Option<u32>,
    pub calories_burned: Option<f64>,
    /// Degrees Celsius
    pub body_temperature: Option<f64>,
    /// SpO2 percentage
    pub blood_oxygen: Option<f64>,
    /// 0-100
    pub stress_level: Option<f64>,
    pub sleep_duration_minutes: Option<u32>,
    /// 0-100
    pub sleep_quality_score: Option<f64>,
    pub water_intake_ml: Option<u32>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
