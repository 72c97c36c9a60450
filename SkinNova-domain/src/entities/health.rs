use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use skin_nova_data::models::common::UnknownVariant;
use skin_nova_data::models::{DeviceType, HealthRecord};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Measurements submitted from a wearable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordInput {
    pub device_type: Option<DeviceType>,
    pub device_id: Option<String>,
    pub heart_rate: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub steps: Option<i64>,
    pub calories_burned: Option<f64>,
    pub body_temperature: Option<f64>,
    pub blood_oxygen: Option<f64>,
    pub stress_level: Option<f64>,
    pub sleep_duration_minutes: Option<i64>,
    pub sleep_quality_score: Option<f64>,
    pub water_intake_ml: Option<i64>,
    /// Defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct HealthRecordQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub device_type: Option<DeviceType>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthRecordPage {
    pub records: Vec<HealthRecord>,
    pub pagination: Pagination,
}

/// Aggregates over the last 24 hours
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub average_heart_rate: Option<f64>,
    pub average_body_temperature: Option<f64>,
    pub average_blood_oxygen: Option<f64>,
    pub average_stress_level: Option<f64>,
    pub average_sleep_quality: Option<f64>,
    pub total_steps: u64,
    pub total_water_intake_ml: u64,
    pub max_sleep_duration_minutes: Option<u32>,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LatestHealth {
    pub latest: Option<HealthRecord>,
    pub summary: HealthSummary,
    pub insights: Vec<HealthInsight>,
}

/// Window of the analytics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum AnalyticsPeriod {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl AnalyticsPeriod {
    pub fn days(&self) -> i64 {
        match self {
            AnalyticsPeriod::Week => 7,
            AnalyticsPeriod::Month => 30,
            AnalyticsPeriod::Quarter => 90,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::days(self.days())
    }
}

impl FromStr for AnalyticsPeriod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(AnalyticsPeriod::Week),
            "30d" => Ok(AnalyticsPeriod::Month),
            "90d" => Ok(AnalyticsPeriod::Quarter),
            _ => Err(UnknownVariant::new("analytics period", s)),
        }
    }
}

/// One UTC day of measurements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub heart_rate: Option<f64>,
    pub body_temperature: Option<f64>,
    pub blood_oxygen: Option<f64>,
    pub stress_level: Option<f64>,
    pub steps: Option<u32>,
    pub sleep_minutes: Option<u32>,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub factor: String,
    pub recommendation: String,
    /// How the factor relates to skin health
    pub correlation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub average_body_temperature: Option<f64>,
    pub average_stress_level: Option<f64>,
    pub average_sleep_minutes: Option<f64>,
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Info,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthInsight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthAnalytics {
    pub period: AnalyticsPeriod,
    pub daily: Vec<DailyMetrics>,
    pub trends: TrendAnalysis,
    pub insights: Vec<HealthInsight>,
}
