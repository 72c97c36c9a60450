use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use skin_nova_data::models::DeviceType;
use skin_nova_domain::entities::{AnalyticsPeriod, HealthRecordInput, HealthRecordQuery};

use crate::api::ErrorResponse;

/// Measurements from a wearable device. Every metric is optional.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordRequest {
    pub device_type: Option<DeviceType>,
    pub device_id: Option<String>,
    /// Beats per minute, 20 to 250
    pub heart_rate: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub steps: Option<i64>,
    pub calories_burned: Option<f64>,
    /// Celsius, 30 to 45
    pub body_temperature: Option<f64>,
    /// SpO2 percentage, 50 to 100
    pub blood_oxygen: Option<f64>,
    /// 0 to 100
    pub stress_level: Option<f64>,
    pub sleep_duration_minutes: Option<i64>,
    /// 0 to 100
    pub sleep_quality_score: Option<f64>,
    pub water_intake_ml: Option<i64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl From<HealthRecordRequest> for HealthRecordInput {
    fn from(request: HealthRecordRequest) -> Self {
        HealthRecordInput {
            device_type: request.device_type,
            device_id: request.device_id,
            heart_rate: request.heart_rate,
            resting_heart_rate: request.resting_heart_rate,
            steps: request.steps,
            calories_burned: request.calories_burned,
            body_temperature: request.body_temperature,
            blood_oxygen: request.blood_oxygen,
            stress_level: request.stress_level,
            sleep_duration_minutes: request.sleep_duration_minutes,
            sleep_quality_score: request.sleep_quality_score,
            water_intake_ml: request.water_intake_ml,
            recorded_at: request.recorded_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecordsQuery {
    /// ISO 8601 lower bound on `recordedAt`
    pub from: Option<DateTime<Utc>>,
    /// ISO 8601 upper bound on `recordedAt`
    pub to: Option<DateTime<Utc>>,
    pub device_type: Option<String>,
    /// Page number (default: 1)
    pub page: Option<usize>,
    /// Page size (default: 50, max: 500)
    pub limit: Option<usize>,
}

impl TryFrom<RecordsQuery> for HealthRecordQuery {
    type Error = ErrorResponse;

    fn try_from(query: RecordsQuery) -> Result<Self, Self::Error> {
        let device_type = query
            .device_type
            .as_deref()
            .map(DeviceType::from_str)
            .transpose()
            .map_err(|e| ErrorResponse::bad_request(e.to_string()))?;

        Ok(HealthRecordQuery {
            from: query.from,
            to: query.to,
            device_type,
            page: query.page,
            limit: query.limit,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// 7d (default), 30d or 90d
    pub period: Option<String>,
}

impl AnalyticsQuery {
    pub fn period(&self) -> Result<AnalyticsPeriod, ErrorResponse> {
        match self.period.as_deref() {
            Some(period) => AnalyticsPeriod::from_str(period).map_err(|e| ErrorResponse::bad_request(e.to_string())),
            None => Ok(AnalyticsPeriod::default()),
        }
    }
}
