//! Wearable health metrics and the skin health analysis built on them
//!
//! Records are ingested per user through the API. Analysis looks for
//! temperature, stress and sleep patterns that are known to affect skin
//! conditions.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use skin_nova_data::models::HealthRecord;
use skin_nova_data::repository::{HealthRecordFilter, HealthRecordRepository, SharedDocumentStore};

use crate::auth::AuthUser;
use crate::entities::{
    AnalyticsPeriod, DailyMetrics, HealthAnalytics, HealthInsight, HealthRecordInput, HealthRecordPage,
    HealthRecordQuery, HealthSummary, InsightKind, LatestHealth, Pagination, RiskFactor, TrendAnalysis,
};
use crate::services::errors::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

const ELEVATED_TEMPERATURE: f64 = 37.5;
const HIGH_STRESS_TREND: f64 = 60.0;
const HIGH_STRESS_READING: f64 = 70.0;
const MIN_SLEEP_MINUTES: f64 = 360.0;
const HIGH_HEART_RATE: f64 = 100.0;
const LOW_SLEEP_QUALITY: f64 = 50.0;
const ACTIVE_STEPS: u32 = 10_000;
const LOW_WATER_ML: u32 = 1_500;

#[derive(Debug, Clone)]
pub struct HealthMetricsService {
    records: HealthRecordRepository,
}

fn check_range(value: Option<f64>, min: f64, max: f64, field: &str) -> ServiceResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < min || v > max => Err(ServiceError::validation(format!(
            "{} must be between {} and {}",
            field, min, max
        ))),
        _ => Ok(()),
    }
}

fn non_negative(value: Option<i64>, field: &str) -> ServiceResult<Option<u32>> {
    value
        .map(|v| u32::try_from(v).map_err(|_| ServiceError::validation(format!("{} must be a non-negative number", field))))
        .transpose()
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Aggregates over a set of records
pub fn summarize(records: &[HealthRecord]) -> HealthSummary {
    HealthSummary {
        average_heart_rate: average(records.iter().filter_map(|r| r.heart_rate)),
        average_body_temperature: average(records.iter().filter_map(|r| r.body_temperature)),
        average_blood_oxygen: average(records.iter().filter_map(|r| r.blood_oxygen)),
        average_stress_level: average(records.iter().filter_map(|r| r.stress_level)),
        average_sleep_quality: average(records.iter().filter_map(|r| r.sleep_quality_score)),
        total_steps: records.iter().filter_map(|r| r.steps).map(u64::from).sum(),
        total_water_intake_ml: records.iter().filter_map(|r| r.water_intake_ml).map(u64::from).sum(),
        max_sleep_duration_minutes: records.iter().filter_map(|r| r.sleep_duration_minutes).max(),
        record_count: records.len(),
    }
}

/// Group records by UTC day, oldest day first
pub fn daily_metrics(records: &[HealthRecord]) -> Vec<DailyMetrics> {
    let mut days: BTreeMap<NaiveDate, Vec<&HealthRecord>> = BTreeMap::new();
    for record in records {
        days.entry(record.recorded_at.date_naive()).or_default().push(record);
    }

    days.into_iter()
        .map(|(date, day)| DailyMetrics {
            date,
            heart_rate: average(day.iter().filter_map(|r| r.heart_rate)),
            body_temperature: average(day.iter().filter_map(|r| r.body_temperature)),
            blood_oxygen: average(day.iter().filter_map(|r| r.blood_oxygen)),
            stress_level: average(day.iter().filter_map(|r| r.stress_level)),
            steps: day.iter().filter_map(|r| r.steps).max(),
            sleep_minutes: day.iter().filter_map(|r| r.sleep_duration_minutes).max(),
            record_count: day.len(),
        })
        .collect()
}

/// Risk factors for skin health over a window of records
pub fn analyze_trends(records: &[HealthRecord]) -> TrendAnalysis {
    let average_body_temperature = average(records.iter().filter_map(|r| r.body_temperature));
    let average_stress_level = average(records.iter().filter_map(|r| r.stress_level));
    let average_sleep_minutes = average(records.iter().filter_map(|r| r.sleep_duration_minutes.map(f64::from)));

    let mut risk_factors = Vec::new();

    if average_body_temperature.map_or(false, |t| t > ELEVATED_TEMPERATURE) {
        risk_factors.push(RiskFactor {
            factor: "Elevated body temperature".to_string(),
            recommendation: "Monitor for signs of infection or inflammation".to_string(),
            correlation: "Higher temperature may indicate active skin inflammation".to_string(),
        });
    }
    if average_stress_level.map_or(false, |s| s > HIGH_STRESS_TREND) {
        risk_factors.push(RiskFactor {
            factor: "High stress levels".to_string(),
            recommendation: "Practice stress management techniques, stress can worsen skin conditions".to_string(),
            correlation: "Elevated stress is linked to skin flare-ups and slower healing".to_string(),
        });
    }
    if average_sleep_minutes.map_or(false, |m| m < MIN_SLEEP_MINUTES) {
        risk_factors.push(RiskFactor {
            factor: "Insufficient sleep".to_string(),
            recommendation: "Aim for 7-9 hours of quality sleep for better skin recovery".to_string(),
            correlation: "Poor sleep can impair immune function and skin healing".to_string(),
        });
    }

    TrendAnalysis {
        average_body_temperature,
        average_stress_level,
        average_sleep_minutes,
        risk_factors,
    }
}

fn insight(kind: InsightKind, title: &str, message: &str) -> HealthInsight {
    HealthInsight {
        kind,
        title: title.to_string(),
        message: message.to_string(),
    }
}

/// Personal hints derived from the most recent record
pub fn generate_insights(latest: Option<&HealthRecord>) -> Vec<HealthInsight> {
    let Some(record) = latest else {
        return Vec::new();
    };
    let mut insights = Vec::new();

    if record.heart_rate.map_or(false, |hr| hr > HIGH_HEART_RATE) {
        insights.push(insight(
            InsightKind::Warning,
            "Elevated heart rate",
            "Elevated heart rate detected. This could be due to physical activity or stress.",
        ));
    }
    if record.body_temperature.map_or(false, |t| t > ELEVATED_TEMPERATURE) {
        insights.push(insight(
            InsightKind::Warning,
            "Elevated temperature",
            "Your body temperature is slightly elevated. Monitor for any signs of infection.",
        ));
    }
    if record.stress_level.map_or(false, |s| s > HIGH_STRESS_READING) {
        insights.push(insight(
            InsightKind::Warning,
            "High stress",
            "High stress levels detected. Consider relaxation techniques to help with skin healing.",
        ));
    }
    if record.sleep_quality_score.map_or(false, |q| q < LOW_SLEEP_QUALITY) {
        insights.push(insight(
            InsightKind::Info,
            "Sleep quality",
            "Your sleep quality is below optimal. Better sleep can improve skin recovery.",
        ));
    }
    if record.steps.map_or(false, |steps| steps > ACTIVE_STEPS) {
        insights.push(insight(
            InsightKind::Positive,
            "Great activity level",
            "Physical activity promotes healthy circulation and skin health.",
        ));
    }
    if record.water_intake_ml.map_or(false, |ml| ml < LOW_WATER_ML) {
        insights.push(insight(
            InsightKind::Info,
            "Hydration",
            "Remember to stay hydrated! Adequate water intake is crucial for skin health.",
        ));
    }

    insights
}

impl HealthMetricsService {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            records: HealthRecordRepository::new(store),
        }
    }

    pub async fn record(&self, requester: &AuthUser, input: HealthRecordInput) -> ServiceResult<HealthRecord> {
        check_range(input.heart_rate, 20.0, 250.0, "Heart rate")?;
        check_range(input.resting_heart_rate, 20.0, 250.0, "Resting heart rate")?;
        check_range(input.body_temperature, 30.0, 45.0, "Body temperature")?;
        check_range(input.blood_oxygen, 50.0, 100.0, "Blood oxygen")?;
        check_range(input.stress_level, 0.0, 100.0, "Stress level")?;
        check_range(input.sleep_quality_score, 0.0, 100.0, "Sleep quality score")?;
        check_range(input.calories_burned, 0.0, f64::MAX, "Calories burned")?;

        let now = Utc::now();
        let record = HealthRecord {
            id: Uuid::new_v4().to_string(),
            user_id: requester.id.clone(),
            device_type: input.device_type.unwrap_or_default(),
            device_id: input.device_id,
            heart_rate: input.heart_rate,
            resting_heart_rate: input.resting_heart_rate,
            steps: non_negative(input.steps, "Steps")?,
            calories_burned: input.calories_burned,
            body_temperature: input.body_temperature,
            blood_oxygen: input.blood_oxygen,
            stress_level: input.stress_level,
            sleep_duration_minutes: non_negative(input.sleep_duration_minutes, "Sleep duration")?,
            sleep_quality_score: input.sleep_quality_score,
            water_intake_ml: non_negative(input.water_intake_ml, "Water intake")?,
            recorded_at: input.recorded_at.unwrap_or(now),
            created_at: now,
        };

        self.records.insert(&record).await?;
        debug!("Stored health record {} for user {}", record.id, requester.id);
        Ok(record)
    }

    /// One page of the caller's records, newest first
    pub async fn list(&self, requester: &AuthUser, query: HealthRecordQuery) -> ServiceResult<HealthRecordPage> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let filter = HealthRecordFilter {
            from: query.from,
            to: query.to,
            device_type: query.device_type,
        };
        let all = self.records.list_for_user(&requester.id, &filter).await?;
        let total = all.len();

        let offset = (page - 1).saturating_mul(limit);
        let records = all.into_iter().skip(offset).take(limit).collect();
        Ok(HealthRecordPage {
            records,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        })
    }

    /// Most recent record with a 24 hour summary
    pub async fn latest(&self, requester: &AuthUser) -> ServiceResult<LatestHealth> {
        let since = Utc::now() - Duration::hours(24);
        let day = self
            .records
            .list_for_user(&requester.id, &HealthRecordFilter::since(since))
            .await?;
        let latest = self.records.latest_for_user(&requester.id).await?;

        Ok(LatestHealth {
            insights: generate_insights(latest.as_ref()),
            summary: summarize(&day),
            latest,
        })
    }

    pub async fn analytics(&self, requester: &AuthUser, period: AnalyticsPeriod) -> ServiceResult<HealthAnalytics> {
        let since = Utc::now() - period.duration();
        let records = self
            .records
            .list_for_user(&requester.id, &HealthRecordFilter::since(since))
            .await?;

        Ok(HealthAnalytics {
            period,
            daily: daily_metrics(&records),
            trends: analyze_trends(&records),
            insights: generate_insights(records.first()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use skin_nova_data::models::{DeviceType, Role};

    use crate::testing::TestContext;

    fn record_at(recorded_at: DateTime<Utc>) -> HealthRecord {
        HealthRecord {
            id: Uuid::new_v4().to_string(),
            user_id: "u".into(),
            recorded_at,
            created_at: recorded_at,
            ..Default::default()
        }
    }

    #[test]
    fn empty_window_has_no_findings() {
        let trends = analyze_trends(&[]);
        assert!(trends.risk_factors.is_empty());
        assert_eq!(trends.average_body_temperature, None);
        assert!(generate_insights(None).is_empty());
    }

    #[test]
    fn trend_thresholds() {
        let now = Utc::now();
        let mut hot = record_at(now);
        hot.body_temperature = Some(38.0);
        hot.stress_level = Some(65.0);
        hot.sleep_duration_minutes = Some(300);
        let mut calm = record_at(now);
        calm.body_temperature = Some(37.4);
        calm.stress_level = Some(60.0);
        calm.sleep_duration_minutes = Some(480);

        let factors: Vec<String> = analyze_trends(&[hot.clone(), calm.clone()])
            .risk_factors
            .into_iter()
            .map(|f| f.factor)
            .collect();
        // averages 37.7, 62.5 and 390
        assert_eq!(factors, vec!["Elevated body temperature", "High stress levels"]);

        assert!(analyze_trends(&[calm]).risk_factors.is_empty());
        assert_eq!(analyze_trends(&[hot]).risk_factors.len(), 3);
    }

    #[test]
    fn insights_follow_latest_record() {
        let mut record = record_at(Utc::now());
        record.heart_rate = Some(120.0);
        record.steps = Some(12_000);
        record.water_intake_ml = Some(800);
        record.sleep_quality_score = Some(80.0);

        let kinds: Vec<InsightKind> = generate_insights(Some(&record)).into_iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsightKind::Warning, InsightKind::Positive, InsightKind::Info]);
    }

    #[test]
    fn daily_buckets_use_utc_dates() {
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let later_same_day = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 3, 2, 0, 15, 0).unwrap();

        let mut a = record_at(first);
        a.heart_rate = Some(60.0);
        a.steps = Some(1000);
        let mut b = record_at(later_same_day);
        b.heart_rate = Some(80.0);
        b.steps = Some(7000);
        let c = record_at(next_day);

        let days = daily_metrics(&[b, c, a]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(days[0].heart_rate, Some(70.0));
        assert_eq!(days[0].steps, Some(7000));
        assert_eq!(days[0].record_count, 2);
        assert_eq!(days[1].heart_rate, None);
    }

    #[tokio::test]
    async fn out_of_range_values_are_rejected() {
        let ctx = TestContext::new();
        let user = AuthUser::from(&ctx.create_user("pat@example.com", Role::Patient).await);
        let service = &ctx.services.health_metrics;

        for input in [
            HealthRecordInput {
                heart_rate: Some(300.0),
                ..Default::default()
            },
            HealthRecordInput {
                body_temperature: Some(29.0),
                ..Default::default()
            },
            HealthRecordInput {
                blood_oxygen: Some(101.0),
                ..Default::default()
            },
            HealthRecordInput {
                steps: Some(-5),
                ..Default::default()
            },
        ] {
            assert!(matches!(service.record(&user, input).await, Err(ServiceError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn records_are_paginated_newest_first() {
        let ctx = TestContext::new();
        let user = AuthUser::from(&ctx.create_user("pat@example.com", Role::Patient).await);
        let service = &ctx.services.health_metrics;
        let now = Utc::now();

        for minutes in 0..5 {
            service
                .record(
                    &user,
                    HealthRecordInput {
                        device_type: Some(DeviceType::Fitbit),
                        heart_rate: Some(60.0 + minutes as f64),
                        recorded_at: Some(now - Duration::minutes(minutes)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let page = service
            .list(
                &user,
                HealthRecordQuery {
                    page: Some(2),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination, Pagination { page: 2, limit: 2, total: 5, pages: 3 });
        assert_eq!(page.records[0].heart_rate, Some(62.0));

        let capped = service
            .list(
                &user,
                HealthRecordQuery {
                    limit: Some(10_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(capped.pagination.limit, MAX_PAGE_SIZE);

        let beyond = service
            .list(
                &user,
                HealthRecordQuery {
                    page: Some(usize::MAX),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(beyond.records.is_empty());
        assert_eq!(beyond.pagination.total, 5);
    }

    #[tokio::test]
    async fn latest_summarizes_last_day() {
        let ctx = TestContext::new();
        let user = AuthUser::from(&ctx.create_user("pat@example.com", Role::Patient).await);
        let service = &ctx.services.health_metrics;
        let now = Utc::now();

        for (hours_ago, steps, heart_rate) in [(1, 4000, 70.0), (3, 3000, 90.0), (30, 9000, 120.0)] {
            service
                .record(
                    &user,
                    HealthRecordInput {
                        steps: Some(steps),
                        heart_rate: Some(heart_rate),
                        recorded_at: Some(now - Duration::hours(hours_ago)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let latest = service.latest(&user).await.unwrap();
        assert_eq!(latest.latest.unwrap().steps, Some(4000));
        assert_eq!(latest.summary.record_count, 2);
        assert_eq!(latest.summary.total_steps, 7000);
        assert_eq!(latest.summary.average_heart_rate, Some(80.0));

        let analytics = service.analytics(&user, AnalyticsPeriod::Week).await.unwrap();
        assert_eq!(analytics.daily.iter().map(|d| d.record_count).sum::<usize>(), 3);
    }
}
