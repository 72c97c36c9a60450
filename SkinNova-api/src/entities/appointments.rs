use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use skin_nova_data::models::{AppointmentStatus, Location};
use skin_nova_domain::entities::{
    AppointmentFilter, AppointmentView, ApproveAppointmentInput, CompleteAppointmentInput, CreateAppointmentInput,
    RejectAppointmentInput,
};

use crate::api::ErrorResponse;

/// Request for an appointment with a doctor
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub doctor_id: String,

    pub requested_date: DateTime<Utc>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Reason cannot exceed 2000 characters"))]
    pub reason: String,

    /// Admins may book on behalf of a patient
    pub patient_id: Option<String>,

    pub availability_slot_id: Option<String>,

    pub location: Option<Location>,
}

impl From<CreateAppointmentRequest> for CreateAppointmentInput {
    fn from(request: CreateAppointmentRequest) -> Self {
        CreateAppointmentInput {
            doctor_id: request.doctor_id,
            requested_date: request.requested_date,
            reason: request.reason,
            patient_id: request.patient_id,
            availability_slot_id: request.availability_slot_id,
            location: request.location,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentsQuery {
    /// all (default), pending, upcoming or past
    pub view: Option<String>,
    /// pending, approved, rejected or completed
    pub status: Option<String>,
}

impl TryFrom<AppointmentsQuery> for AppointmentFilter {
    type Error = ErrorResponse;

    fn try_from(query: AppointmentsQuery) -> Result<Self, Self::Error> {
        let view = match query.view.as_deref() {
            Some(view) => AppointmentView::from_str(view).map_err(|e| ErrorResponse::bad_request(e.to_string()))?,
            None => AppointmentView::All,
        };
        let status = query
            .status
            .as_deref()
            .filter(|status| !status.trim().is_empty())
            .map(AppointmentStatus::from_str)
            .transpose()
            .map_err(|e| ErrorResponse::bad_request(e.to_string()))?;

        Ok(AppointmentFilter { view, status })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAppointmentRequest {
    /// Defaults to the requested date
    pub approved_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl From<ApproveAppointmentRequest> for ApproveAppointmentInput {
    fn from(request: ApproveAppointmentRequest) -> Self {
        ApproveAppointmentInput {
            approved_date: request.approved_date,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RejectAppointmentRequest {
    #[validate(length(max = 2000, message = "Reason cannot exceed 2000 characters"))]
    pub reason: Option<String>,
}

impl From<RejectAppointmentRequest> for RejectAppointmentInput {
    fn from(request: RejectAppointmentRequest) -> Self {
        RejectAppointmentInput { reason: request.reason }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteAppointmentRequest {
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl From<CompleteAppointmentRequest> for CompleteAppointmentInput {
    fn from(request: CompleteAppointmentRequest) -> Self {
        CompleteAppointmentInput { notes: request.notes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_view_and_status() {
        let filter = AppointmentFilter::try_from(AppointmentsQuery {
            view: Some("Upcoming".into()),
            status: Some("approved".into()),
        })
        .unwrap();
        assert_eq!(filter.view, AppointmentView::Upcoming);
        assert_eq!(filter.status, Some(AppointmentStatus::Approved));

        let err = AppointmentFilter::try_from(AppointmentsQuery {
            view: Some("someday".into()),
            status: None,
        })
        .unwrap_err();
        assert_eq!(err.error, "bad_request");
    }
}
