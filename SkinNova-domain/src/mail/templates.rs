//! HTML bodies for the emails SkinNova sends

use chrono::{DateTime, Utc};

use skin_nova_data::models::AppointmentStatus;

use super::EmailMessage;

const SUBJECT_PREFIX: &str = "SkinNova - ";

fn subject(text: &str) -> String {
    format!("{}{}", SUBJECT_PREFIX, text)
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%A, %B %-d, %Y at %H:%M UTC").to_string()
}

/// Minimal escaping for user supplied text placed into HTML
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(heading: &str, content: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb;">{heading}</h2>
  {content}
  <p style="color: #6b7280; font-size: 12px;">This is an automated message from SkinNova.</p>
</div>"#
    )
}

/// Link to the reset page, valid for one hour
pub fn password_reset_email(to: &str, reset_link: &str) -> EmailMessage {
    let content = format!(
        r#"<p>You requested a password reset for your SkinNova account.</p>
  <p><a href="{link}" style="background: #2563eb; color: #ffffff; padding: 10px 20px; text-decoration: none; border-radius: 4px;">Reset Password</a></p>
  <p>Or copy this link into your browser: {link}</p>
  <p>This link expires in 1 hour. If you did not request a reset, ignore this email.</p>"#,
        link = escape(reset_link)
    );

    EmailMessage {
        to: to.to_string(),
        subject: subject("Password Reset Request"),
        html_body: layout("Password Reset Request", &content),
    }
}

/// Tells a doctor about a new appointment request
pub fn appointment_request_email(
    doctor_email: &str,
    doctor_name: &str,
    patient_name: &str,
    requested_date: DateTime<Utc>,
    reason: &str,
) -> EmailMessage {
    let content = format!(
        r#"<p>Dear Dr. {doctor},</p>
  <p>{patient} has requested an appointment.</p>
  <ul>
    <li><strong>Requested date:</strong> {date}</li>
    <li><strong>Reason:</strong> {reason}</li>
  </ul>
  <p>Please log in to SkinNova to approve or reject the request.</p>"#,
        doctor = escape(doctor_name),
        patient = escape(patient_name),
        date = format_date(requested_date),
        reason = escape(reason),
    );

    EmailMessage {
        to: doctor_email.to_string(),
        subject: subject("New Appointment Request"),
        html_body: layout("New Appointment Request", &content),
    }
}

/// Tells a patient that the doctor approved or rejected the request
pub fn appointment_status_email(
    patient_email: &str,
    patient_name: &str,
    doctor_name: &str,
    status: AppointmentStatus,
    date: DateTime<Utc>,
    notes: Option<&str>,
) -> EmailMessage {
    let (title, summary) = match status {
        AppointmentStatus::Approved => (
            "Appointment Approved",
            format!("Your appointment with Dr. {} has been approved.", escape(doctor_name)),
        ),
        AppointmentStatus::Rejected => (
            "Appointment Rejected",
            format!("Your appointment request with Dr. {} was not accepted.", escape(doctor_name)),
        ),
        AppointmentStatus::Completed => (
            "Appointment Completed",
            format!("Your appointment with Dr. {} has been marked as completed.", escape(doctor_name)),
        ),
        AppointmentStatus::Pending => (
            "Appointment Pending",
            format!("Your appointment with Dr. {} is awaiting review.", escape(doctor_name)),
        ),
    };

    let notes = notes
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("\n    <li><strong>Notes:</strong> {}</li>", escape(n)))
        .unwrap_or_default();

    let content = format!(
        r#"<p>Dear {patient},</p>
  <p>{summary}</p>
  <ul>
    <li><strong>Date:</strong> {date}</li>{notes}
  </ul>"#,
        patient = escape(patient_name),
        date = format_date(date),
    );

    EmailMessage {
        to: patient_email.to_string(),
        subject: subject(title),
        html_body: layout(title, &content),
    }
}
