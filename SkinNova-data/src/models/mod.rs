// Storage models, persisted as JSON documents
pub mod activity;
pub mod appointment;
pub mod availability;
pub mod banner;
pub mod chat;
pub mod common;
pub mod health_record;
pub mod report;
pub mod user;

pub use activity::{Activity, ActivityAction, ActivityMetadata};
pub use appointment::{Appointment, AppointmentStatus};
pub use availability::AvailabilitySlot;
pub use banner::{Banner, BannerAlignment, BannerFontSize, BannerTextStyle};
pub use chat::{Chat, ChatMessage, SenderRole};
pub use common::Location;
pub use health_record::{DeviceType, HealthRecord};
pub use report::{Report, ReportAccess};
pub use user::{Role, User};
