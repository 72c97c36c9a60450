use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// New or edited message text
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MessageRequest {
    #[serde(default)]
    #[validate(length(max = 5000, message = "Message cannot exceed 5000 characters"))]
    pub content: String,
}
