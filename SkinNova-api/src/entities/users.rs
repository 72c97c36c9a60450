use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use skin_nova_domain::entities::{PublicUser, UpdateUserInput};

/// Admin update of an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(max = 100, message = "Name cannot exceed 100 characters"))]
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserInput {
    fn from(request: UpdateUserRequest) -> Self {
        UpdateUserInput {
            name: request.name,
            email: request.email,
            role: request.role,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyUserRequest {
    /// Defaults to true
    #[serde(default = "default_true")]
    pub verified: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DoctorsQuery {
    /// Only verified doctors (default: true)
    pub verified_only: Option<bool>,
}

/// Multipart form carrying the new photo under `profilePhoto`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePhotoUpload {
    #[schema(value_type = String, format = Binary)]
    pub profile_photo: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePhotoResponse {
    pub message: String,
    pub profile_photo: Option<String>,
    pub user: PublicUser,
}

impl From<PublicUser> for ProfilePhotoResponse {
    fn from(user: PublicUser) -> Self {
        Self {
            message: "Profile photo uploaded successfully".to_string(),
            profile_photo: user.profile_photo.clone(),
            user,
        }
    }
}
