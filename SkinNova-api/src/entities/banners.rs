use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use skin_nova_domain::entities::BannerInput;

/// Banner fields. All are optional on update.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerRequest {
    #[validate(length(max = 200, message = "Title cannot exceed 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub is_active: Option<bool>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    /// small, medium or large
    pub font_size: Option<String>,
    /// normal, italic or bold
    pub text_style: Option<String>,
    /// left, center or right
    pub alignment: Option<String>,
    /// 0.0 to 1.0
    pub overlay_opacity: Option<f32>,
}

impl From<BannerRequest> for BannerInput {
    fn from(request: BannerRequest) -> Self {
        BannerInput {
            title: request.title,
            description: request.description,
            image_url: request.image_url,
            link: request.link,
            is_active: request.is_active,
            text_color: request.text_color,
            background_color: request.background_color,
            font_size: request.font_size,
            text_style: request.text_style,
            alignment: request.alignment,
            overlay_opacity: request.overlay_opacity,
        }
    }
}
