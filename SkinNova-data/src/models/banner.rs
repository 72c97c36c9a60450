use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::UnknownVariant;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BannerFontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BannerTextStyle {
    #[default]
    Normal,
    Italic,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BannerAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for BannerFontSize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(UnknownVariant::new("font size", s)),
        }
    }
}

impl FromStr for BannerTextStyle {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "italic" => Ok(Self::Italic),
            "bold" => Ok(Self::Bold),
            _ => Err(UnknownVariant::new("text style", s)),
        }
    }
}

impl FromStr for BannerAlignment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(UnknownVariant::new("alignment", s)),
        }
    }
}

pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";
pub const DEFAULT_OVERLAY_OPACITY: f32 = 0.4;

/// Storage model for a carousel banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub link: String,
    pub is_active: bool,
    pub text_color: String,
    pub background_color: String,
    pub font_size: BannerFontSize,
    pub text_style: BannerTextStyle,
    pub alignment: BannerAlignment,
    pub overlay_opacity: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    /// A banner with default styling
    pub fn new(title: String, description: String, image_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            image_url,
            link: String::new(),
            is_active: true,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            font_size: BannerFontSize::default(),
            text_style: BannerTextStyle::default(),
            alignment: BannerAlignment::default(),
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            created_at: now,
            updated_at: now,
        }
    }
}
