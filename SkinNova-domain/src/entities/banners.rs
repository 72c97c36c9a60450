/// Banner fields as submitted. Style values are parsed by the banner service.
#[derive(Debug, Clone, Default)]
pub struct BannerInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub is_active: Option<bool>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub font_size: Option<String>,
    pub text_style: Option<String>,
    pub alignment: Option<String>,
    pub overlay_opacity: Option<f32>,
}
