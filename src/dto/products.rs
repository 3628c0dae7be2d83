use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub price: f64,
    pub old_price: Option<f64>,
    pub image: Option<String>,
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub prescription_required: bool,
    pub discount_percent: Option<f64>,
    pub category_slug: Option<String>,
    pub sub_slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub price: Option<f64>,
    pub old_price: Option<f64>,
    pub image: Option<String>,
    pub in_stock: Option<bool>,
    pub prescription_required: Option<bool>,
    pub discount_percent: Option<f64>,
    pub category_slug: Option<String>,
    pub sub_slug: Option<String>,
    pub popularity: Option<f64>,
    pub description: Option<String>,
}
