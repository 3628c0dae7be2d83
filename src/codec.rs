use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::{Id, Product},
    storage::Storage,
};

pub const DEFAULT_TITLE: &str = "Без названия";
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x300?text=No+Image";

pub fn decode<T: DeserializeOwned>(storage: &Storage, key: &str, fallback: T) -> T {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return fallback,
        Err(err) => {
            tracing::warn!(key, error = %err, "storage read failed, using fallback");
            return fallback;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "malformed stored value, using fallback");
            fallback
        }
    }
}

pub fn encode<T: Serialize + ?Sized>(storage: &Storage, key: &str, value: &T) -> AppResult<()> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)?;
    Ok(())
}

// canonical name first, so normalizing twice is a no-op
#[derive(Debug)]
pub struct ProductAliases {
    pub id: &'static [&'static str],
    pub title: &'static [&'static str],
    pub subtitle: &'static [&'static str],
    pub price: &'static [&'static str],
    pub old_price: &'static [&'static str],
    pub image: &'static [&'static str],
    pub in_stock: &'static [&'static str],
    pub prescription_required: &'static [&'static str],
    pub discount_percent: &'static [&'static str],
    pub category_slug: &'static [&'static str],
    pub sub_slug: &'static [&'static str],
    pub popularity: &'static [&'static str],
    pub description: &'static [&'static str],
}

pub const PRODUCT_ALIASES: ProductAliases = ProductAliases {
    id: &["id", "_id", "productId", "sku"],
    title: &["title", "name", "productName"],
    subtitle: &["subtitle", "manufacturer", "brand"],
    price: &["price", "currentPrice", "cost"],
    old_price: &["oldPrice", "old_price", "priceOld"],
    image: &["image", "imageUrl", "img", "photo"],
    in_stock: &["inStock", "in_stock", "available"],
    prescription_required: &["prescriptionRequired", "prescription", "rx"],
    discount_percent: &["discountPercent", "discount"],
    category_slug: &["categorySlug", "category"],
    sub_slug: &["subSlug", "subcategorySlug", "subcategory"],
    popularity: &["popularity", "rating", "sales"],
    description: &["description", "desc", "details"],
};

/// Missing ids become an empty text id.
pub fn normalize_product(raw: &Value) -> Product {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let a = &PRODUCT_ALIASES;

    Product {
        id: id_field(obj, a.id).unwrap_or_else(|| Id::Text(String::new())),
        title: text_field(obj, a.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        subtitle: text_field(obj, a.subtitle).unwrap_or_default(),
        price: number_field(obj, a.price).unwrap_or(0.0),
        old_price: number_field(obj, a.old_price),
        image: text_field(obj, a.image).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        in_stock: flag_field(obj, a.in_stock),
        prescription_required: flag_field(obj, a.prescription_required).unwrap_or(false),
        discount_percent: number_field(obj, a.discount_percent),
        category_slug: text_field(obj, a.category_slug),
        sub_slug: text_field(obj, a.sub_slug),
        popularity: number_field(obj, a.popularity).unwrap_or(0.0),
        description: text_field(obj, a.description).unwrap_or_default(),
    }
}

fn first_present<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().filter_map(|name| obj.get(*name)).find(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn text_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match first_present(obj, names)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_field(obj: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    match first_present(obj, names)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            cleaned.replace(',', ".").parse().ok()
        }
        _ => None,
    }
}

fn flag_field(obj: &Map<String, Value>, names: &[&str]) -> Option<bool> {
    match first_present(obj, names)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn id_field(obj: &Map<String, Value>, names: &[&str]) -> Option<Id> {
    match first_present(obj, names)? {
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Id::Num(i),
            None => Id::Text(n.to_string()),
        }),
        Value::String(s) => Some(Id::Text(s.clone())),
        _ => None,
    }
}
