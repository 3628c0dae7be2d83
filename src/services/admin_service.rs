use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    codec::{PLACEHOLDER_IMAGE, decode, encode},
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::{AppError, AppResult},
    models::{Id, Product, Session},
    services::{auth_service::ensure_admin, product_service::ProductSource},
    storage::{Storage, keys},
};

/// Admin-managed products under the `products` key. Every mutation needs
/// an admin session.
#[derive(Debug)]
pub struct AdminCatalog {
    storage: Storage,
    products: Vec<Product>,
}

impl AdminCatalog {
    pub fn load(storage: Storage) -> Self {
        let products = decode(&storage, keys::PRODUCTS, Vec::new());
        Self { storage, products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn create_product(
        &mut self,
        session: Option<&Session>,
        payload: CreateProductRequest,
    ) -> AppResult<Product> {
        let admin = ensure_admin(session)?;
        validate_title(&payload.title)?;
        validate_price(payload.price)?;

        let product = Product {
            id: Id::Text(Uuid::new_v4().to_string()),
            title: payload.title,
            subtitle: payload.subtitle,
            price: payload.price,
            old_price: payload.old_price,
            image: payload
                .image
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            in_stock: payload.in_stock,
            prescription_required: payload.prescription_required,
            discount_percent: payload.discount_percent,
            category_slug: payload.category_slug,
            sub_slug: payload.sub_slug,
            popularity: 0.0,
            description: payload.description,
        };

        let mut next = self.products.clone();
        next.push(product.clone());
        self.commit(next)?;

        log_audit(
            Some(&admin.user.id),
            "product_create",
            Some(keys::PRODUCTS),
            Some(serde_json::json!({ "product_id": product.id })),
        );
        Ok(product)
    }

    pub fn update_product(
        &mut self,
        session: Option<&Session>,
        id: &Id,
        payload: UpdateProductRequest,
    ) -> AppResult<Product> {
        let admin = ensure_admin(session)?;
        let mut next = self.products.clone();
        let existing = next
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(AppError::NotFound)?;

        if let Some(title) = payload.title {
            validate_title(&title)?;
            existing.title = title;
        }
        if let Some(price) = payload.price {
            validate_price(price)?;
            existing.price = price;
        }
        if let Some(subtitle) = payload.subtitle {
            existing.subtitle = subtitle;
        }
        if payload.old_price.is_some() {
            existing.old_price = payload.old_price;
        }
        if let Some(image) = payload.image {
            existing.image = image;
        }
        if payload.in_stock.is_some() {
            existing.in_stock = payload.in_stock;
        }
        if let Some(rx) = payload.prescription_required {
            existing.prescription_required = rx;
        }
        if payload.discount_percent.is_some() {
            existing.discount_percent = payload.discount_percent;
        }
        if payload.category_slug.is_some() {
            existing.category_slug = payload.category_slug;
        }
        if payload.sub_slug.is_some() {
            existing.sub_slug = payload.sub_slug;
        }
        if let Some(popularity) = payload.popularity {
            existing.popularity = popularity;
        }
        if let Some(description) = payload.description {
            existing.description = description;
        }

        let updated = existing.clone();
        self.commit(next)?;

        log_audit(
            Some(&admin.user.id),
            "product_update",
            Some(keys::PRODUCTS),
            Some(serde_json::json!({ "product_id": updated.id })),
        );
        Ok(updated)
    }

    pub fn delete_product(&mut self, session: Option<&Session>, id: &Id) -> AppResult<()> {
        let admin = ensure_admin(session)?;
        if !self.products.iter().any(|p| &p.id == id) {
            return Err(AppError::NotFound);
        }
        let next = self.products.iter().filter(|p| &p.id != id).cloned().collect();
        self.commit(next)?;

        log_audit(
            Some(&admin.user.id),
            "product_delete",
            Some(keys::PRODUCTS),
            Some(serde_json::json!({ "product_id": id })),
        );
        Ok(())
    }

    pub fn reload(&mut self) {
        self.products = decode(&self.storage, keys::PRODUCTS, Vec::new());
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.storage.remove(keys::PRODUCTS)?;
        self.products.clear();
        Ok(())
    }

    fn commit(&mut self, next: Vec<Product>) -> AppResult<()> {
        encode(&self.storage, keys::PRODUCTS, &next)?;
        self.products = next;
        Ok(())
    }
}

impl ProductSource for AdminCatalog {
    fn fetch_products(&self) -> AppResult<Vec<Value>> {
        self.products
            .iter()
            .map(|p| serde_json::to_value(p).map_err(AppError::from))
            .collect()
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    Ok(())
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    Ok(())
}
