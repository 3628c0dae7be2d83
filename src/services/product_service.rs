use std::cmp::Ordering;

use serde_json::Value;

use crate::{
    codec::normalize_product,
    error::{AppError, AppResult},
    models::{Id, Product},
    params::{Meta, Paged, ProductQuery, ProductSortBy, SortOrder},
};

/// Upstream catalog fetch. Records may be of any near-product shape.
pub trait ProductSource {
    fn fetch_products(&self) -> AppResult<Vec<Value>>;
}

impl ProductSource for Vec<Value> {
    fn fetch_products(&self) -> AppResult<Vec<Value>> {
        Ok(self.clone())
    }
}

/// Read-only, normalized view of the product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn from_source(source: &dyn ProductSource) -> AppResult<Self> {
        let raw = source.fetch_products()?;
        Ok(Self::from_raw(&raw))
    }

    /// Normalizes each record; records without an id and repeated ids are
    /// dropped.
    pub fn from_raw(raw: &[Value]) -> Self {
        let mut products: Vec<Product> = Vec::with_capacity(raw.len());
        for record in raw {
            let product = normalize_product(record);
            if product.id.is_empty() {
                tracing::warn!(title = %product.title, "catalog record without id skipped");
                continue;
            }
            if products.iter().any(|p| p.id == product.id) {
                tracing::warn!(product_id = %product.id, "duplicate catalog id skipped");
                continue;
            }
            products.push(product);
        }
        tracing::debug!(count = products.len(), "catalog loaded");
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &Id) -> AppResult<&Product> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .ok_or(AppError::NotFound)
    }

    /// Distinct category slugs in first-seen order.
    pub fn category_slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = Vec::new();
        for slug in self.products.iter().filter_map(|p| p.category_slug.as_ref()) {
            if !slugs.contains(slug) {
                slugs.push(slug.clone());
            }
        }
        slugs
    }

    pub fn list(&self, query: &ProductQuery) -> Paged<Product> {
        let (page, limit, offset) = query.pagination.normalize();
        let needle = query
            .q
            .as_ref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| match &needle {
                Some(needle) => [&p.title, &p.subtitle, &p.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .filter(|p| slug_matches(query.category_slug.as_deref(), p.category_slug.as_deref()))
            .filter(|p| slug_matches(query.sub_slug.as_deref(), p.sub_slug.as_deref()))
            .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| !query.in_stock_only || p.is_available())
            .filter(|p| {
                query
                    .prescription_required
                    .is_none_or(|rx| p.prescription_required == rx)
            })
            .collect();

        if let Some(sort_by) = query.sort_by {
            let sort_order = query.sort_order.unwrap_or(match sort_by {
                ProductSortBy::Title | ProductSortBy::Price => SortOrder::Asc,
                ProductSortBy::Popularity | ProductSortBy::Discount => SortOrder::Desc,
            });
            matched.sort_by(|a, b| {
                let ord = compare(a, b, sort_by);
                match sort_order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Paged {
            items,
            meta: Meta::new(page, limit, total),
        }
    }
}

fn slug_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.filter(|s| !s.is_empty()) {
        Some(wanted) => actual == Some(wanted),
        None => true,
    }
}

fn compare(a: &Product, b: &Product, sort_by: ProductSortBy) -> Ordering {
    match sort_by {
        ProductSortBy::Popularity => a.popularity.total_cmp(&b.popularity),
        ProductSortBy::Price => a.price.total_cmp(&b.price),
        ProductSortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        ProductSortBy::Discount => a
            .discount_percent
            .unwrap_or(0.0)
            .total_cmp(&b.discount_percent.unwrap_or(0.0)),
    }
}
