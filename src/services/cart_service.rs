use crate::{
    codec::{decode, encode},
    dto::cart::CartSummary,
    error::{AppError, AppResult},
    models::{CartItem, Id, Product},
    storage::{Storage, keys},
};

/// Owner of the `cart` key.
///
/// Quantity policy: a decrement never takes a line below 1. Lines leave the
/// cart only through [`CartStore::remove_item`] (or checkout).
#[derive(Debug)]
pub struct CartStore {
    storage: Storage,
    items: Vec<CartItem>,
}

impl CartStore {
    pub fn load(storage: Storage) -> Self {
        let items = read_items(&storage);
        Self { storage, items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &Id) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> AppResult<CartItem> {
        if quantity == 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }

        let mut next = self.items.clone();
        match next.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => next.push(CartItem {
                product: product.clone(),
                quantity,
            }),
        }
        self.commit(next)?;

        tracing::debug!(product_id = %product.id, quantity, "cart add");
        self.get(&product.id).cloned().ok_or(AppError::NotFound)
    }

    /// Applies `delta` to the line's quantity, clamped to at least 1.
    /// Unknown ids are a no-op and return `None`.
    pub fn change_quantity(&mut self, id: &Id, delta: i64) -> AppResult<Option<CartItem>> {
        let Some(current) = self.get(id) else {
            return Ok(None);
        };
        let quantity = i64::from(current.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX)) as u32;
        if quantity == current.quantity {
            return Ok(Some(current.clone()));
        }

        let mut next = self.items.clone();
        if let Some(item) = next.iter_mut().find(|item| &item.product.id == id) {
            item.quantity = quantity;
        }
        self.commit(next)?;

        tracing::debug!(product_id = %id, delta, quantity, "cart quantity changed");
        Ok(self.get(id).cloned())
    }

    /// Idempotent: removing an absent line does nothing.
    pub fn remove_item(&mut self, id: &Id) -> AppResult<()> {
        self.remove_items(std::slice::from_ref(id))
    }

    pub fn remove_items(&mut self, ids: &[Id]) -> AppResult<()> {
        if !self.items.iter().any(|item| ids.contains(&item.product.id)) {
            return Ok(());
        }
        let next = self
            .items
            .iter()
            .filter(|item| !ids.contains(&item.product.id))
            .cloned()
            .collect();
        self.commit(next)?;
        tracing::debug!(removed = ids.len(), "cart items removed");
        Ok(())
    }

    pub fn total_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn summary(&self) -> CartSummary {
        let (prescription, orderable): (Vec<CartItem>, Vec<CartItem>) = self
            .items
            .iter()
            .cloned()
            .partition(|item| item.product.prescription_required);
        CartSummary {
            total_count: self.total_count(),
            total_price: self.total_price(),
            orderable,
            prescription,
        }
    }

    pub fn reload(&mut self) {
        self.items = read_items(&self.storage);
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.storage.remove(keys::CART)?;
        self.items.clear();
        Ok(())
    }

    fn commit(&mut self, next: Vec<CartItem>) -> AppResult<()> {
        encode(&self.storage, keys::CART, &next)?;
        self.items = next;
        Ok(())
    }
}

/// Reads the stored cart, folding duplicate lines together and lifting
/// zero quantities to 1 so the in-memory invariants hold.
fn read_items(storage: &Storage) -> Vec<CartItem> {
    let stored: Vec<CartItem> = decode(storage, keys::CART, Vec::new());
    let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
    for mut item in stored {
        item.quantity = item.quantity.max(1);
        match items.iter_mut().find(|i| i.product.id == item.product.id) {
            Some(existing) => {
                tracing::warn!(product_id = %item.product.id, "duplicate cart line merged");
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
    }
    items
}
