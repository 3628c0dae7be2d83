use crate::{
    codec::{decode, encode},
    error::AppResult,
    models::{Id, Product},
    storage::{Storage, keys},
};

/// Owner of the `favorites` key.
///
/// Each entry is a snapshot of the product at the moment it was favorited;
/// later catalog changes do not reach it.
#[derive(Debug)]
pub struct FavoritesStore {
    storage: Storage,
    items: Vec<Product>,
}

impl FavoritesStore {
    pub fn load(storage: Storage) -> Self {
        let items = read_items(&storage);
        Self { storage, items }
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_favorite(&self, id: &Id) -> bool {
        self.items.iter().any(|p| &p.id == id)
    }

    /// Returns whether the product is a favorite afterwards.
    pub fn toggle_favorite(&mut self, product: &Product) -> AppResult<bool> {
        let now_favorite = !self.is_favorite(&product.id);
        let next = if now_favorite {
            let mut next = self.items.clone();
            next.push(product.clone());
            next
        } else {
            self.without(&product.id)
        };
        self.commit(next)?;
        tracing::debug!(product_id = %product.id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    pub fn remove_favorite(&mut self, id: &Id) -> AppResult<()> {
        if !self.is_favorite(id) {
            return Ok(());
        }
        let next = self.without(id);
        self.commit(next)?;
        tracing::debug!(product_id = %id, "favorite removed");
        Ok(())
    }

    pub fn reload(&mut self) {
        self.items = read_items(&self.storage);
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.storage.remove(keys::FAVORITES)?;
        self.items.clear();
        Ok(())
    }

    fn without(&self, id: &Id) -> Vec<Product> {
        self.items.iter().filter(|p| &p.id != id).cloned().collect()
    }

    fn commit(&mut self, next: Vec<Product>) -> AppResult<()> {
        encode(&self.storage, keys::FAVORITES, &next)?;
        self.items = next;
        Ok(())
    }
}

fn read_items(storage: &Storage) -> Vec<Product> {
    let stored: Vec<Product> = decode(storage, keys::FAVORITES, Vec::new());
    let mut items: Vec<Product> = Vec::with_capacity(stored.len());
    for product in stored {
        if items.iter().any(|p| p.id == product.id) {
            tracing::warn!(product_id = %product.id, "duplicate favorite dropped");
            continue;
        }
        items.push(product);
    }
    items
}
