use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    error::AppResult,
    notifier::StorageEvent,
    services::{
        admin_service::AdminCatalog,
        auth_service::AuthSessionManager,
        cart_service::CartStore,
        favorite_service::FavoritesStore,
        product_service::{Catalog, ProductSource},
        profile_service::ProfileStore,
        search_service::SearchHistory,
    },
    storage::{FileStorage, Storage, keys},
};

/// Every store for one browsing context. Stores never call each other.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Storage,
    pub clock: Arc<dyn Clock>,
    pub cart: CartStore,
    pub favorites: FavoritesStore,
    pub profile: ProfileStore,
    pub auth: AuthSessionManager,
    pub search: SearchHistory,
    pub admin: AdminCatalog,
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self {
            cart: CartStore::load(storage.clone()),
            favorites: FavoritesStore::load(storage.clone()),
            profile: ProfileStore::load(storage.clone()),
            auth: AuthSessionManager::new(storage.clone(), config.auth.clone(), Arc::clone(&clock)),
            search: SearchHistory::load(storage.clone(), config.search_history_limit),
            admin: AdminCatalog::load(storage.clone()),
            catalog: Catalog::default(),
            config,
            storage,
            clock,
        }
    }

    /// File-backed when `storage_path` is set, in-memory otherwise.
    pub fn open(config: AppConfig) -> AppResult<Self> {
        let storage = match &config.storage_path {
            Some(path) => Storage::new(Arc::new(FileStorage::open(path)?)),
            None => Storage::in_memory(),
        };
        Ok(Self::new(config, storage, Arc::new(SystemClock)))
    }

    /// A second context over the same backend, like another tab.
    pub fn fork_context(&self) -> Self {
        Self::new(
            self.config.clone(),
            self.storage.fork_context(),
            Arc::clone(&self.clock),
        )
    }

    pub fn load_catalog(&mut self, source: &dyn ProductSource) -> AppResult<()> {
        self.catalog = Catalog::from_source(source)?;
        Ok(())
    }

    pub fn sign_out(&mut self) -> AppResult<()> {
        self.auth.logout()?;
        self.profile.logout()
    }

    /// Reloads whichever store owns the changed key.
    pub fn apply_event(&mut self, event: &StorageEvent) {
        match event.key.as_str() {
            keys::CART => self.cart.reload(),
            keys::FAVORITES => self.favorites.reload(),
            keys::PROFILE => self.profile.reload(),
            keys::SEARCH_HISTORY => self.search.reload(),
            keys::PRODUCTS => self.admin.reload(),
            keys::USER | keys::TOKEN | keys::AUTH_TOKEN | keys::USER_ID => self.auth.reload(),
            other => tracing::debug!(key = other, "storage event ignored"),
        }
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.cart.reset()?;
        self.favorites.reset()?;
        self.profile.reset()?;
        self.auth.reset()?;
        self.search.clear()?;
        self.admin.reset()?;
        self.storage.remove(keys::LAST_ORDER)?;
        self.catalog = Catalog::default();
        Ok(())
    }
}
