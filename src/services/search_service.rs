use crate::{
    codec::{decode, encode},
    error::AppResult,
    storage::{Storage, keys},
};

/// Recent catalog searches under `searchHistory`, newest first.
#[derive(Debug)]
pub struct SearchHistory {
    storage: Storage,
    limit: usize,
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn load(storage: Storage, limit: usize) -> Self {
        let mut entries: Vec<String> = decode(&storage, keys::SEARCH_HISTORY, Vec::new());
        entries.truncate(limit);
        Self {
            storage,
            limit,
            entries,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Blank queries are ignored; a repeated query moves to the front.
    pub fn record(&mut self, query: &str) -> AppResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let mut next: Vec<String> = Vec::with_capacity(self.limit);
        next.push(query.to_string());
        next.extend(self.entries.iter().filter(|e| e.as_str() != query).cloned());
        next.truncate(self.limit);
        encode(&self.storage, keys::SEARCH_HISTORY, &next)?;
        self.entries = next;
        Ok(())
    }

    pub fn clear(&mut self) -> AppResult<()> {
        self.storage.remove(keys::SEARCH_HISTORY)?;
        self.entries.clear();
        Ok(())
    }

    pub fn reload(&mut self) {
        let mut entries: Vec<String> = decode(&self.storage, keys::SEARCH_HISTORY, Vec::new());
        entries.truncate(self.limit);
        self.entries = entries;
    }
}
