//! Per-company free-text notes.
//!
//! Notes live in the `notes` namespace keyed by company id and persist on
//! every write. There is no debounce and no conflict resolution: last
//! write wins.

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::store::{StateStore, NS_NOTES};

pub struct NotesManager {
    store: Arc<dyn StateStore>,
}

impl NotesManager {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, company_id: &str) -> Result<String> {
        Ok(self
            .store
            .get(NS_NOTES, company_id)?
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    pub fn set(&self, company_id: &str, text: &str) -> Result<()> {
        self.store
            .put(NS_NOTES, company_id, Value::String(text.to_string()))
    }
}
