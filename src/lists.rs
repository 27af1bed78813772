//! Curated list management over the persistence port.
//!
//! Lists are flat records in the `lists` namespace, keyed by a
//! timestamp-derived id. Membership mutation is containment check plus
//! push/retain; deletion is a map-key removal. Last write wins.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::models::CompanyList;
use crate::store::{StateStore, NS_LISTS};

pub struct ListManager {
    store: Arc<dyn StateStore>,
}

impl ListManager {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Create a list and return its id (`list_<epoch-millis>`).
    ///
    /// Ids must be unique within the namespace; two creations inside the
    /// same millisecond bump the timestamp until the key is free.
    pub fn create(&self, name: &str, description: &str) -> Result<String> {
        let mut millis = Utc::now().timestamp_millis();
        let id = loop {
            let candidate = format!("list_{}", millis);
            if self.store.get(NS_LISTS, &candidate)?.is_none() {
                break candidate;
            }
            millis += 1;
        };

        let list = CompanyList {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            company_ids: Vec::new(),
            created_at: Utc::now(),
        };

        self.store
            .put(NS_LISTS, &id, serde_json::to_value(&list)?)?;
        Ok(id)
    }

    pub fn delete(&self, list_id: &str) -> Result<()> {
        self.store.remove(NS_LISTS, list_id)
    }

    pub fn get(&self, list_id: &str) -> Result<Option<CompanyList>> {
        match self.store.get(NS_LISTS, list_id)? {
            Some(value) => Ok(Some(
                serde_json::from_value(value)
                    .with_context(|| format!("Corrupt list record: {}", list_id))?,
            )),
            None => Ok(None),
        }
    }

    /// All lists, sorted by creation time descending.
    pub fn all(&self) -> Result<Vec<CompanyList>> {
        let mut lists: Vec<CompanyList> = self
            .store
            .entries(NS_LISTS)?
            .into_iter()
            .filter_map(|(_, v)| serde_json::from_value(v).ok())
            .collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(lists)
    }

    /// Add a company to a list. Adding an existing member is a no-op.
    pub fn add_company(&self, list_id: &str, company_id: &str) -> Result<()> {
        let Some(mut list) = self.get(list_id)? else {
            anyhow::bail!("List not found: {}", list_id);
        };
        if list.company_ids.iter().any(|id| id == company_id) {
            return Ok(());
        }
        list.company_ids.push(company_id.to_string());
        self.store
            .put(NS_LISTS, list_id, serde_json::to_value(&list)?)
    }

    /// Remove a company from a list. Removing a non-member is a no-op.
    pub fn remove_company(&self, list_id: &str, company_id: &str) -> Result<()> {
        let Some(mut list) = self.get(list_id)? else {
            anyhow::bail!("List not found: {}", list_id);
        };
        list.company_ids.retain(|id| id != company_id);
        self.store
            .put(NS_LISTS, list_id, serde_json::to_value(&list)?)
    }

    pub fn contains(&self, list_id: &str, company_id: &str) -> Result<bool> {
        Ok(self
            .get(list_id)?
            .map(|l| l.company_ids.iter().any(|id| id == company_id))
            .unwrap_or(false))
    }
}
