//! Saved searches: named filter snapshots with navigable URLs.
//!
//! A saved search captures the directory filters at save time. Running one
//! later reconstructs the exact view; `search_url` renders the shareable
//! `/companies?...` link with `"All"` and empty values omitted.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::models::{SavedSearch, SearchFilters};
use crate::store::{StateStore, NS_SAVED_SEARCHES};

pub struct SavedSearchManager {
    store: Arc<dyn StateStore>,
}

impl SavedSearchManager {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Save a filter snapshot and return its id (`search_<epoch-millis>`).
    pub fn save(&self, name: &str, filters: SearchFilters) -> Result<String> {
        let mut millis = Utc::now().timestamp_millis();
        let id = loop {
            let candidate = format!("search_{}", millis);
            if self.store.get(NS_SAVED_SEARCHES, &candidate)?.is_none() {
                break candidate;
            }
            millis += 1;
        };

        let search = SavedSearch {
            id: id.clone(),
            name: name.to_string(),
            filters,
            created_at: Utc::now(),
        };

        self.store
            .put(NS_SAVED_SEARCHES, &id, serde_json::to_value(&search)?)?;
        Ok(id)
    }

    pub fn delete(&self, search_id: &str) -> Result<()> {
        self.store.remove(NS_SAVED_SEARCHES, search_id)
    }

    pub fn get(&self, search_id: &str) -> Result<Option<SavedSearch>> {
        match self.store.get(NS_SAVED_SEARCHES, search_id)? {
            Some(value) => Ok(Some(
                serde_json::from_value(value)
                    .with_context(|| format!("Corrupt saved search: {}", search_id))?,
            )),
            None => Ok(None),
        }
    }

    /// All saved searches, newest first.
    pub fn all(&self) -> Result<Vec<SavedSearch>> {
        let mut searches: Vec<SavedSearch> = self
            .store
            .entries(NS_SAVED_SEARCHES)?
            .into_iter()
            .filter_map(|(_, v)| serde_json::from_value(v).ok())
            .collect();
        searches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(searches)
    }
}

/// Build the navigable directory URL for a filter snapshot.
///
/// Empty query and `"All"` industry/stage are omitted, so an unfiltered
/// search renders as a bare `/companies`.
pub fn search_url(filters: &SearchFilters) -> String {
    let mut ser = url::form_urlencoded::Serializer::new(String::new());
    if !filters.query.is_empty() {
        ser.append_pair("q", &filters.query);
    }
    if !filters.industry.is_empty() && filters.industry != "All" {
        ser.append_pair("industry", &filters.industry);
    }
    if !filters.stage.is_empty() && filters.stage != "All" {
        ser.append_pair("stage", &filters.stage);
    }
    let qs = ser.finish();
    if qs.is_empty() {
        "/companies".to_string()
    } else {
        format!("/companies?{}", qs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn manager() -> SavedSearchManager {
        SavedSearchManager::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_save_and_roundtrip_filters() {
        let searches = manager();
        let filters = SearchFilters {
            query: "ai".to_string(),
            industry: "AI/ML".to_string(),
            stage: "All".to_string(),
        };
        let id = searches.save("AI companies", filters.clone()).unwrap();
        assert!(id.starts_with("search_"));

        let restored = searches.get(&id).unwrap().unwrap();
        assert_eq!(restored.filters, filters);
        assert_eq!(restored.name, "AI companies");
    }

    #[test]
    fn test_search_url_encodes_and_omits_stage() {
        let filters = SearchFilters {
            query: "ai".to_string(),
            industry: "AI/ML".to_string(),
            stage: "All".to_string(),
        };
        let url = search_url(&filters);
        assert_eq!(url, "/companies?q=ai&industry=AI%2FML");
        assert!(!url.contains("stage"));
    }

    #[test]
    fn test_search_url_without_filters() {
        assert_eq!(search_url(&SearchFilters::default()), "/companies");
    }

    #[test]
    fn test_all_sorted_newest_first() {
        let searches = manager();
        let first = searches.save("first", SearchFilters::default()).unwrap();
        let second = searches.save("second", SearchFilters::default()).unwrap();

        let all = searches.all().unwrap();
        assert_eq!(all.len(), 2);
        let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&first.as_str()));
        assert!(ids.contains(&second.as_str()));
        assert!(all[0].created_at >= all[1].created_at);
    }

    #[test]
    fn test_delete_removes_search() {
        let searches = manager();
        let id = searches.save("gone", SearchFilters::default()).unwrap();
        searches.delete(&id).unwrap();
        assert!(searches.get(&id).unwrap().is_none());
        assert!(searches.all().unwrap().is_empty());
    }
}
