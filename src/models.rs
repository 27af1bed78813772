//! Core data models used throughout Precision.
//!
//! These types represent the companies, curated lists, saved searches, and
//! enrichment results that flow through the directory and enrichment pipeline.
//! Everything that crosses the HTTP or storage boundary serializes as
//! camelCase JSON to stay compatible with the dashboard wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable reference record for a company in the shipped dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub stage: String,
    pub location: String,
    pub website: String,
}

/// A user-curated list of companies.
///
/// `company_ids` has set semantics: an id appears at most once and order
/// carries no meaning. Nothing enforces that the ids exist in the company
/// dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Filter snapshot captured when a search is saved.
///
/// `industry`/`stage` use the literal `"All"` sentinel to mean "no filter",
/// matching the directory's fixed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub query: String,
    #[serde(default = "all_sentinel")]
    pub industry: String,
    #[serde(default = "all_sentinel")]
    pub stage: String,
}

fn all_sentinel() -> String {
    "All".to_string()
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            industry: all_sentinel(),
            stage: all_sentinel(),
        }
    }
}

/// A saved search: a named filter snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub filters: SearchFilters,
    pub created_at: DateTime<Utc>,
}

/// Provenance entry attached to an enrichment result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSource {
    pub url: String,
    pub timestamp: String,
}

/// The enrichment payload returned by `POST /api/enrich` and cached per
/// company in the `enrichment` storage namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub summary: String,
    pub what_they_do: Vec<String>,
    pub keywords: Vec<String>,
    pub signals: Vec<String>,
    pub sources: Vec<EnrichmentSource>,
    pub enriched_at: String,
}

/// Why the pipeline substituted mock data for a live model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The website fetch failed, timed out, or returned a non-2xx status.
    /// Heuristic signals are unavailable on this path — nothing was fetched.
    FetchFailed,
    /// No API key configured; heuristic signals from the fetched HTML are
    /// still included.
    MissingApiKey,
    /// The completion API returned a non-2xx status or unparsable content;
    /// heuristic signals from the fetched HTML are still included.
    UpstreamFailed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::FetchFailed => "fetch_failed",
            FallbackReason::MissingApiKey => "missing_api_key",
            FallbackReason::UpstreamFailed => "upstream_failed",
        }
    }
}

/// Outcome of an enrichment run.
///
/// Callers and tests can distinguish a real model-derived result from the
/// deterministic mock substitute without string-matching log output. Both
/// variants carry a complete, well-formed [`EnrichmentResult`].
#[derive(Debug, Clone)]
pub enum EnrichmentOutcome {
    /// Summary produced by the completion API from fetched website text.
    Live(EnrichmentResult),
    /// Deterministic mock substitute, with the stage that forced it.
    Fallback {
        result: EnrichmentResult,
        reason: FallbackReason,
    },
}

impl EnrichmentOutcome {
    /// The enrichment payload, regardless of provenance.
    pub fn result(&self) -> &EnrichmentResult {
        match self {
            EnrichmentOutcome::Live(r) => r,
            EnrichmentOutcome::Fallback { result, .. } => result,
        }
    }

    /// Consumes the outcome, returning the payload.
    pub fn into_result(self) -> EnrichmentResult {
        match self {
            EnrichmentOutcome::Live(r) => r,
            EnrichmentOutcome::Fallback { result, .. } => result,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, EnrichmentOutcome::Live(_))
    }
}
