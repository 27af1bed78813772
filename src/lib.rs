//! # Precision
//!
//! A deal-sourcing toolkit for venture analysts: a company directory with
//! search/filter/sort/pagination, user-curated lists, saved searches,
//! free-text notes, and AI-assisted company enrichment that fetches a
//! website, extracts text and rule-based signals, and summarizes via a
//! chat-completion API — falling back to deterministic mock data when the
//! network or the API key is unavailable.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────────────────────┐   ┌──────────┐
//! │  Dataset  │   │  Enrichment pipeline         │   │  State   │
//! │ (shipped) │   │ fetch→extract→signals→LLM   │   │ (JSON KV)│
//! └─────┬─────┘   └──────────────┬──────────────┘   └────┬─────┘
//!       │                        │                       │
//!       ▼                        ▼                       ▼
//!  ┌──────────┐           ┌──────────┐            ┌──────────┐
//!  │   CLI    │           │   HTTP   │            │  Lists / │
//!  │(precision)│          │ /api/... │            │ Searches │
//!  └──────────┘           └──────────┘            └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | Key-value persistence port and backends |
//! | [`directory`] | Company dataset, filter/sort/paginate |
//! | [`lists`] | Curated list management |
//! | [`searches`] | Saved searches and navigable URLs |
//! | [`notes`] | Per-company free-text notes |
//! | [`extract`] | HTML visible-text extraction |
//! | [`signals`] | Heuristic signal detection |
//! | [`enrich`] | Enrichment pipeline with fallback ladder |
//! | [`server`] | HTTP enrichment endpoint |
//! | [`export`] | CSV/JSON export |

pub mod config;
pub mod directory;
pub mod enrich;
pub mod export;
pub mod extract;
pub mod lists;
pub mod models;
pub mod notes;
pub mod searches;
pub mod server;
pub mod signals;
pub mod store;
