//! AI-assisted company enrichment.
//!
//! The pipeline: fetch the company website with a bounded wait → extract
//! visible text → detect heuristic signals → truncate → summarize via a
//! chat-completion API → merge model output with heuristics. Every failure
//! mode short of an unparsable input URL recovers locally into a
//! deterministic mock result, tagged with a [`FallbackReason`] so callers
//! can tell live output from substitutes. No stage is ever retried.
//!
//! # Fallback ladder
//!
//! | Stage | Failure | Outcome |
//! |-------|---------|---------|
//! | Fetch | network error, timeout, non-2xx | mock, no heuristic signals |
//! | Credential | `OPENAI_API_KEY` unset | mock + heuristic signals |
//! | Completion | non-2xx, malformed JSON | mock + heuristic signals |
//!
//! The fetch-failure mock carries no heuristic signals because nothing was
//! fetched to scan.

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Config, EnrichmentConfig};
use crate::directory;
use crate::extract::extract_visible_text;
use crate::models::{
    EnrichmentOutcome, EnrichmentResult, EnrichmentSource, FallbackReason,
};
use crate::signals::detect_signals;
use crate::store::{StateStore, NS_ENRICHMENT};

/// Fixed instruction describing the JSON shape the model must return.
const SYSTEM_PROMPT: &str = "You are a venture capital analyst extracting structured company information from website content. \
Return a JSON object with the following fields:\n\
- summary: A concise 1-2 sentence summary of what the company does\n\
- whatTheyDo: An array of 3-6 bullet points describing their products/services\n\
- keywords: An array of 5-10 relevant industry/technology keywords\n\
- signals: An array of 2-4 business signals or growth indicators\n\n\
Return ONLY valid JSON, no markdown formatting or additional text.";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Runs the enrichment pipeline for a single website.
pub struct Enricher {
    config: EnrichmentConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl Enricher {
    /// Build an enricher, reading the API credential from the environment.
    ///
    /// A missing credential is not an error — it selects the mock fallback.
    pub fn from_env(config: &EnrichmentConfig) -> Result<Self> {
        let api_key = config.api_key();
        Self::with_api_key(config, api_key)
    }

    /// Build an enricher with an explicit credential (or none).
    pub fn with_api_key(config: &EnrichmentConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            config: config.clone(),
            api_key,
            client,
        })
    }

    /// Enrich a company website.
    ///
    /// Returns `Ok` for every recoverable failure (the outcome says which
    /// stage fell back). The only `Err` paths are unanticipated ones, such
    /// as a website string that is not a parsable URL.
    pub async fn enrich(&self, website: &str) -> Result<EnrichmentOutcome> {
        let html = match self.fetch_website(website).await {
            Ok(html) => html,
            Err(e) => {
                warn!(website, error = %e, "website fetch failed, returning mock data");
                // Nothing was fetched, so no heuristic signals on this path.
                return Ok(EnrichmentOutcome::Fallback {
                    result: mock_enrichment(website, &[])?,
                    reason: FallbackReason::FetchFailed,
                });
            }
        };

        // Signals come from the raw markup; link targets and attributes count.
        let heuristics = detect_signals(&html);
        debug!(website, signals = heuristics.len(), "heuristic signals detected");

        let clean_text = extract_visible_text(&html);
        let truncated: String = clean_text
            .chars()
            .take(self.config.max_content_chars)
            .collect();

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("API key not configured, returning mock data");
            return Ok(EnrichmentOutcome::Fallback {
                result: mock_enrichment(website, &heuristics)?,
                reason: FallbackReason::MissingApiKey,
            });
        };

        match self.request_completion(api_key, &truncated).await {
            Ok(model) => {
                let mut signals = model.signals;
                signals.extend(heuristics);
                Ok(EnrichmentOutcome::Live(EnrichmentResult {
                    summary: model.summary,
                    what_they_do: model.what_they_do,
                    keywords: model.keywords,
                    signals,
                    sources: vec![provenance(website)],
                    enriched_at: now_iso(),
                }))
            }
            Err(e) => {
                warn!(website, error = %e, "completion API failed, returning mock data");
                Ok(EnrichmentOutcome::Fallback {
                    result: mock_enrichment(website, &heuristics)?,
                    reason: FallbackReason::UpstreamFailed,
                })
            }
        }
    }

    /// Fetch the website HTML with browser-like headers.
    ///
    /// Network errors, the fetch timeout, and non-2xx statuses all surface
    /// as `Err` here and are recovered by the caller. The timeout bounds
    /// only this request; the completion call runs unbounded.
    async fn fetch_website(&self, website: &str) -> Result<String> {
        let response = self
            .client
            .get(website)
            .timeout(Duration::from_secs(self.config.fetch_timeout_secs))
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", website))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP error! status: {}", status);
        }

        Ok(response.text().await?)
    }

    /// Issue one chat-completion request and parse the structured content.
    ///
    /// No retries, and no time bound: once issued the request runs to
    /// completion. Any failure falls back to mock data at the call site.
    async fn request_completion(&self, api_key: &str, text: &str) -> Result<ModelContent> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Extract structured information from this website content:\n\n{}",
                        text
                    ),
                },
            ],
            "response_format": { "type": "json_object" },
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("Completion API error: {}", status);
        }

        let json: serde_json::Value = response.json().await?;
        let content = json
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow::anyhow!("Completion response missing message content"))?;

        parse_model_content(content)
    }
}

/// Structured fields extracted from the model's JSON content.
#[derive(Debug, Clone, Default)]
struct ModelContent {
    summary: String,
    what_they_do: Vec<String>,
    keywords: Vec<String>,
    signals: Vec<String>,
}

/// Parse the model's JSON content string, defaulting every missing field.
fn parse_model_content(content: &str) -> Result<ModelContent> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("Model content is not valid JSON")?;

    let strings = |key: &str| -> Vec<String> {
        value
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|s| s.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    };

    Ok(ModelContent {
        summary: value
            .get("summary")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string(),
        what_they_do: strings("whatTheyDo"),
        keywords: strings("keywords"),
        signals: strings("signals"),
    })
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn provenance(website: &str) -> EnrichmentSource {
    EnrichmentSource {
        url: website.to_string(),
        timestamp: now_iso(),
    }
}

/// Deterministic mock enrichment derived from the URL's hostname.
///
/// Fails only when the website is not a parsable absolute URL — that error
/// propagates to the generic server-error path rather than being recovered.
pub fn mock_enrichment(website: &str, heuristics: &[String]) -> Result<EnrichmentResult> {
    let url = url::Url::parse(website)
        .with_context(|| format!("Invalid website URL: {}", website))?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("Website URL has no host: {}", website))?;
    let domain = host.strip_prefix("www.").unwrap_or(host);

    let mut signals = vec![
        "strong online presence".to_string(),
        "modern tech stack".to_string(),
    ];
    signals.extend(heuristics.iter().cloned());

    Ok(EnrichmentResult {
        summary: format!(
            "{} is a technology company building innovative solutions for modern businesses. \
             They focus on delivering exceptional value through their platform.",
            domain
        ),
        what_they_do: vec![
            "Cloud-based platform for business operations".to_string(),
            "AI-powered analytics and insights".to_string(),
            "Enterprise-grade security and compliance".to_string(),
            "Seamless integrations with popular tools".to_string(),
            "24/7 customer support and success team".to_string(),
        ],
        keywords: vec![
            "SaaS".to_string(),
            "Cloud Computing".to_string(),
            "Artificial Intelligence".to_string(),
            "Enterprise Software".to_string(),
            "Automation".to_string(),
            "Analytics".to_string(),
            "B2B".to_string(),
            "Digital Transformation".to_string(),
        ],
        signals,
        sources: vec![provenance(website)],
        enriched_at: now_iso(),
    })
}

// ============ Company-level orchestration ============

/// Enrich a company from the dataset and cache the result.
///
/// The action is blocked once a cached result exists; the cache has no
/// expiry or invalidation.
pub async fn run_enrich(config: &Config, store: Arc<dyn StateStore>, company_id: &str) -> Result<()> {
    let Some(company) = directory::find_company(company_id) else {
        bail!("Company not found: {}", company_id);
    };

    if let Some(cached) = store.get(NS_ENRICHMENT, company_id)? {
        let enriched_at = cached
            .get("enrichedAt")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown time");
        println!(
            "{} is already enriched ({}). Cached results are kept indefinitely.",
            company.name, enriched_at
        );
        return Ok(());
    }

    let enricher = Enricher::from_env(&config.enrichment)?;
    let outcome = enricher.enrich(&company.website).await?;

    store.put(
        NS_ENRICHMENT,
        company_id,
        serde_json::to_value(outcome.result())?,
    )?;

    print_outcome(&company.name, &outcome);
    Ok(())
}

fn print_outcome(company_name: &str, outcome: &EnrichmentOutcome) {
    match outcome {
        EnrichmentOutcome::Live(_) => println!("Enriched {} (live)", company_name),
        EnrichmentOutcome::Fallback { reason, .. } => {
            println!("Enriched {} (fallback: {})", company_name, reason.as_str())
        }
    }

    let result = outcome.result();
    println!();
    println!("Summary: {}", result.summary);
    if !result.what_they_do.is_empty() {
        println!("\nWhat they do:");
        for item in &result.what_they_do {
            println!("  - {}", item);
        }
    }
    if !result.keywords.is_empty() {
        println!("\nKeywords: {}", result.keywords.join(", "));
    }
    if !result.signals.is_empty() {
        println!("Signals: {}", result.signals.join(", "));
    }
    for source in &result.sources {
        println!("\nSource: {} ({})", source.url, source.timestamp);
    }
}
