//! Export directory slices and curated lists as JSON or CSV.
//!
//! JSON output is the full company records, pretty-printed. CSV carries the
//! same columns in dataset order. Output goes to a file when a path is
//! given, otherwise to stdout for piping.

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

use crate::directory::{self, DirectoryQuery};
use crate::lists::ListManager;
use crate::models::Company;
use crate::store::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => bail!("Unknown export format: {}. Use json or csv.", other),
        }
    }
}

/// Companies matching a directory query (all pages, not just one).
pub fn select_by_query(query: &DirectoryQuery) -> Vec<Company> {
    let mut matched = directory::filter_companies(directory::companies(), &query.filters);
    directory::sort_companies(&mut matched, query.sort, query.dir);
    matched.into_iter().cloned().collect()
}

/// Members of a curated list, resolved against the dataset.
///
/// Ids with no matching company are skipped silently — nothing enforces
/// referential integrity between lists and the dataset.
pub fn select_by_list(store: Arc<dyn StateStore>, list_id: &str) -> Result<Vec<Company>> {
    let lists = ListManager::new(store);
    let Some(list) = lists.get(list_id)? else {
        bail!("List not found: {}", list_id);
    };
    Ok(list
        .company_ids
        .iter()
        .filter_map(|id| directory::find_company(id))
        .cloned()
        .collect())
}

/// Render companies in the requested format.
pub fn render(companies: &[Company], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(companies)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["id", "name", "industry", "stage", "location", "website"])?;
            for c in companies {
                writer.write_record([
                    &c.id,
                    &c.name,
                    &c.industry,
                    &c.stage,
                    &c.location,
                    &c.website,
                ])?;
            }
            let bytes = writer.into_inner()?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

/// Render and write to a file or stdout.
pub fn run_export(
    companies: &[Company],
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = render(companies, format)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &rendered)?;
            eprintln!("Exported {} companies to {}", companies.len(), path.display());
        }
        None => {
            println!("{}", rendered);
        }
    }
    Ok(())
}
