//! # Precision CLI (`precision`)
//!
//! The `precision` binary is the primary interface for the deal-sourcing
//! toolkit. It provides commands for browsing the company directory,
//! managing curated lists and saved searches, taking notes, running the
//! enrichment pipeline, exporting data, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! precision --config ./precision.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `precision init` | Write a starter configuration file |
//! | `precision companies` | Browse the directory (filter/sort/paginate) |
//! | `precision show <id>` | Company profile with notes and cached enrichment |
//! | `precision enrich <id>` | Enrich a company website (cached indefinitely) |
//! | `precision lists ...` | Manage curated lists |
//! | `precision searches ...` | Manage saved searches |
//! | `precision notes ...` | Per-company notes |
//! | `precision export` | Export companies as JSON or CSV |
//! | `precision serve` | Start the enrichment HTTP server |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use precision::config;
use precision::directory::{self, DirectoryQuery, SortDirection, SortField};
use precision::enrich;
use precision::export::{self, ExportFormat};
use precision::lists::ListManager;
use precision::models::SearchFilters;
use precision::notes::NotesManager;
use precision::searches::{self, SavedSearchManager};
use precision::server;
use precision::store::{self, StateStore, NS_ENRICHMENT};

/// Precision — a deal-sourcing toolkit for venture analysts.
#[derive(Parser)]
#[command(
    name = "precision",
    about = "Precision — company directory, curated lists, saved searches, and AI-assisted enrichment",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file falls back to
    /// built-in defaults.
    #[arg(long, global = true, default_value = "./precision.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Shared directory filter flags.
#[derive(clap::Args, Debug, Clone)]
struct FilterArgs {
    /// Free-text query matched against name, industry, and location.
    #[arg(long, default_value = "")]
    query: String,

    /// Industry filter (e.g. "AI/ML"); "All" disables it.
    #[arg(long, default_value = "All")]
    industry: String,

    /// Stage filter (e.g. "Series A"); "All" disables it.
    #[arg(long, default_value = "All")]
    stage: String,
}

impl FilterArgs {
    fn into_filters(self) -> SearchFilters {
        SearchFilters {
            query: self.query,
            industry: self.industry,
            stage: self.stage,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file.
    Init,

    /// Browse the company directory.
    ///
    /// Prints one page of filtered, sorted results plus the shareable
    /// query string reflecting the view.
    Companies {
        #[command(flatten)]
        filters: FilterArgs,

        /// Sort column: name, industry, stage, or location.
        #[arg(long, default_value = "name")]
        sort: String,

        /// Sort direction: asc or desc.
        #[arg(long, default_value = "asc")]
        dir: String,

        /// 1-based page number (20 companies per page).
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show a company profile with notes and cached enrichment.
    Show {
        /// Company id (e.g. c001).
        id: String,
    },

    /// Enrich a company website via the AI pipeline.
    ///
    /// Results are cached indefinitely; enriching an already-enriched
    /// company is refused.
    Enrich {
        /// Company id (e.g. c001).
        id: String,
    },

    /// Manage curated lists.
    Lists {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage saved searches.
    Searches {
        #[command(subcommand)]
        action: SearchAction,
    },

    /// Per-company free-text notes.
    Notes {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Export companies as JSON or CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Export the members of a curated list instead of a directory query.
        #[arg(long)]
        list: Option<String>,

        /// Output format: json or csv.
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start the enrichment HTTP server.
    Serve,
}

#[derive(Subcommand)]
enum ListAction {
    /// Create a list.
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a list.
    Delete { id: String },
    /// Add a company to a list.
    Add { id: String, company_id: String },
    /// Remove a company from a list.
    Remove { id: String, company_id: String },
    /// Show a list and its member companies.
    Show { id: String },
    /// Enumerate all lists.
    List,
}

#[derive(Subcommand)]
enum SearchAction {
    /// Save the given filters under a name.
    Save {
        name: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Delete a saved search.
    Delete { id: String },
    /// Enumerate saved searches, newest first.
    List,
    /// Run a saved search against the directory.
    Run { id: String },
}

#[derive(Subcommand)]
enum NoteAction {
    /// Set (overwrite) the note for a company.
    Set { company_id: String, text: String },
    /// Show the note for a company.
    Show { company_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("precision=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        if cli.config.exists() {
            anyhow::bail!("Config file already exists: {}", cli.config.display());
        }
        std::fs::write(&cli.config, config::EXAMPLE_CONFIG)?;
        println!("Wrote starter config to {}", cli.config.display());
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;
    let store: Arc<dyn StateStore> = Arc::from(store::open_store(&cfg.storage.path)?);

    match cli.command {
        Commands::Init => unreachable!(),
        Commands::Companies {
            filters,
            sort,
            dir,
            page,
        } => {
            let mut query = DirectoryQuery::new(filters.into_filters());
            query.sort = sort.parse::<SortField>()?;
            query.dir = dir.parse::<SortDirection>()?;
            query.page = page;
            run_companies(&query);
        }
        Commands::Show { id } => {
            run_show(store, &id)?;
        }
        Commands::Enrich { id } => {
            enrich::run_enrich(&cfg, store, &id).await?;
        }
        Commands::Lists { action } => {
            run_lists(store, action)?;
        }
        Commands::Searches { action } => {
            run_searches(store, action)?;
        }
        Commands::Notes { action } => {
            let notes = NotesManager::new(store);
            match action {
                NoteAction::Set { company_id, text } => {
                    notes.set(&company_id, &text)?;
                    println!("Saved note for {}", company_id);
                }
                NoteAction::Show { company_id } => {
                    let text = notes.get(&company_id)?;
                    if text.is_empty() {
                        println!("(no note)");
                    } else {
                        println!("{}", text);
                    }
                }
            }
        }
        Commands::Export {
            filters,
            list,
            format,
            output,
        } => {
            let format: ExportFormat = format.parse()?;
            let companies = match list {
                Some(list_id) => export::select_by_list(store, &list_id)?,
                None => export::select_by_query(&DirectoryQuery::new(filters.into_filters())),
            };
            export::run_export(&companies, format, output.as_deref())?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

fn run_companies(query: &DirectoryQuery) {
    let page = directory::run_query(query);

    println!(
        "{} companies found (page {} of {})",
        page.total, page.page, page.total_pages
    );
    println!();
    for c in &page.items {
        println!(
            "{}  {:<22} {:<12} {:<10} {:<20} {}",
            c.id, c.name, c.industry, c.stage, c.location, c.website
        );
    }

    let qs = query.to_query_string();
    if !qs.is_empty() {
        println!("\nShareable view: /companies?{}", qs);
    }
}

fn run_show(store: Arc<dyn StateStore>, id: &str) -> Result<()> {
    let Some(company) = directory::find_company(id) else {
        anyhow::bail!("Company not found: {}", id);
    };

    println!("{} ({})", company.name, company.id);
    println!("  Industry: {}", company.industry);
    println!("  Stage:    {}", company.stage);
    println!("  Location: {}", company.location);
    println!("  Website:  {}", company.website);

    let notes = NotesManager::new(store.clone());
    let note = notes.get(id)?;
    if !note.is_empty() {
        println!("\nNotes:\n{}", note);
    }

    if let Some(cached) = store.get(NS_ENRICHMENT, id)? {
        let summary = cached.get("summary").and_then(|v| v.as_str()).unwrap_or("");
        let at = cached
            .get("enrichedAt")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown time");
        println!("\nEnrichment (cached {}):\n  {}", at, summary);
    } else {
        println!("\nNot yet enriched. Run: precision enrich {}", id);
    }

    Ok(())
}

fn run_lists(store: Arc<dyn StateStore>, action: ListAction) -> Result<()> {
    let lists = ListManager::new(store);

    match action {
        ListAction::Create { name, description } => {
            let id = lists.create(&name, &description)?;
            println!("Created list {} ({})", name, id);
        }
        ListAction::Delete { id } => {
            lists.delete(&id)?;
            println!("Deleted list {}", id);
        }
        ListAction::Add { id, company_id } => {
            lists.add_company(&id, &company_id)?;
            println!("Added {} to {}", company_id, id);
        }
        ListAction::Remove { id, company_id } => {
            lists.remove_company(&id, &company_id)?;
            println!("Removed {} from {}", company_id, id);
        }
        ListAction::Show { id } => {
            let Some(list) = lists.get(&id)? else {
                anyhow::bail!("List not found: {}", id);
            };
            println!("{} ({})", list.name, list.id);
            if !list.description.is_empty() {
                println!("  {}", list.description);
            }
            println!("  {} companies, created {}", list.company_ids.len(), list.created_at);
            for company_id in &list.company_ids {
                match directory::find_company(company_id) {
                    Some(c) => println!("  {}  {} — {} / {}", c.id, c.name, c.industry, c.stage),
                    None => println!("  {}  (not in dataset)", company_id),
                }
            }
        }
        ListAction::List => {
            let all = lists.all()?;
            if all.is_empty() {
                println!("No lists.");
            }
            for list in all {
                println!(
                    "{}  {:<20} {} companies",
                    list.id,
                    list.name,
                    list.company_ids.len()
                );
            }
        }
    }

    Ok(())
}

fn run_searches(store: Arc<dyn StateStore>, action: SearchAction) -> Result<()> {
    let manager = SavedSearchManager::new(store);

    match action {
        SearchAction::Save { name, filters } => {
            let id = manager.save(&name, filters.into_filters())?;
            println!("Saved search {} ({})", name, id);
        }
        SearchAction::Delete { id } => {
            manager.delete(&id)?;
            println!("Deleted search {}", id);
        }
        SearchAction::List => {
            let all = manager.all()?;
            if all.is_empty() {
                println!("No saved searches.");
            }
            for search in all {
                println!(
                    "{}  {:<20} {}",
                    search.id,
                    search.name,
                    searches::search_url(&search.filters)
                );
            }
        }
        SearchAction::Run { id } => {
            let Some(search) = manager.get(&id)? else {
                anyhow::bail!("Saved search not found: {}", id);
            };
            println!(
                "Running \"{}\" — {}",
                search.name,
                searches::search_url(&search.filters)
            );
            println!();
            run_companies(&DirectoryQuery::new(search.filters));
        }
    }

    Ok(())
}
