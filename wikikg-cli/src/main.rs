use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikikg::{default_terminal_categories, CacheConfig, ClientConfig, LabeledQid, Qid, WikiClient};

#[derive(Parser)]
#[command(name = "wikikg")]
#[command(about = "Wikidata lookups with a persistent cache", long_about = None)]
struct Cli {
    /// Cache file (defaults to WIKIKG_CACHE_PATH; in-memory when neither is set)
    #[arg(short, long)]
    cache: Option<PathBuf>,

    /// Language for labels and title search (defaults to WIKIKG_LANG or "en")
    #[arg(short, long)]
    lang: Option<String>,

    /// Skip synchronizing the cache file after the command
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the label of an entity
    Name {
        /// Entity identifier, e.g. Q42
        qid: String,
    },

    /// Print label and description of an entity
    Info {
        /// Entity identifier
        qid: String,
    },

    /// List what an entity is an instance of
    Type {
        /// Entity identifier
        qid: String,

        /// Print identifiers only, without labels
        #[arg(long)]
        ids_only: bool,
    },

    /// Nationality of a person, or country of a place/organization
    Country {
        /// Entity identifier
        qid: String,
    },

    /// Walk "subclass of" edges up to a terminal category
    Category {
        /// Entity identifier
        qid: String,

        /// Terminal category (repeatable; defaults to the built-in set)
        #[arg(short, long = "terminal")]
        terminals: Vec<String>,
    },

    /// Find the Wikidata item behind a Wikipedia page title
    Search {
        /// Page title
        title: String,
    },

    /// Show cached entries per tag
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "wikikg=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let client = create_client(&cli)?;
    let lang = client.config().default_lang.clone();

    match cli.command {
        Commands::Name { ref qid } => {
            let name = client.get_entity_name(qid, &lang).await?;
            if name.is_empty() {
                println!("{} has no label in '{}'", qid, lang);
            } else {
                println!("{}", name);
            }
        }

        Commands::Info { ref qid } => {
            let info = client.get_entity_info(qid, &lang).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Type { ref qid, ids_only } => {
            if ids_only {
                for id in client.get_entity_type_ids(qid).await? {
                    println!("{}", id);
                }
            } else {
                print_labeled(&client.get_entity_type(qid).await?);
            }
        }

        Commands::Country { ref qid } => {
            let countries = client.get_associated_country(qid).await?;
            if countries.is_empty() {
                println!("No country found for {}", qid);
            } else {
                print_labeled(&countries);
            }
        }

        Commands::Category {
            ref qid,
            ref terminals,
        } => {
            let terminals: HashSet<Qid> = if terminals.is_empty() {
                default_terminal_categories()
            } else {
                terminals.iter().cloned().collect()
            };

            match client.resolve_category(qid, &terminals).await? {
                Some(category) => {
                    let name = client.get_entity_name(&category, &lang).await?;
                    println!("{}  {}", category, name);
                }
                None => println!("{} reaches no terminal category", qid),
            }
        }

        Commands::Search { ref title } => {
            let matches = client.search_entity_id_by_title(title, &lang).await?;
            if matches.is_empty() {
                println!("No item found for '{}' on {}.wikipedia", title, lang);
            } else {
                for (page_id, found) in &matches {
                    println!("{}  {}  (page {})", found.qid, found.title, page_id);
                }
            }
        }

        Commands::Summary => {
            let summary = client.cache_summary().await;
            if summary.is_empty() {
                println!("Cache is empty.");
            } else {
                println!("Cache entries:");
                println!("{}", "=".repeat(40));
                for (tag, count) in &summary {
                    println!("  {:<28}{:>10}", tag, count);
                }
            }
        }
    }

    debug!("{}", client.cache_stats().await);

    if cli.no_sync {
        return Ok(());
    }

    if client.cache().read().await.path().is_some() {
        let report = client.sync_cache(None).await?;
        info!(
            "Cache synchronized: {} entries in {:?}",
            report.written_entries, report.path
        );
    } else {
        debug!("No cache file configured; nothing to synchronize");
    }

    Ok(())
}

fn create_client(cli: &Cli) -> Result<WikiClient> {
    let mut config = ClientConfig::from_env();
    if let Some(lang) = &cli.lang {
        config.default_lang = lang.clone();
    }

    let mut cache_config = CacheConfig::from_env();
    if let Some(path) = &cli.cache {
        cache_config.path = Some(path.clone());
    }

    Ok(WikiClient::new(config, cache_config)?)
}

fn print_labeled(entries: &[LabeledQid]) {
    for (qid, label) in entries {
        println!("{}  {}", qid, label);
    }
}
