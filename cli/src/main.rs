//! GovServ CLI Entry Point
//!
//! Thin frontend over the catalog library. Loads the service catalog
//! (local cache first, SPARQL endpoint as fallback) and runs keyword or
//! semantic searches against it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use govserv_catalog::{
    rank, Catalog, EmbeddingCache, LoadCoordinator, ServiceRecord, SparqlSource,
};

#[derive(Parser)]
#[command(name = "govserv")]
#[command(about = "Search a catalog of public government services")]
#[command(version)]
struct Args {
    /// Path to the local service cache
    #[arg(long, default_value = "services.json")]
    cache: PathBuf,

    /// SPARQL endpoint queried when the cache is unusable
    #[arg(long, default_value = govserv_catalog::remote::DEFAULT_ENDPOINT)]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the catalog and report where the records came from
    Load,
    /// Rank services by keyword relevance
    Search {
        /// Keywords to match against names, descriptions and tags
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Maximum number of results
        #[arg(long, default_value_t = rank::DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Search services by meaning (requires the fastembed feature)
    Semantic {
        /// Free-text query
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = rank::DEFAULT_LIMIT)]
        limit: usize,
    },
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "govserv=info,govserv_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut catalog = Catalog::new();
    let mut coordinator = LoadCoordinator::new(&args.cache, SparqlSource::new(&args.endpoint));

    match args.command {
        Command::Load => {
            let outcome = coordinator.load(&mut catalog)?;
            println!(
                "Loaded {} records from {:?} ({} skipped)",
                outcome.loaded, outcome.source, outcome.skipped
            );
        }
        Command::Search { keywords, limit } => {
            coordinator.load(&mut catalog)?;
            let hits = rank::rank(&catalog.all(), &keywords, limit);
            if hits.is_empty() {
                println!("No services matched");
            }
            for record in &hits {
                print_record(record);
            }
        }
        Command::Semantic { query, limit } => {
            let mut embeddings = build_embeddings()?;
            coordinator.load_and_refresh(&mut catalog, &mut embeddings)?;
            let hits = embeddings.search(&catalog, &query, limit)?;
            if hits.is_empty() {
                println!("No services matched");
            }
            for record in &hits {
                print_record(record);
            }
        }
    }
    Ok(())
}

fn print_record(record: &ServiceRecord) {
    println!("{}\t{}", record.identifier(), record.name());
    println!("\t{}", record.description());
}

#[cfg(feature = "fastembed")]
fn build_embeddings() -> anyhow::Result<EmbeddingCache> {
    use govserv_catalog::{FastEmbedProvider, HnswVectorIndex};

    let provider = FastEmbedProvider::new()?;
    Ok(EmbeddingCache::new(
        Box::new(provider),
        Box::new(HnswVectorIndex::new()),
    ))
}

#[cfg(not(feature = "fastembed"))]
fn build_embeddings() -> anyhow::Result<EmbeddingCache> {
    anyhow::bail!("semantic search requires building with the `fastembed` feature")
}
