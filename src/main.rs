//! `verity` command-line entrypoint.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::signal;

use verity::config::Config;
use verity::embedding::{EmbedderBackend, HashingEmbedder, HttpEmbedder};
use verity::index::{IndexBackend, MemoryIndex, QdrantIndex, SimilarityIndex};
use verity::ingest::{CancelHandle, IngestMode, IngestionPipeline, corpus_from_path};
use verity::resolver::MatchResolver;
use verity::store::{Catalog, DiskEntryStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Ingest a quote corpus and resolve texts to their most similar reference.
///
/// Configuration is read from `VERITY_*` environment variables.
#[derive(Parser)]
#[command(name = "verity", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed and store a JSON array or JSON Lines corpus
    Ingest {
        /// Corpus file (`.json`, `.jsonl` or `.ndjson`)
        corpus: PathBuf,

        /// Clear the store and index and re-embed everything
        #[arg(long)]
        full: bool,
    },

    /// Rebuild the similarity index from the entry store without re-embedding
    Reindex,

    /// Print the verdict for a text as JSON
    Resolve {
        /// Text to attribute; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print the number of stored entries and index points
    Count,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command = Cli::parse().command;

    let config = Config::from_env()?;
    config.validate()?;

    let embedder = Arc::new(match config.http_embedder_config() {
        Some(http) => EmbedderBackend::Http(HttpEmbedder::new(http)?),
        None => {
            tracing::warn!(
                "No VERITY_EMBEDDING_URL configured, using the local feature-hashing embedder"
            );
            EmbedderBackend::Hashing(HashingEmbedder::new(config.embedding_dim)?)
        }
    });

    let index = Arc::new(match config.qdrant_config() {
        Some(qdrant) => IndexBackend::Qdrant(QdrantIndex::new(qdrant)?),
        None => IndexBackend::Memory(MemoryIndex::new(config.embedding_dim)),
    });

    let store = Arc::new(DiskEntryStore::open(
        &config.storage_path,
        config.embedding_dim,
    )?);
    let catalog = Arc::new(Catalog::new(store, Arc::clone(&index)));
    let pipeline = IngestionPipeline::new(
        Arc::clone(&embedder),
        Arc::clone(&catalog),
        config.ingest_config(),
    )?;

    let index_kind = match *index {
        IndexBackend::Memory(_) => "memory",
        IndexBackend::Qdrant(_) => "qdrant",
    };
    tracing::info!(
        storage_path = %config.storage_path.display(),
        index = index_kind,
        dimension = config.embedding_dim,
        "Verity starting"
    );

    // The in-memory index starts empty; load it from the store unless it is about to be
    // rebuilt from scratch.
    let full_ingest = matches!(command, Command::Ingest { full: true, .. });
    if matches!(*index, IndexBackend::Memory(_)) && !full_ingest {
        pipeline.reindex_from_store().await?;
    }

    match command {
        Command::Ingest { corpus, full } => {
            let mode = if full {
                IngestMode::Full
            } else {
                IngestMode::Incremental
            };
            let source = corpus_from_path(corpus);
            let cancel = CancelHandle::new();
            spawn_cancel_on_signal(cancel.clone());

            let report = pipeline.ingest(source.as_ref(), mode, &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Reindex => {
            let points = pipeline.reindex_from_store().await?;
            println!("{}", serde_json::json!({ "points": points }));
        }
        Command::Resolve { text } => {
            let text = text.join(" ");
            let resolver = MatchResolver::new(embedder, index, config.resolver_config())?;
            let verdict = resolver.resolve_with_timeout(&text).await?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Command::Count => {
            let entries = catalog.count()?;
            let points = index.count().await?;
            println!(
                "{}",
                serde_json::json!({ "entries": entries, "points": points })
            );
        }
    }

    Ok(())
}

/// Cancels `cancel` on Ctrl+C or SIGTERM. Ingestion stops after the current batch.
fn spawn_cancel_on_signal(cancel: CancelHandle) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, cancelling after the current batch");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, cancelling after the current batch");
            }
        }
        cancel.cancel();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ingest_full_flag() {
        let cli = Cli::try_parse_from(["verity", "ingest", "kjv.jsonl", "--full"]).unwrap();
        match cli.command {
            Command::Ingest { corpus, full } => {
                assert_eq!(corpus, PathBuf::from("kjv.jsonl"));
                assert!(full);
            }
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn test_resolve_collects_words() {
        let cli = Cli::try_parse_from(["verity", "resolve", "Jesus", "wept"]).unwrap();
        match cli.command {
            Command::Resolve { text } => assert_eq!(text.join(" "), "Jesus wept"),
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_resolve_requires_text() {
        assert!(Cli::try_parse_from(["verity", "resolve"]).is_err());
        assert!(Cli::try_parse_from(["verity", "ingest"]).is_err());
    }
}
