//! Ingest command

use crate::app::{IngestArgs, OutputFormat};
use crate::progress::report_ingest;
use anyhow::{Context, Result};
use catalog_core::{ingest_documents, split_blocks, CatalogError, Config, HttpEmbedder, VectorStore};

pub async fn run(args: IngestArgs, config: &Config, format: OutputFormat) -> Result<()> {
    if !args.input.is_file() {
        return Err(CatalogError::FileNotFound(args.input.display().to_string()).into());
    }
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let docs = split_blocks(&text);

    let store = VectorStore::open(&args.store.store)?;
    let embedder = HttpEmbedder::new(config.embedding.clone())?;

    if docs.is_empty() {
        eprintln!("Warning: no blocks found in {}", args.input.display());
    }

    let stats = ingest_documents(&store, &embedder, &docs, Some(&report_ingest)).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        _ => {
            println!("Vectorstore updated: {}", args.store.store.display());
            println!("  Blocks:     {}", stats.total_documents);
            if stats.duplicate_documents > 0 {
                println!("  Duplicates: {}", stats.duplicate_documents);
            }
            println!("  New:        {}", stats.new_documents);
            println!("  Embedded:   {}", stats.embedded_documents);
            println!("  Skipped:    {}", stats.skipped_documents);
        }
    }
    Ok(())
}
