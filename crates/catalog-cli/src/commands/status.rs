//! Status command

use crate::app::{OutputFormat, StoreArgs};
use anyhow::Result;
use catalog_core::VectorStore;

pub fn run(args: StoreArgs, format: OutputFormat) -> Result<()> {
    let store = VectorStore::open(&args.store)?;
    let stats = store.stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Csv => {
            println!("model,dimensions,embedded,last_used_at");
            for m in &stats.models {
                println!(
                    "{},{},{},{}",
                    m.model, m.dimensions, m.embedded_count, m.last_used_at
                );
            }
        }
        OutputFormat::Cli => {
            println!("Store:           {}", args.store.display());
            println!("Documents:       {}", stats.document_count);
            println!();
            println!("Embeddings:");
            println!("  Embedded:      {}", stats.embedded_count);
            println!("  Pending:       {}", stats.pending_embedding);
            if !stats.models.is_empty() {
                println!();
                println!("Models:");
                for m in &stats.models {
                    println!(
                        "  {:<14} {} dims, {} embedded",
                        m.model, m.dimensions, m.embedded_count
                    );
                }
            }
        }
    }
    Ok(())
}
