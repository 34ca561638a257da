//! Search command

use crate::app::{OutputFormat, SearchArgs};
use crate::output::{format_search_results, FormatOptions};
use anyhow::Result;
use catalog_core::{search, Config, HttpEmbedder, VectorStore};

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let store = VectorStore::open(&args.store.store)?;

    if store.stats()?.embedded_count == 0 {
        eprintln!("Warning: No vector embeddings found. Run 'catalog ingest' first.");
        return Ok(());
    }

    let embedder = HttpEmbedder::new(config.embedding.clone())?;
    let results = search(&store, &embedder, &query, args.limit, args.min_score).await?;

    let format_opts = FormatOptions { full: args.full };
    print!("{}", format_search_results(&results, format, &format_opts));
    Ok(())
}
