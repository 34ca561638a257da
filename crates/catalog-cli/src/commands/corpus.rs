//! Corpus command

use crate::app::CorpusArgs;
use anyhow::Result;
use catalog_core::build_corpus;

pub fn run(args: CorpusArgs) -> Result<()> {
    let count = build_corpus(&args.input, &args.output)?;
    println!("Embedding file created: {} ({} blocks)", args.output.display(), count);
    Ok(())
}
