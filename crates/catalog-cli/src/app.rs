//! CLI argument definitions

use catalog_core::assist::DEFAULT_MAX_STEPS;
use catalog_core::db::DEFAULT_STORE_DIR;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(
    author,
    version,
    about = "Enrich product catalogues with LLM tool calls and load them into a vector store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/catalog/config.yml)
    #[arg(long, global = true, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify CSV product rows (type, Connectivity, Use Cases)
    EnrichCsv(EnrichArgs),

    /// Classify a JSON array of product records
    EnrichJson(EnrichArgs),

    /// Run an instruction with file tools offered to the model
    Assist(AssistArgs),

    /// Build the embedding corpus from a product CSV
    Corpus(CorpusArgs),

    /// Split a corpus into blocks, embed them and store them
    Ingest(IngestArgs),

    /// Similarity search over the vector store
    Search(SearchArgs),

    /// Show vector store status
    Status(StoreArgs),
}

#[derive(Args)]
pub struct EnrichArgs {
    /// Input file
    pub input: PathBuf,

    /// Write here instead of overwriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Re-classify records that are already enriched
    #[arg(long)]
    pub force: bool,

    /// Attempts per record (overrides config)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds (overrides config)
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,
}

#[derive(Args)]
pub struct AssistArgs {
    /// Instruction for the model
    #[arg(required = true)]
    pub instruction: Vec<String>,

    /// Directory the file tools operate in
    #[arg(short = 'C', long, default_value = ".")]
    pub dir: PathBuf,

    /// Maximum model round-trips
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,
}

#[derive(Args)]
pub struct CorpusArgs {
    /// Product CSV (id, name, category, description, price)
    #[arg(default_value = "products.csv")]
    pub input: PathBuf,

    /// Corpus file to write
    #[arg(short, long, default_value = "products_embedding.txt")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct StoreArgs {
    /// Vector store directory
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    pub store: PathBuf,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Corpus file with `---`-separated blocks
    #[arg(default_value = "products_embedding.txt")]
    pub input: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', default_value = "5")]
    pub limit: usize,

    /// Minimum score threshold
    #[arg(long, default_value = "0")]
    pub min_score: f64,

    /// Show full block content
    #[arg(long)]
    pub full: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Cli,
    Json,
    Csv,
}
