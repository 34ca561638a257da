//! Output formatters

pub mod csv;
pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use catalog_core::SearchHit;

/// Format options
pub struct FormatOptions {
    pub full: bool,
}

/// Format search results
pub fn format_search_results(
    results: &[SearchHit],
    format: OutputFormat,
    options: &FormatOptions,
) -> String {
    match format {
        OutputFormat::Json => json::format_results(results, options),
        OutputFormat::Csv => csv::format_results(results, options),
        OutputFormat::Cli => terminal::format_results(results, options),
    }
}
