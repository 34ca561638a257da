//! Terminal output formatter

use super::FormatOptions;
use catalog_core::db::short_id;
use catalog_core::SearchHit;

pub fn format_results(results: &[SearchHit], options: &FormatOptions) -> String {
    if results.is_empty() {
        return String::from("No results\n");
    }

    let mut output = String::new();

    for result in results {
        let score_pct = (result.score.max(0.0) * 100.0) as u32;
        let title = result
            .name
            .as_deref()
            .or_else(|| result.content.lines().next())
            .unwrap_or("");
        output.push_str(&format!(
            "{:>3}% {} #{}\n",
            score_pct,
            title,
            short_id(&result.doc_id)
        ));

        if options.full {
            for line in result.content.lines() {
                output.push_str(&format!("  {}\n", line));
            }
        }
    }

    output
}
