//! Progress reporting on stderr

use catalog_core::{EnrichProgress, IngestProgress, RecordOutcome};
use std::io::{self, Write};

/// One line when a record is sent to the model, one when it is done
pub fn enrich_line(progress: &EnrichProgress) -> String {
    let Some(outcome) = &progress.outcome else {
        return format!(
            "[{}/{}] Classifying: {}",
            progress.index, progress.total, progress.name
        );
    };
    let status = match outcome {
        RecordOutcome::Enriched {
            product_type,
            connectivity,
            use_cases,
        } => format!("{} / {} / {}", product_type, connectivity, use_cases),
        RecordOutcome::Partial {
            product_type,
            connectivity,
            use_cases,
        } => format!(
            "partial: {} / {} / {}",
            or_null(product_type),
            or_null(connectivity),
            or_null(use_cases)
        ),
        RecordOutcome::AlreadyEnriched => "already enriched".to_string(),
        RecordOutcome::Failed => "failed".to_string(),
    };
    format!(
        "[{}/{}] {} ... {}",
        progress.index, progress.total, progress.name, status
    )
}

fn or_null(value: &str) -> &str {
    if value.is_empty() {
        "null"
    } else {
        value
    }
}

pub fn report_enrich(progress: EnrichProgress) {
    eprintln!("{}", enrich_line(&progress));
}

pub fn report_ingest(progress: IngestProgress) {
    eprint!("\rEmbedding: {}/{} documents   ", progress.embedded, progress.total);
    io::stderr().flush().ok();
    if progress.embedded == progress.total {
        eprintln!();
    }
}
