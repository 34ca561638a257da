//! CSV enrichment: classify each row and write three derived columns back
//!
//! Validation here is lenient: out-of-vocabulary values are logged and kept
//! as returned, and use cases are stored pipe-separated so the cell stays flat.

use super::{
    emit_started, request_classification, write_atomically, EnrichOptions, EnrichProgress,
    EnrichReport, ProductPrompt, ProgressFn, RawClassification, RecordOutcome,
    CONNECTIVITY_FIELD, TARGET_FIELDS, TYPE_FIELD, USE_CASES_FIELD,
};
use crate::error::{CatalogError, Result};
use crate::llm::LLMClient;
use crate::taxonomy::{Connectivity, ProductType, UseCase, ValueOrder};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;

/// Columns every input file must have
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "description", "price", "URL"];

/// Separator used to flatten use cases into one cell
pub const USE_CASE_SEPARATOR: &str = "|";

/// Parsed CSV table with header lookup
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for (row_num, result) in reader.records().enumerate() {
            let record: StringRecord = result.map_err(|e| {
                CatalogError::Parse(format!("Failed to parse CSV row {}: {}", row_num + 1, e))
            })?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Add any missing target columns at the end, keeping original order
    fn ensure_columns(&mut self, names: &[&str]) {
        for name in names {
            if self.column(name).is_none() {
                self.headers.push(name.to_string());
            }
        }
        let width = self.headers.len();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(&row[..self.headers.len().min(row.len())])?;
        }
        writer
            .into_inner()
            .map_err(|e| CatalogError::Io(e.into_error()))
    }
}

/// Enrich a CSV file in place (or into `output`).
///
/// Required columns: name, description, price, URL.
/// Added columns: type, Connectivity, Use Cases.
pub async fn enrich_csv(
    client: &dyn LLMClient,
    input: &Path,
    output: Option<&Path>,
    options: EnrichOptions,
    progress: Option<ProgressFn<'_>>,
) -> Result<EnrichReport> {
    let output = output.unwrap_or(input);
    let mut table = Table::read(input)?;

    if table.rows.is_empty() {
        tracing::info!("CSV {} is empty, nothing to process", input.display());
        return Ok(EnrichReport::default());
    }

    for required in REQUIRED_COLUMNS {
        if table.column(required).is_none() {
            return Err(CatalogError::InvalidInput(format!(
                "Required column '{}' not found in {}",
                required,
                input.display()
            )));
        }
    }

    let had_all_targets = TARGET_FIELDS.iter().all(|f| table.column(f).is_some());
    table.ensure_columns(&TARGET_FIELDS);

    let col = |name: &str| table.column(name).unwrap_or(0);
    let (name_col, desc_col, price_col) = (col("name"), col("description"), col("price"));
    let target_cols = [col(TYPE_FIELD), col(CONNECTIVITY_FIELD), col(USE_CASES_FIELD)];

    let total = table.rows.len();
    let mut report = EnrichReport {
        total,
        ..Default::default()
    };

    tracing::info!("Processing {} product(s) from {}", total, input.display());

    for (idx, row) in table.rows.iter_mut().enumerate() {
        let prompt = ProductPrompt {
            name: row[name_col].trim().to_string(),
            description: row[desc_col].trim().to_string(),
            price: row[price_col].trim().to_string(),
            category: None,
        };

        let already = had_all_targets && target_cols.iter().all(|&c| !row[c].trim().is_empty());

        let outcome = if already && !options.force {
            RecordOutcome::AlreadyEnriched
        } else {
            emit_started(progress, idx + 1, total, &prompt.name);
            let label = format!("classify '{}'", prompt.name);
            let result = options
                .retry
                .retry(&label, |_| {
                    request_classification(client, &prompt, ValueOrder::Sorted)
                })
                .await;

            match result {
                Ok(raw) => {
                    let (cells, warnings) = lenient_cells(&prompt.name, &raw);
                    report.warnings += warnings;
                    for (&c, value) in target_cols.iter().zip(cells.iter()) {
                        row[c] = value.clone();
                    }
                    let [product_type, connectivity, use_cases] = cells;
                    RecordOutcome::Enriched {
                        product_type,
                        connectivity,
                        use_cases,
                    }
                }
                Err(e) => {
                    tracing::error!("LLM call failed for '{}': {}", prompt.name, e);
                    for &c in &target_cols {
                        row[c].clear();
                    }
                    RecordOutcome::Failed
                }
            }
        };

        report.record(&outcome);
        if let Some(cb) = progress {
            cb(EnrichProgress {
                index: idx + 1,
                total,
                name: prompt.name.clone(),
                outcome: Some(outcome),
            });
        }
    }

    write_atomically(output, &table.to_bytes()?)?;
    tracing::info!("Enriched CSV written to {}", output.display());

    Ok(report)
}

/// Turn a raw classification into the three cell values, warning on
/// anything outside the vocabularies but keeping it as-is.
fn lenient_cells(name: &str, raw: &RawClassification) -> ([String; 3], usize) {
    let mut warnings = 0;

    let product_type = raw.product_type.clone().unwrap_or_default();
    if ProductType::parse(&product_type).is_none() {
        tracing::warn!("Unexpected type '{}' for '{}'. Keeping as-is", product_type, name);
        warnings += 1;
    }

    let connectivity = raw.connectivity.clone().unwrap_or_default();
    if Connectivity::parse(&connectivity).is_none() {
        tracing::warn!(
            "Unexpected connectivity '{}' for '{}'. Keeping as-is",
            connectivity,
            name
        );
        warnings += 1;
    }

    if raw.use_cases.is_empty() {
        tracing::warn!("No use-case returned for '{}'", name);
        warnings += 1;
    }
    for use_case in &raw.use_cases {
        if UseCase::parse(use_case).is_none() {
            tracing::warn!("Unexpected use-case '{}' for '{}'. Keeping as-is", use_case, name);
            warnings += 1;
        }
    }

    (
        [
            product_type,
            connectivity,
            raw.use_cases.join(USE_CASE_SEPARATOR),
        ],
        warnings,
    )
}
