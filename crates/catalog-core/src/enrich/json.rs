//! JSON enrichment: classify each record of a JSON array in place
//!
//! Validation is strict. A response with any out-of-vocabulary value is
//! rejected and retried; fields still invalid after the last attempt are
//! stored as `null`. The file is rewritten after every record so an
//! interrupted run picks up where it stopped.

use super::{
    emit_started, request_classification, write_atomically, EnrichOptions, EnrichProgress,
    EnrichReport, ProductPrompt, ProgressFn, RawClassification, RecordOutcome,
    CONNECTIVITY_FIELD, TARGET_FIELDS, TYPE_FIELD, USE_CASES_FIELD,
};
use crate::error::{CatalogError, Result};
use crate::llm::LLMClient;
use crate::taxonomy::{Connectivity, ProductType, UseCase, ValueOrder};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// Classification fields that passed validation
#[derive(Debug, Clone, Default, PartialEq)]
struct Validated {
    product_type: Option<ProductType>,
    connectivity: Option<Connectivity>,
    use_cases: Option<Vec<UseCase>>,
}

impl Validated {
    fn from_raw(raw: &RawClassification) -> Self {
        let use_cases: Option<Vec<UseCase>> = raw
            .use_cases
            .iter()
            .map(|u| UseCase::parse(u))
            .collect::<Option<Vec<_>>>()
            .filter(|list| !list.is_empty() && !raw.non_string_use_cases);

        Self {
            product_type: raw.product_type.as_deref().and_then(ProductType::parse),
            connectivity: raw.connectivity.as_deref().and_then(Connectivity::parse),
            use_cases,
        }
    }

    fn is_complete(&self) -> bool {
        self.product_type.is_some() && self.connectivity.is_some() && self.use_cases.is_some()
    }

    fn is_empty(&self) -> bool {
        self.product_type.is_none() && self.connectivity.is_none() && self.use_cases.is_none()
    }

    fn rejected_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.product_type.is_none() {
            fields.push(TYPE_FIELD);
        }
        if self.connectivity.is_none() {
            fields.push(CONNECTIVITY_FIELD);
        }
        if self.use_cases.is_none() {
            fields.push(USE_CASES_FIELD);
        }
        fields
    }

    /// Write the three fields into `record`, `null` where invalid
    fn apply(&self, record: &mut Map<String, Value>) {
        record.insert(
            TYPE_FIELD.to_string(),
            self.product_type
                .map(|t| Value::from(t.as_str()))
                .unwrap_or(Value::Null),
        );
        record.insert(
            CONNECTIVITY_FIELD.to_string(),
            self.connectivity
                .map(|c| Value::from(c.as_str()))
                .unwrap_or(Value::Null),
        );
        record.insert(
            USE_CASES_FIELD.to_string(),
            self.use_cases
                .as_ref()
                .map(|list| Value::from(list.iter().map(|u| u.as_str()).collect::<Vec<_>>()))
                .unwrap_or(Value::Null),
        );
    }

    fn outcome(&self) -> RecordOutcome {
        let product_type = self.product_type.map(|t| t.to_string()).unwrap_or_default();
        let connectivity = self.connectivity.map(|c| c.to_string()).unwrap_or_default();
        let use_cases = self
            .use_cases
            .as_ref()
            .map(|list| list.iter().map(|u| u.as_str()).collect::<Vec<_>>().join("|"))
            .unwrap_or_default();

        if self.is_complete() {
            RecordOutcome::Enriched {
                product_type,
                connectivity,
                use_cases,
            }
        } else if self.is_empty() {
            RecordOutcome::Failed
        } else {
            RecordOutcome::Partial {
                product_type,
                connectivity,
                use_cases,
            }
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<Map<String, Value>>> {
    if !path.is_file() {
        return Err(CatalogError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| CatalogError::Parse(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    let Value::Array(items) = value else {
        return Err(CatalogError::Parse(format!(
            "Expected a JSON array of products in {}",
            path.display()
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(CatalogError::Parse(format!(
                "Item {} in {} is not an object: {}",
                idx, path.display(), other
            ))),
        })
        .collect()
}

fn write_records(path: &Path, records: &[Map<String, Value>]) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    write_atomically(path, &bytes)
}

fn text_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn prompt_for(record: &Map<String, Value>) -> ProductPrompt {
    let category = text_field(record, "category");
    ProductPrompt {
        name: text_field(record, "name"),
        description: text_field(record, "description"),
        price: text_field(record, "price"),
        category: (!category.is_empty()).then_some(category),
    }
}

/// Carry classifications from an earlier run's `output` over to `records`.
///
/// Records are matched by position and must agree on `name`. Returns how
/// many records were resumed.
fn merge_previous(
    records: &mut [Map<String, Value>],
    previous: &[Map<String, Value>],
) -> usize {
    let mut resumed = 0;
    for (record, prev) in records.iter_mut().zip(previous) {
        let done = TARGET_FIELDS.iter().all(|f| prev.contains_key(*f));
        if !done || text_field(record, "name") != text_field(prev, "name") {
            continue;
        }
        for field in TARGET_FIELDS {
            if let Some(value) = prev.get(field) {
                record.insert(field.to_string(), value.clone());
            }
        }
        resumed += 1;
    }
    resumed
}

/// Classify with strict validation, returning the last validated response
/// (if any response arrived at all).
async fn classify_strict(
    client: &dyn LLMClient,
    prompt: &ProductPrompt,
    options: &EnrichOptions,
) -> Option<Validated> {
    let last: Mutex<Option<Validated>> = Mutex::new(None);
    let label = format!("classify '{}'", prompt.name);

    let result = {
        let last = &last;
        options
            .retry
            .retry(&label, move |_| async move {
                let raw = request_classification(client, prompt, ValueOrder::Listed).await?;
                let validated = Validated::from_raw(&raw);
                let complete = validated.is_complete();
                let rejected = validated.rejected_fields();
                if let Ok(mut slot) = last.lock() {
                    *slot = Some(validated);
                }
                if complete {
                    Ok(())
                } else {
                    Err(CatalogError::Llm(format!(
                        "Rejected values for {} in {:?}",
                        rejected.join(", "),
                        raw
                    )))
                }
            })
            .await
    };

    if let Err(e) = &result {
        tracing::warn!("Giving up on '{}': {}", prompt.name, e);
    }

    last.into_inner().ok().flatten()
}

/// Enrich a JSON array of product records in place (or into `output`).
///
/// Each record gets `type`, `Connectivity` and `Use Cases` (a list). When a
/// separate `output` already exists, records it already classified are
/// picked up from there.
pub async fn enrich_json(
    client: &dyn LLMClient,
    input: &Path,
    output: Option<&Path>,
    options: EnrichOptions,
    progress: Option<ProgressFn<'_>>,
) -> Result<EnrichReport> {
    let output = output.unwrap_or(input);
    let mut records = read_records(input)?;

    if output != input && output.is_file() && !options.force {
        let previous = read_records(output)?;
        let resumed = merge_previous(&mut records, &previous);
        tracing::info!("Resuming {} record(s) from {}", resumed, output.display());
    }

    let total = records.len();
    let mut report = EnrichReport {
        total,
        ..Default::default()
    };

    if total == 0 {
        tracing::info!("JSON {} holds no records, nothing to process", input.display());
        return Ok(report);
    }

    tracing::info!("Processing {} product(s) from {}", total, input.display());

    for idx in 0..total {
        let record = &mut records[idx];
        let prompt = prompt_for(record);
        let already = TARGET_FIELDS.iter().all(|f| record.contains_key(*f));

        let outcome = if already && !options.force {
            RecordOutcome::AlreadyEnriched
        } else {
            emit_started(progress, idx + 1, total, &prompt.name);
            let validated = classify_strict(client, &prompt, &options)
                .await
                .unwrap_or_default();
            if !validated.is_complete() {
                let nulled = validated.rejected_fields();
                report.warnings += nulled.len();
                tracing::warn!(
                    "Storing null for {} on '{}'",
                    nulled.join(", "),
                    prompt.name
                );
            }
            validated.apply(record);
            let outcome = validated.outcome();
            write_records(output, &records)?;
            outcome
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

    if output != input && report.already_enriched == total {
        write_records(output, &records)?;
    }
    tracing::info!("Enriched JSON written to {}", output.display());

    Ok(report)
}
