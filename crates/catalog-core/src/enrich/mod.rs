//! Product enrichment via a forced `enrich_product` tool call
//!
//! The CSV and JSON pipelines share the tool schema, prompt and response
//! decoding defined here; they differ in how they validate and persist.

pub mod csv;
pub mod json;

use crate::error::{CatalogError, Result};
use crate::llm::{ChatMessage, LLMClient, RetryPolicy, ToolChoice, ToolDefinition};
use crate::taxonomy::{normalize_use_cases, Connectivity, ProductType, UseCase, ValueOrder};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub use self::csv::enrich_csv;
pub use self::json::enrich_json;

/// Name of the classification tool
pub const ENRICH_TOOL_NAME: &str = "enrich_product";

/// Output field holding the product type
pub const TYPE_FIELD: &str = "type";
/// Output field holding the connectivity
pub const CONNECTIVITY_FIELD: &str = "Connectivity";
/// Output field holding the use cases
pub const USE_CASES_FIELD: &str = "Use Cases";

/// The three derived fields, in output order
pub const TARGET_FIELDS: [&str; 3] = [TYPE_FIELD, CONNECTIVITY_FIELD, USE_CASES_FIELD];

/// Build the `enrich_product` tool schema
pub fn enrich_product_tool(order: ValueOrder) -> ToolDefinition {
    ToolDefinition::new(
        ENRICH_TOOL_NAME,
        "Classify an audio product into its type, connectivity, and primary use-case \
         based on its name, description, and price.",
        json!({
            "type": "object",
            "properties": {
                TYPE_FIELD: {
                    "type": "string",
                    "enum": ProductType::labels(order),
                    "description": "Category of the audio product."
                },
                CONNECTIVITY_FIELD: {
                    "type": "string",
                    "enum": Connectivity::labels(order),
                    "description": "How the product connects to a device."
                },
                USE_CASES_FIELD: {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": UseCase::labels(order)
                    },
                    "minItems": 1,
                    "uniqueItems": true,
                    "description": "One or more use-cases that apply to this product."
                }
            },
            "required": TARGET_FIELDS
        }),
    )
}

/// Product facts sent to the model
#[derive(Debug, Clone, Default)]
pub struct ProductPrompt {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: Option<String>,
}

impl ProductPrompt {
    pub fn render(&self) -> String {
        let mut prompt = format!(
            "Product Name   : {}\nDescription    : {}\nPrice          : {}\n",
            self.name, self.description, self.price
        );
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            prompt.push_str(&format!("Category       : {}\n", category));
        }
        prompt.push_str(&format!(
            "\nBased on the information above, call the `{}` tool to classify this audio product.",
            ENRICH_TOOL_NAME
        ));
        prompt
    }
}

/// Tool-call arguments as returned, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawClassification {
    pub product_type: Option<String>,
    pub connectivity: Option<String>,
    pub use_cases: Vec<String>,
    /// `Use Cases` was an array holding non-string items (dropped from `use_cases`)
    pub non_string_use_cases: bool,
}

impl RawClassification {
    pub fn from_arguments(args: &Value) -> Self {
        let use_cases = args.get(USE_CASES_FIELD);
        let non_string_use_cases = match use_cases {
            Some(Value::Array(items)) => items.iter().any(|v| !v.is_string()),
            _ => false,
        };

        Self {
            product_type: scalar_field(args, TYPE_FIELD),
            connectivity: scalar_field(args, CONNECTIVITY_FIELD),
            use_cases: use_cases.map(normalize_use_cases).unwrap_or_default(),
            non_string_use_cases,
        }
    }
}

fn scalar_field(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Make one forced `enrich_product` call for a product
pub async fn request_classification(
    client: &dyn LLMClient,
    prompt: &ProductPrompt,
    order: ValueOrder,
) -> Result<RawClassification> {
    let messages = [ChatMessage::user(prompt.render())];
    let tools = [enrich_product_tool(order)];
    let choice = ToolChoice::function(ENRICH_TOOL_NAME);

    let reply = client.chat(&messages, &tools, &choice).await?;

    let call = reply
        .tool_calls
        .iter()
        .find(|c| c.name() == ENRICH_TOOL_NAME)
        .or_else(|| reply.tool_calls.first())
        .ok_or_else(|| {
            CatalogError::Llm(format!("No tool call returned for '{}'", prompt.name))
        })?;

    let args = call.parse_arguments()?;
    Ok(RawClassification::from_arguments(&args))
}

/// Options shared by the enrichment pipelines
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichOptions {
    pub retry: RetryPolicy,
    /// Re-classify records that already carry all target fields
    pub force: bool,
}

/// What happened to a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Enriched {
        product_type: String,
        connectivity: String,
        use_cases: String,
    },
    /// Some fields could not be validated and were stored as null
    Partial {
        product_type: String,
        connectivity: String,
        use_cases: String,
    },
    AlreadyEnriched,
    Failed,
}

/// Progress event for one record
///
/// Emitted with `outcome: None` right before a record is sent to the model,
/// and again with the outcome once it has been handled.
#[derive(Debug, Clone)]
pub struct EnrichProgress {
    /// 1-based record position
    pub index: usize,
    pub total: usize,
    pub name: String,
    pub outcome: Option<RecordOutcome>,
}

pub(crate) fn emit_started(
    progress: Option<ProgressFn<'_>>,
    index: usize,
    total: usize,
    name: &str,
) {
    if let Some(cb) = progress {
        cb(EnrichProgress {
            index,
            total,
            name: name.to_string(),
            outcome: None,
        });
    }
}

/// Progress callback
pub type ProgressFn<'a> = &'a (dyn Fn(EnrichProgress) + Send + Sync);

/// Run summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    pub total: usize,
    pub enriched: usize,
    pub partial: usize,
    pub already_enriched: usize,
    pub failed: usize,
    /// Out-of-vocabulary values seen (kept or nulled, depending on pipeline)
    pub warnings: usize,
}

impl EnrichReport {
    fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Enriched { .. } => self.enriched += 1,
            RecordOutcome::Partial { .. } => self.partial += 1,
            RecordOutcome::AlreadyEnriched => self.already_enriched += 1,
            RecordOutcome::Failed => self.failed += 1,
        }
    }
}

/// Replace `path` with `bytes` via a sibling temp file and rename
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CatalogError::InvalidInput(format!("Not a file path: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
