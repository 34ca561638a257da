//! Embedding corpus: product rows flattened into `---`-terminated text blocks

use crate::db::hash_content;
use crate::error::{CatalogError, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Literal marker ending each block
pub const BLOCK_SEPARATOR: &str = "---";

/// Fields copied from a product row into its block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
}

/// Render one row as a block ending in the separator
pub fn to_embedding_block(row: &ProductRow) -> String {
    format!(
        "\nid: {}\nname: {}\ncategory: {}\ndescription: {}\nprice: {}\n{}\n",
        row.id, row.name, row.category, row.description, row.price, BLOCK_SEPARATOR
    )
    .trim()
    .to_string()
}

/// Read product rows; absent columns and short rows yield empty strings
pub fn read_product_rows(csv_path: &Path) -> Result<Vec<ProductRow>> {
    if !csv_path.is_file() {
        return Err(CatalogError::FileNotFound(csv_path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let columns = [
        column("id"),
        column("name"),
        column("category"),
        column("description"),
        column("price"),
    ];

    let mut rows = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse CSV row {}: {}", row_num + 1, e))
        })?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        rows.push(ProductRow {
            id: cell(columns[0]),
            name: cell(columns[1]),
            category: cell(columns[2]),
            description: cell(columns[3]),
            price: cell(columns[4]),
        });
    }

    Ok(rows)
}

/// Write the corpus for `csv_path` to `out_path`, returning the block count
pub fn build_corpus(csv_path: &Path, out_path: &Path) -> Result<usize> {
    let rows = read_product_rows(csv_path)?;
    let blocks: Vec<String> = rows.iter().map(to_embedding_block).collect();

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(out_path, blocks.join("\n\n"))?;

    tracing::info!(
        "Wrote {} block(s) from {} to {}",
        blocks.len(),
        csv_path.display(),
        out_path.display()
    );
    Ok(blocks.len())
}

/// One retrievable unit of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// SHA-256 of `content`
    pub id: String,
    pub content: String,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: hash_content(&content),
            content,
        }
    }

    /// Value of the first `key: value` line, if present
    pub fn field(&self, key: &str) -> Option<&str> {
        self.content.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == key).then(|| v.trim())
        })
    }
}

/// Split corpus text on the separator, dropping blank blocks
pub fn split_blocks(text: &str) -> Vec<Document> {
    text.split(BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(Document::new)
        .collect()
}
