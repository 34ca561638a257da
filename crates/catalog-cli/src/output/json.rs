//! JSON output formatter

use super::FormatOptions;
use catalog_core::SearchHit;

pub fn format_results(results: &[SearchHit], options: &FormatOptions) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|r| {
            let mut value = serde_json::json!({
                "docid": r.doc_id,
                "score": r.score,
                "name": r.name,
            });
            if options.full {
                value["content"] = serde_json::Value::from(r.content.as_str());
            }
            value
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_only_when_full() {
        let hits = vec![SearchHit {
            doc_id: "abc".to_string(),
            score: 0.5,
            name: None,
            content: "id: 1".to_string(),
        }];
        let short: serde_json::Value =
            serde_json::from_str(&format_results(&hits, &FormatOptions { full: false })).unwrap();
        assert!(short[0].get("content").is_none());
        assert_eq!(short[0]["name"], serde_json::Value::Null);

        let full: serde_json::Value =
            serde_json::from_str(&format_results(&hits, &FormatOptions { full: true })).unwrap();
        assert_eq!(full[0]["content"], "id: 1");
    }
}
