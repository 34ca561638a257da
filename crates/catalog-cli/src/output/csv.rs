//! CSV output formatter

use super::FormatOptions;
use catalog_core::SearchHit;

pub fn format_results(results: &[SearchHit], options: &FormatOptions) -> String {
    let mut output = if options.full {
        String::from("docid,score,name,content\n")
    } else {
        String::from("docid,score,name\n")
    };

    for r in results {
        let name = escape_csv(r.name.as_deref().unwrap_or(""));
        if options.full {
            output.push_str(&format!(
                "{},{:.4},{},{}\n",
                r.doc_id,
                r.score,
                name,
                escape_csv(&r.content)
            ));
        } else {
            output.push_str(&format!("{},{:.4},{}\n", r.doc_id, r.score, name));
        }
    }

    output
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_fields() {
        let hits = vec![SearchHit {
            doc_id: "abc".to_string(),
            score: 0.25,
            name: Some("Buds, \"Pro\"".to_string()),
            content: "id: 1\nname: Buds".to_string(),
        }];
        assert_eq!(
            format_results(&hits, &FormatOptions { full: false }),
            "docid,score,name\nabc,0.2500,\"Buds, \"\"Pro\"\"\"\n"
        );
        assert!(format_results(&hits, &FormatOptions { full: true })
            .ends_with(",\"id: 1\nname: Buds\"\n"));
    }
}
