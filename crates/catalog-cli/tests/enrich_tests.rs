//! Integration tests for the enrich commands (offline paths only)

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn catalog_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("GROQ_API_KEY")
        .env_remove("CATALOG_LLM_API_KEY")
        .arg("--config")
        .arg(dir.path().join("config.yml"));
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();

    catalog_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("enrich-csv"))
        .stdout(predicate::str::contains("enrich-json"))
        .stdout(predicate::str::contains("assist"))
        .stdout(predicate::str::contains("ingest"));
}

#[test]
fn test_missing_api_key_is_reported_first() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), "name,description,price,URL\nA,d,1,u\n").unwrap();

    catalog_cmd(&dir)
        .arg("enrich-csv")
        .arg("products.csv")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No chat API key configured"));

    // nothing touched
    assert_eq!(
        fs::read_to_string(dir.path().join("products.csv")).unwrap(),
        "name,description,price,URL\nA,d,1,u\n"
    );
}

#[test]
fn test_missing_required_column() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), "name,description,price\nA,d,1\n").unwrap();

    catalog_cmd(&dir)
        .env("CATALOG_LLM_API_KEY", "test-key")
        .env("CATALOG_LLM_URL", "http://127.0.0.1:9")
        .arg("enrich-csv")
        .arg("products.csv")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Required column 'URL' not found"));
}

#[test]
fn test_empty_csv_nothing_to_process() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), "name,description,price,URL\n").unwrap();

    catalog_cmd(&dir)
        .env("CATALOG_LLM_API_KEY", "test-key")
        .env("CATALOG_LLM_URL", "http://127.0.0.1:9")
        .arg("enrich-csv")
        .arg("products.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to process"));
}

#[test]
fn test_json_must_be_array() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.json"), r#"{"name": "solo"}"#).unwrap();

    catalog_cmd(&dir)
        .env("CATALOG_LLM_API_KEY", "test-key")
        .env("CATALOG_LLM_URL", "http://127.0.0.1:9")
        .arg("enrich-json")
        .arg("products.json")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Expected a JSON array"));
}

#[test]
fn test_json_fully_enriched_is_noop() {
    let dir = TempDir::new().unwrap();
    let content = r#"[{"name":"Done","type":"TWS","Connectivity":"Wireless","Use Cases":["Music"]}]"#;
    fs::write(dir.path().join("products.json"), content).unwrap();

    catalog_cmd(&dir)
        .env("CATALOG_LLM_API_KEY", "test-key")
        .env("CATALOG_LLM_URL", "http://127.0.0.1:9")
        .arg("--format")
        .arg("json")
        .arg("enrich-json")
        .arg("products.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"already_enriched\": 1"))
        .stderr(predicate::str::contains("[1/1] Done ... already enriched"));

    assert_eq!(fs::read_to_string(dir.path().join("products.json")).unwrap(), content);
}
