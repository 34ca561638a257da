//! Store schema and initialization

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// File created inside a store directory
pub const STORE_FILE_NAME: &str = "store.sqlite";

/// Handle to a persisted vector store
pub struct VectorStore {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

const SCHEMA_VERSION: i32 = 2;

const CREATE_TABLES: &str = r#"
-- Corpus blocks (content-addressable by SHA-256 hash)
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- One embedding per document and model
CREATE TABLE IF NOT EXISTS embeddings (
    doc_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    model TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (doc_id, model)
);

-- Model metadata for dimension validation
CREATE TABLE IF NOT EXISTS model_metadata (
    model TEXT PRIMARY KEY,
    dimensions INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    last_used_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_embeddings_model ON embeddings(model);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

impl VectorStore {
    /// Open (or create) the store inside `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let path = dir.join(STORE_FILE_NAME);
        let conn = Connection::open(&path)?;
        let store = Self {
            conn,
            path: Some(path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.initialize()?;
        Ok(store)
    }

    /// Path of the SQLite file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;

        self.migrate()?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?.unwrap_or(0);

        if current < 2 {
            self.migrate_to_v2()?;
        }

        Ok(())
    }

    /// v1 keyed `embeddings` by `doc_id` alone; rebuild it keyed by (doc, model)
    fn migrate_to_v2(&self) -> Result<()> {
        let key_columns: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('embeddings') WHERE pk > 0",
            [],
            |row| row.get(0),
        )?;

        if key_columns == 1 {
            self.conn.execute_batch(
                "BEGIN;
                 ALTER TABLE embeddings RENAME TO embeddings_v1;
                 CREATE TABLE embeddings (
                     doc_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                     model TEXT NOT NULL,
                     embedding BLOB NOT NULL,
                     created_at TEXT NOT NULL,
                     PRIMARY KEY (doc_id, model)
                 );
                 INSERT INTO embeddings (doc_id, model, embedding, created_at)
                     SELECT doc_id, model, embedding, created_at FROM embeddings_v1;
                 DROP TABLE embeddings_v1;
                 CREATE INDEX IF NOT EXISTS idx_embeddings_model ON embeddings(model);
                 COMMIT;",
            )?;
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![2],
        )?;

        Ok(())
    }

    /// Current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self.conn.query_row(
            "SELECT MAX(version) FROM schema_version",
            [],
            |row| row.get::<_, Option<i32>>(0),
        )?;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("vector_store");
        let store = VectorStore::open(&store_dir).unwrap();

        assert!(store_dir.join(STORE_FILE_NAME).is_file());
        assert_eq!(store.path(), Some(store_dir.join(STORE_FILE_NAME).as_path()));
        assert_eq!(store.schema_version().unwrap(), Some(SCHEMA_VERSION));

        // reopening is harmless
        drop(store);
        let store = VectorStore::open(&store_dir).unwrap();
        assert_eq!(store.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_migrates_v1_embeddings_table() {
        let store = VectorStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "DROP TABLE embeddings;
                 CREATE TABLE embeddings (
                     doc_id TEXT PRIMARY KEY REFERENCES documents(id) ON DELETE CASCADE,
                     model TEXT NOT NULL,
                     embedding BLOB NOT NULL,
                     created_at TEXT NOT NULL
                 );
                 DELETE FROM schema_version;
                 INSERT INTO schema_version VALUES (1);
                 INSERT INTO documents VALUES ('d1', 'id: 1', '2024-01-01T00:00:00Z');
                 INSERT INTO embeddings VALUES ('d1', 'a', x'0000803f', '2024-01-01T00:00:00Z');",
            )
            .unwrap();
        assert_eq!(store.schema_version().unwrap(), Some(1));

        store.initialize().unwrap();
        assert_eq!(store.schema_version().unwrap(), Some(SCHEMA_VERSION));

        let key_columns: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('embeddings') WHERE pk > 0",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(key_columns, 2);
        assert_eq!(store.all_embeddings("a").unwrap(), vec![("d1".to_string(), vec![1.0])]);
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let store = VectorStore::open_in_memory().unwrap();
        assert!(store.path().is_none());
    }
}
