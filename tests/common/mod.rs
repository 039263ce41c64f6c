// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture holding a temporary SQLite database with a `hadiths` table
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl TestFixture {
    /// Create a new fixture with an empty `hadiths` table
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("hadiths.db");

        let db = Connection::open(&db_path).expect("Failed to create database");
        db.execute_batch(
            r#"
            CREATE TABLE hadiths (
                bookId   INTEGER NOT NULL,
                num      INTEGER NOT NULL,
                text     TEXT,
                text_en  TEXT,
                chain    TEXT,
                body     TEXT,
                body_en  TEXT,
                chain_en TEXT,
                PRIMARY KEY (bookId, num)
            );
            "#,
        )
        .expect("Failed to create hadiths table");

        Self { temp_dir, db_path }
    }

    /// Insert one raw record
    pub fn insert(&self, book_id: i64, num: i64, text: &str, text_en: &str, chain_en: Option<&str>) {
        let db = Connection::open(&self.db_path).expect("Failed to open database");
        db.execute(
            "INSERT INTO hadiths (bookId, num, text, text_en, chain_en) VALUES (?1, ?2, ?3, ?4, ?5)",
            (book_id, num, text, text_en, chain_en),
        )
        .expect("Failed to insert record");
    }

    /// Read back (chain, body, body_en) for one record
    pub fn output_fields(&self, book_id: i64, num: i64) -> (Option<String>, Option<String>, Option<String>) {
        let db = Connection::open(&self.db_path).expect("Failed to open database");
        db.query_row(
            "SELECT chain, body, body_en FROM hadiths WHERE bookId=?1 AND num=?2",
            (book_id, num),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("Failed to read record")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.temp_dir.path().join("run_stats.json")
    }
}
