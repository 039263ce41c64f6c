//! SQLite access to the `hadiths` table.
//!
//! - Fails at open time when the database file or a required column is missing.
//! - Reads key columns as untyped values so integer and text keys both round-trip.
//! - Writes a whole batch inside one transaction on a single connection.

use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::processing::ProcessedRecord;

/// Columns the batch reads or writes
pub const REQUIRED_COLUMNS: &[&str] = &[
    "bookId", "num", "text", "text_en", "chain", "body", "body_en", "chain_en",
];

/// Configuration for record selection and write-back
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum records per batch; `None` selects every matching row
    pub limit: Option<usize>,
    /// Only touch rows that already carry an English chain
    pub require_english_chain: bool,
    /// Only select rows whose chain has not been written yet
    pub unprocessed_only: bool,
    /// Roll the write transaction back instead of committing
    pub dry_run: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            limit: Some(10),
            require_english_chain: true,
            unprocessed_only: false,
            dry_run: false,
        }
    }
}

/// Natural key of a record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordKey {
    pub book_id: Value,
    pub num: Value,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", display_value(&self.book_id), display_value(&self.num))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Raw record as stored
#[derive(Debug, Clone, PartialEq)]
pub struct HadithRecord {
    pub key: RecordKey,
    pub text: Option<String>,
    pub text_en: Option<String>,
}

/// Single-writer store over one SQLite connection
pub struct HadithStore {
    db: Connection,
    config: StoreConfig,
}

impl HadithStore {
    /// Open an existing database and check the `hadiths` schema
    pub fn open(db_path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = db_path.as_ref();
        if !path.exists() {
            bail!("Database file not found at {}", path.display());
        }

        let db = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self { db, config };
        store.check_schema()?;

        info!("Opened hadith store at {}", path.display());
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn check_schema(&self) -> Result<()> {
        let mut stmt = self.db.prepare("SELECT name FROM pragma_table_info('hadiths')")?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<_>>()?;

        if columns.is_empty() {
            bail!("Table 'hadiths' does not exist");
        }
        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                bail!("Table 'hadiths' is missing column '{}'", required);
            }
        }
        Ok(())
    }

    fn selection_clause(&self) -> String {
        let mut conditions = Vec::new();
        if self.config.require_english_chain {
            conditions.push("chain_en IS NOT NULL");
        }
        if self.config.unprocessed_only {
            conditions.push("chain IS NULL");
        }
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    /// Fetch the next batch in retrieval order
    ///
    /// Rows whose key columns are NULL are malformed. They are skipped with a
    /// warning unless `fail_fast` is set, in which case the batch aborts.
    pub fn fetch_batch(&self, fail_fast: bool) -> Result<Vec<HadithRecord>> {
        let mut sql = format!(
            "SELECT bookId, num, text, text_en FROM hadiths{} ORDER BY rowid",
            self.selection_clause()
        );
        if let Some(limit) = self.config.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        debug!("Fetching batch: {}", sql);

        let mut stmt = self.db.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(HadithRecord {
                key: RecordKey {
                    book_id: row.get(0)?,
                    num: row.get(1)?,
                },
                text: row.get(2)?,
                text_en: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            let record = row.context("Failed to read hadith row")?;
            if record.key.book_id == Value::Null || record.key.num == Value::Null {
                if fail_fast {
                    bail!("Malformed record with missing key: {}", record.key);
                }
                warn!("Skipping malformed record with missing key: {}", record.key);
                continue;
            }
            records.push(record);
        }

        info!("Fetched {} records", records.len());
        Ok(records)
    }

    /// Write processed records back in one transaction
    ///
    /// Returns the number of rows changed. In dry-run mode the transaction is
    /// rolled back and the count reflects what would have changed.
    pub fn apply_updates(&mut self, processed: &[ProcessedRecord]) -> Result<usize> {
        let mut sql = String::from(
            "UPDATE hadiths SET body_en=?1, text_en=?2, text=?3, chain=?4, body=?5 \
             WHERE bookId=?6 AND num=?7",
        );
        if self.config.require_english_chain {
            sql.push_str(" AND chain_en IS NOT NULL");
        }

        let tx = self.db.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in processed {
                let values = [
                    Value::Text(record.body_en.clone()),
                    Value::Text(record.text_en.clone()),
                    Value::Text(record.text.clone()),
                    Value::Text(record.segmentation.chain.clone()),
                    Value::Text(record.segmentation.body.clone()),
                    record.key.book_id.clone(),
                    record.key.num.clone(),
                ];
                let changed = stmt
                    .execute(params_from_iter(values.iter()))
                    .with_context(|| format!("Failed to update hadith {}", record.key))?;
                debug!("Processed hadith {} ({} rows)", record.key, changed);
                updated += changed;
            }
        }

        if self.config.dry_run {
            tx.rollback()?;
            info!("Dry run: rolled back {} updates", updated);
        } else {
            tx.commit()?;
            info!("Committed {} updates", updated);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isnad::ChainSegmenter;
    use crate::processing::process_record;
    use tempfile::TempDir;

    fn create_db(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("hadiths.db");
        let db = Connection::open(&path).unwrap();
        db.execute_batch(
            r#"
            CREATE TABLE hadiths (
                bookId   INTEGER NOT NULL,
                num      TEXT NOT NULL,
                text     TEXT,
                text_en  TEXT,
                chain    TEXT,
                body     TEXT,
                body_en  TEXT,
                chain_en TEXT,
                PRIMARY KEY (bookId, num)
            );
            INSERT INTO hadiths (bookId, num, text, text_en, chain_en) VALUES
                (1, '1', 'أخبرنا مالك عن نافع عن النبي قال كذا', '"The Prophet said so"', 'Malik from Nafi'),
                (1, '2', 'قال صدق', 'He said: true', NULL),
                (2, '1a', NULL, NULL, 'x');
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = HadithStore::open(temp_dir.path().join("missing.db"), StoreConfig::default());
        let err = result.err().expect("missing database should fail");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_open_missing_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.db");
        let db = Connection::open(&path).unwrap();
        db.execute_batch("CREATE TABLE hadiths (bookId INTEGER, num TEXT, text TEXT);")
            .unwrap();
        drop(db);

        let err = HadithStore::open(&path, StoreConfig::default()).err().unwrap();
        assert!(err.to_string().contains("missing column 'text_en'"));
    }

    #[test]
    fn test_open_missing_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.db");
        let db = Connection::open(&path).unwrap();
        db.execute_batch("CREATE TABLE narrators (id INTEGER);").unwrap();
        drop(db);

        let err = HadithStore::open(&path, StoreConfig::default()).err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_fetch_respects_english_chain_filter() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_db(temp_dir.path());

        let store = HadithStore::open(&path, StoreConfig::default()).unwrap();
        let records = store.fetch_batch(false).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key.to_string(), "1:1");
        assert_eq!(records[1].key.to_string(), "2:1a");
        assert_eq!(records[1].text, None);

        let config = StoreConfig { require_english_chain: false, ..Default::default() };
        let store = HadithStore::open(&path, config).unwrap();
        assert_eq!(store.fetch_batch(false).unwrap().len(), 3);
    }

    #[test]
    fn test_fetch_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_db(temp_dir.path());

        let config = StoreConfig { limit: Some(1), require_english_chain: false, ..Default::default() };
        let store = HadithStore::open(&path, config).unwrap();
        assert_eq!(store.fetch_batch(false).unwrap().len(), 1);
    }

    #[test]
    fn test_apply_updates_and_unprocessed_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_db(temp_dir.path());
        let segmenter = ChainSegmenter::with_default_rules().unwrap();

        let mut store = HadithStore::open(&path, StoreConfig::default()).unwrap();
        let processed: Vec<_> = store
            .fetch_batch(false)
            .unwrap()
            .iter()
            .map(|r| process_record(&segmenter, r))
            .collect();
        assert_eq!(store.apply_updates(&processed).unwrap(), 2);

        let (chain, body, body_en): (String, String, String) = store
            .db
            .query_row(
                "SELECT chain, body, body_en FROM hadiths WHERE bookId=1 AND num='1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(chain, "أخبرنا مالك عن نافع");
        assert_eq!(body, "عن النبي قال كذا");
        assert_eq!(body_en, "The Prophet said so");

        let config = StoreConfig { unprocessed_only: true, require_english_chain: false, ..Default::default() };
        let store = HadithStore::open(&path, config).unwrap();
        let remaining = store.fetch_batch(false).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].key.to_string(), "1:2");
    }

    #[test]
    fn test_dry_run_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_db(temp_dir.path());
        let segmenter = ChainSegmenter::with_default_rules().unwrap();

        let config = StoreConfig { dry_run: true, ..Default::default() };
        let mut store = HadithStore::open(&path, config).unwrap();
        let processed: Vec<_> = store
            .fetch_batch(false)
            .unwrap()
            .iter()
            .map(|r| process_record(&segmenter, r))
            .collect();
        assert_eq!(store.apply_updates(&processed).unwrap(), 2);

        let written: i64 = store
            .db
            .query_row("SELECT COUNT(*) FROM hadiths WHERE chain IS NOT NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(written, 0);
    }

    #[test]
    fn test_fetch_malformed_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("loose.db");
        let db = Connection::open(&path).unwrap();
        db.execute_batch(
            r#"
            CREATE TABLE hadiths (bookId INTEGER, num TEXT, text TEXT, text_en TEXT,
                                  chain TEXT, body TEXT, body_en TEXT, chain_en TEXT);
            INSERT INTO hadiths (bookId, num, text, chain_en) VALUES (NULL, '1', 'قال', 'x');
            INSERT INTO hadiths (bookId, num, text, chain_en) VALUES (3, '4', 'قال', 'x');
            "#,
        )
        .unwrap();
        drop(db);

        let store = HadithStore::open(&path, StoreConfig::default()).unwrap();
        assert_eq!(store.fetch_batch(false).unwrap().len(), 1);
        assert!(store.fetch_batch(true).is_err());
    }
}
