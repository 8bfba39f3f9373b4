//! Repository implementations for SQLite-backed persistence.
//!
//! Provides MetadataFormatRepository, RecordRepository and
//! MatterhornRecordRepository that operate on the Database struct using
//! raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use oaipmh_core::error::OaiError;
use oaipmh_core::types::{MatterhornRecord, MetadataFormat, Record};

use crate::db::Database;

/// Repository for advertised metadata formats.
pub struct MetadataFormatRepository {
    db: Arc<Database>,
}

impl MetadataFormatRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a format, or update namespace and schema of an existing prefix.
    pub fn save(&self, format: &MetadataFormat) -> Result<(), OaiError> {
        self.db.with_conn(|conn| upsert_format(conn, format))
    }

    /// Find a format by its metadata prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Option<MetadataFormat>, OaiError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT prefix, namespace, schema_location FROM metadata_formats WHERE prefix = ?1",
                rusqlite::params![prefix],
                |row| {
                    Ok(MetadataFormat {
                        prefix: row.get(0)?,
                        namespace: row.get(1)?,
                        schema: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|e| OaiError::Storage(e.to_string()))
        })
    }
}

/// Repository for harvested records.
pub struct RecordRepository {
    db: Arc<Database>,
}

impl RecordRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a record, replacing any previous version with the same
    /// identifier. Its metadata format is registered as well.
    pub fn save(&self, record: &Record) -> Result<(), OaiError> {
        self.db.with_conn(|conn| {
            upsert_format(conn, &record.metadata_format)?;
            conn.execute(
                "INSERT INTO records (identifier, metadata_prefix, datestamp, xml, harvested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (identifier) DO UPDATE SET
                    metadata_prefix = excluded.metadata_prefix,
                    datestamp = excluded.datestamp,
                    xml = excluded.xml,
                    harvested_at = excluded.harvested_at",
                rusqlite::params![
                    record.identifier,
                    record.metadata_format.prefix,
                    record.datestamp.timestamp(),
                    record.xml,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(|e| OaiError::Storage(format!("Failed to save record: {}", e)))?;
            debug!(identifier = %record.identifier, "Record stored");
            Ok(())
        })
    }

    /// Find a record by its OAI identifier.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<Record>, OaiError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE r.identifier = ?1", RECORD_SELECT),
                rusqlite::params![identifier],
                row_to_record,
            )
            .optional()
            .map_err(|e| OaiError::Storage(e.to_string()))
        })
    }

    /// All stored records, ordered by identifier.
    pub fn list(&self) -> Result<Vec<Record>, OaiError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} ORDER BY r.identifier ASC", RECORD_SELECT))
                .map_err(|e| OaiError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], row_to_record)
                .map_err(|e| OaiError::Storage(e.to_string()))?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(|e| OaiError::Storage(e.to_string()))?);
            }
            Ok(out)
        })
    }

    /// Count stored records.
    pub fn count(&self) -> Result<u64, OaiError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
                .map_err(|e| OaiError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

/// Repository for Matterhorn records derived from harvested records.
pub struct MatterhornRecordRepository {
    db: Arc<Database>,
}

impl MatterhornRecordRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fetch the Matterhorn record for a record identifier, inserting an
    /// empty one if none exists. The flag is `true` when a row was inserted.
    ///
    /// Fails if no record with that identifier is stored.
    pub fn get_or_create(
        &self,
        record_identifier: &str,
    ) -> Result<(MatterhornRecord, bool), OaiError> {
        self.db.with_conn(|conn| {
            let now = Utc::now().timestamp();
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO matterhorn_records (record_identifier, created_at, updated_at)
                     VALUES (?1, ?2, ?2)",
                    rusqlite::params![record_identifier, now],
                )
                .map_err(|e| {
                    OaiError::Storage(format!("Failed to create matterhorn record: {}", e))
                })?;

            let row = conn
                .query_row(
                    &format!("{} WHERE record_identifier = ?1", MATTERHORN_SELECT),
                    rusqlite::params![record_identifier],
                    row_to_matterhorn_record,
                )
                .map_err(|e| OaiError::Storage(e.to_string()))?;

            Ok((row, inserted == 1))
        })
    }

    /// Persist the title and description of an existing row and bump
    /// its `updated_at`.
    pub fn save(&self, record: &MatterhornRecord) -> Result<(), OaiError> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE matterhorn_records
                     SET title = ?1, description = ?2, updated_at = ?3
                     WHERE id = ?4",
                    rusqlite::params![
                        record.title,
                        record.description,
                        Utc::now().timestamp(),
                        record.id,
                    ],
                )
                .map_err(|e| {
                    OaiError::Storage(format!("Failed to save matterhorn record: {}", e))
                })?;

            if changed == 0 {
                return Err(OaiError::NotFound(format!(
                    "matterhorn record {}",
                    record.id
                )));
            }
            Ok(())
        })
    }

    /// Find the Matterhorn record belonging to a record identifier.
    pub fn find_by_record(
        &self,
        record_identifier: &str,
    ) -> Result<Option<MatterhornRecord>, OaiError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE record_identifier = ?1", MATTERHORN_SELECT),
                rusqlite::params![record_identifier],
                row_to_matterhorn_record,
            )
            .optional()
            .map_err(|e| OaiError::Storage(e.to_string()))
        })
    }

    /// All Matterhorn records, ordered by record identifier.
    pub fn list(&self) -> Result<Vec<MatterhornRecord>, OaiError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} ORDER BY record_identifier ASC",
                    MATTERHORN_SELECT
                ))
                .map_err(|e| OaiError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], row_to_matterhorn_record)
                .map_err(|e| OaiError::Storage(e.to_string()))?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(|e| OaiError::Storage(e.to_string()))?);
            }
            Ok(out)
        })
    }

    /// Count Matterhorn records.
    pub fn count(&self) -> Result<u64, OaiError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM matterhorn_records", [], |row| {
                    row.get(0)
                })
                .map_err(|e| OaiError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

// ============================================================================
// Helper functions for row-to-entity conversion.
// ============================================================================

const RECORD_SELECT: &str = "SELECT r.identifier, r.datestamp, r.xml,
        f.prefix, f.namespace, f.schema_location
     FROM records r
     JOIN metadata_formats f ON f.prefix = r.metadata_prefix";

const MATTERHORN_SELECT: &str = "SELECT id, record_identifier, title, description, created_at, updated_at
     FROM matterhorn_records";

fn upsert_format(conn: &Connection, format: &MetadataFormat) -> Result<(), OaiError> {
    conn.execute(
        "INSERT INTO metadata_formats (prefix, namespace, schema_location)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (prefix) DO UPDATE SET
            namespace = excluded.namespace,
            schema_location = excluded.schema_location",
        rusqlite::params![format.prefix, format.namespace, format.schema],
    )
    .map_err(|e| OaiError::Storage(format!("Failed to save metadata format: {}", e)))?;
    Ok(())
}

fn from_unix(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp {} out of range", secs).into(),
        )
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        identifier: row.get(0)?,
        datestamp: from_unix(row, 1)?,
        xml: row.get(2)?,
        metadata_format: MetadataFormat {
            prefix: row.get(3)?,
            namespace: row.get(4)?,
            schema: row.get(5)?,
        },
    })
}

fn row_to_matterhorn_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MatterhornRecord> {
    Ok(MatterhornRecord {
        id: row.get(0)?,
        record_identifier: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        created_at: from_unix(row, 4)?,
        updated_at: from_unix(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_db() -> Arc<Database> {
        Arc::new(Database::in_memory().unwrap())
    }

    fn make_record(identifier: &str) -> Record {
        Record {
            identifier: identifier.to_string(),
            metadata_format: MetadataFormat::matterhorn(),
            datestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            xml: "<record/>".to_string(),
        }
    }

    #[test]
    fn test_format_save_and_find() {
        let repo = MetadataFormatRepository::new(make_db());
        let format = MetadataFormat {
            prefix: "oai_dc".to_string(),
            namespace: "http://www.openarchives.org/OAI/2.0/oai_dc/".to_string(),
            schema: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd".to_string(),
        };
        repo.save(&format).unwrap();

        assert_eq!(repo.find_by_prefix("oai_dc").unwrap(), Some(format));
        assert_eq!(repo.find_by_prefix("missing").unwrap(), None);
    }

    #[test]
    fn test_format_save_updates_namespace() {
        let repo = MetadataFormatRepository::new(make_db());
        let mut format = MetadataFormat::matterhorn();
        repo.save(&format).unwrap();

        format.namespace = "urn:changed".to_string();
        repo.save(&format).unwrap();

        let found = repo.find_by_prefix("matterhorn").unwrap().unwrap();
        assert_eq!(found.namespace, "urn:changed");
    }

    #[test]
    fn test_record_save_and_find() {
        let db = make_db();
        let repo = RecordRepository::new(Arc::clone(&db));
        let record = make_record("oai:example:1");
        repo.save(&record).unwrap();

        let found = repo.find_by_identifier("oai:example:1").unwrap().unwrap();
        assert_eq!(found, record);
        assert!(repo.find_by_identifier("oai:example:2").unwrap().is_none());

        // The format was registered alongside the record.
        let formats = MetadataFormatRepository::new(db);
        assert!(formats.find_by_prefix("matterhorn").unwrap().is_some());
    }

    #[test]
    fn test_record_save_replaces_xml() {
        let repo = RecordRepository::new(make_db());
        let mut record = make_record("oai:example:1");
        repo.save(&record).unwrap();

        record.xml = "<record><header/></record>".to_string();
        repo.save(&record).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let found = repo.find_by_identifier("oai:example:1").unwrap().unwrap();
        assert_eq!(found.xml, "<record><header/></record>");
    }

    #[test]
    fn test_out_of_range_datestamp_is_an_error() {
        let db = make_db();
        let repo = RecordRepository::new(Arc::clone(&db));
        repo.save(&make_record("oai:example:1")).unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE records SET datestamp = ?1 WHERE identifier = 'oai:example:1'",
                rusqlite::params![i64::MAX],
            )
            .map_err(|e| OaiError::Storage(e.to_string()))?;
            Ok(())
        })
        .unwrap();

        let result = repo.find_by_identifier("oai:example:1");
        match result {
            Err(OaiError::Storage(msg)) => assert!(msg.contains("out of range"), "{}", msg),
            other => panic!("expected storage error, got {:?}", other),
        }
    }

    #[test]
    fn test_record_list_ordered() {
        let repo = RecordRepository::new(make_db());
        repo.save(&make_record("oai:b")).unwrap();
        repo.save(&make_record("oai:a")).unwrap();

        let ids: Vec<String> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        assert_eq!(ids, vec!["oai:a", "oai:b"]);
    }

    #[test]
    fn test_get_or_create_creates_once() {
        let db = make_db();
        RecordRepository::new(Arc::clone(&db))
            .save(&make_record("oai:1"))
            .unwrap();
        let repo = MatterhornRecordRepository::new(db);

        let (first, created) = repo.get_or_create("oai:1").unwrap();
        assert!(created);
        assert_eq!(first.record_identifier, "oai:1");
        assert_eq!(first.title, "");
        assert_eq!(first.description, "");

        let (second, created) = repo.get_or_create("oai:1").unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_or_create_requires_record() {
        let repo = MatterhornRecordRepository::new(make_db());
        let result = repo.get_or_create("oai:unknown");
        assert!(matches!(result, Err(OaiError::Storage(_))));
    }

    #[test]
    fn test_save_updates_fields() {
        let db = make_db();
        RecordRepository::new(Arc::clone(&db))
            .save(&make_record("oai:1"))
            .unwrap();
        let repo = MatterhornRecordRepository::new(db);

        let (mut row, _) = repo.get_or_create("oai:1").unwrap();
        row.title = "Lecture 1".to_string();
        row.description = "Introduction".to_string();
        repo.save(&row).unwrap();

        let found = repo.find_by_record("oai:1").unwrap().unwrap();
        assert_eq!(found.title, "Lecture 1");
        assert_eq!(found.description, "Introduction");
        assert!(found.updated_at >= found.created_at);
    }

    #[test]
    fn test_save_missing_row_is_not_found() {
        let repo = MatterhornRecordRepository::new(make_db());
        let now = Utc::now();
        let row = MatterhornRecord {
            id: 42,
            record_identifier: "oai:1".to_string(),
            title: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(repo.save(&row), Err(OaiError::NotFound(_))));
    }

    #[test]
    fn test_list_matterhorn_records() {
        let db = make_db();
        let records = RecordRepository::new(Arc::clone(&db));
        records.save(&make_record("oai:2")).unwrap();
        records.save(&make_record("oai:1")).unwrap();
        let repo = MatterhornRecordRepository::new(db);
        repo.get_or_create("oai:2").unwrap();
        repo.get_or_create("oai:1").unwrap();

        let ids: Vec<String> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.record_identifier)
            .collect();
        assert_eq!(ids, vec!["oai:1", "oai:2"]);
    }
}
