//! Keeping Matterhorn records in step with their harvested records.

use tracing::{info, warn};

use oaipmh_core::namespaces::MATTERHORN_NAMESPACE;
use oaipmh_core::types::{MatterhornRecord, Record};

use crate::error::MatterhornError;
use crate::mediapackage;
use crate::store::MatterhornRecordStore;

/// Result of synchronising one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The Matterhorn record with its current title and description.
    /// Timestamps are as loaded, before any write.
    pub record: MatterhornRecord,
    /// A new row was created.
    pub created: bool,
    /// Title or description changed and were written.
    pub updated: bool,
}

/// Ensure a Matterhorn record exists for `record` and carries the title and
/// description of its media package.
///
/// Records in any other metadata namespace are skipped with `Ok(None)`. The
/// row is written only when an extracted value differs from the stored one.
///
/// A record without a media package is an error. Its Matterhorn row has
/// already been created by then and is left in place.
pub fn ensure_matterhorn_record<S>(
    store: &S,
    record: &Record,
) -> Result<Option<SyncOutcome>, MatterhornError>
where
    S: MatterhornRecordStore + ?Sized,
{
    if record.metadata_format.namespace != MATTERHORN_NAMESPACE {
        info!(
            identifier = %record.identifier,
            namespace = %record.metadata_format.namespace,
            "Not updating record for wrong namespace"
        );
        return Ok(None);
    }

    let (mut row, created) = store.get_or_create(record)?;
    if created {
        info!(identifier = %record.identifier, "Created matterhorn record");
    }

    let fields = mediapackage::extract(&record.identifier, &record.xml)?;

    let updated = row.title != fields.title || row.description != fields.description;
    if updated {
        info!(identifier = %record.identifier, "Updating matterhorn record");
        row.title = fields.title;
        row.description = fields.description;
        store.save(&row)?;
    }

    Ok(Some(SyncOutcome {
        record: row,
        created,
        updated,
    }))
}

/// Counts from a batch synchronisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub processed: usize,
    /// Records in another metadata namespace.
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    /// Matching records whose row already held the extracted values.
    pub unchanged: usize,
    /// Identifiers of records that failed.
    pub failed: Vec<String>,
}

/// Synchronise every record, logging and counting failures instead of
/// stopping at the first one.
pub fn sync_all<S>(store: &S, records: &[Record]) -> SyncSummary
where
    S: MatterhornRecordStore + ?Sized,
{
    let mut summary = SyncSummary::default();

    for record in records {
        summary.processed += 1;
        match ensure_matterhorn_record(store, record) {
            Ok(None) => summary.skipped += 1,
            Ok(Some(outcome)) => {
                if outcome.created {
                    summary.created += 1;
                }
                if outcome.updated {
                    summary.updated += 1;
                }
                if !outcome.created && !outcome.updated {
                    summary.unchanged += 1;
                }
            }
            Err(e) => {
                warn!(identifier = %record.identifier, error = %e, "Matterhorn sync failed");
                summary.failed.push(record.identifier.clone());
            }
        }
    }

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        created = summary.created,
        updated = summary.updated,
        failed = summary.failed.len(),
        "Matterhorn sync finished"
    );
    summary
}
