use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::namespaces::{MATTERHORN_NAMESPACE, MATTERHORN_PREFIX, MATTERHORN_SCHEMA};

// =============================================================================
// Harvested records
// =============================================================================

/// A metadata format advertised by an OAI-PMH repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFormat {
    /// Metadata prefix, e.g. `matterhorn`.
    pub prefix: String,
    /// Namespace URI identifying the XML schema of the format.
    pub namespace: String,
    /// Schema location URI.
    pub schema: String,
}

impl MetadataFormat {
    /// The Matterhorn (Opencast) media package format.
    pub fn matterhorn() -> Self {
        Self {
            prefix: MATTERHORN_PREFIX.to_string(),
            namespace: MATTERHORN_NAMESPACE.to_string(),
            schema: MATTERHORN_SCHEMA.to_string(),
        }
    }
}

/// A harvested OAI-PMH record. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable OAI identifier.
    pub identifier: String,
    pub metadata_format: MetadataFormat,
    /// Last modification datestamp from the record header (`header/datestamp`).
    pub datestamp: DateTime<Utc>,
    /// Raw XML of the `record` element.
    pub xml: String,
}

// =============================================================================
// Derived records
// =============================================================================

/// Title and description extracted from a Matterhorn record's media package.
///
/// At most one exists per [`Record`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatterhornRecord {
    /// Database row id.
    pub id: i64,
    /// Identifier of the owning [`Record`].
    pub record_identifier: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
