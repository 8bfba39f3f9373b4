//! XML namespace URIs for harvested OAI-PMH records.

/// Namespace of the OAI-PMH envelope (`record`, `header`, `metadata`).
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// Declared namespace of the Matterhorn metadata format.
pub const MATTERHORN_NAMESPACE: &str = "http://www.opencastproject.org/oai/matterhorn";

/// Schema location of the Matterhorn metadata format.
pub const MATTERHORN_SCHEMA: &str = "http://www.opencastproject.org/oai/matterhorn.xsd";

/// Metadata prefix under which Matterhorn records are harvested.
pub const MATTERHORN_PREFIX: &str = "matterhorn";

/// Namespace of the Opencast media package document.
pub const MEDIAPACKAGE_NAMESPACE: &str = "http://mediapackage.opencastproject.org";
