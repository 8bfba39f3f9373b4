//! Matterhorn record synchronisation.
//!
//! Extracts the title and description of an Opencast media package from a
//! harvested OAI-PMH record and keeps the derived `MatterhornRecord` row in
//! step with it, writing only when the extracted values change.

pub mod error;
pub mod header;
pub mod mediapackage;
pub mod store;
pub mod sync;

pub use error::MatterhornError;
pub use mediapackage::MediaPackageFields;
pub use store::MatterhornRecordStore;
pub use sync::{ensure_matterhorn_record, sync_all, SyncOutcome, SyncSummary};
