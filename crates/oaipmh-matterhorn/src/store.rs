use oaipmh_core::types::{MatterhornRecord, Record};
use oaipmh_storage::MatterhornRecordRepository;

use crate::error::MatterhornError;

/// Persistence needed by the synchroniser.
pub trait MatterhornRecordStore {
    /// Fetch the Matterhorn record belonging to `record`, creating an empty
    /// one if absent. Returns `true` alongside it when a row was created.
    fn get_or_create(&self, record: &Record) -> Result<(MatterhornRecord, bool), MatterhornError>;

    /// Write the title and description of an existing Matterhorn record.
    fn save(&self, record: &MatterhornRecord) -> Result<(), MatterhornError>;
}

impl MatterhornRecordStore for MatterhornRecordRepository {
    fn get_or_create(&self, record: &Record) -> Result<(MatterhornRecord, bool), MatterhornError> {
        Ok(MatterhornRecordRepository::get_or_create(
            self,
            &record.identifier,
        )?)
    }

    fn save(&self, record: &MatterhornRecord) -> Result<(), MatterhornError> {
        Ok(MatterhornRecordRepository::save(self, record)?)
    }
}
