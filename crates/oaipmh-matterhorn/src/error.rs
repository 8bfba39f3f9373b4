use thiserror::Error;

use oaipmh_core::error::OaiError;

/// Errors raised while synchronising a Matterhorn record.
#[derive(Error, Debug)]
pub enum MatterhornError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("xml error in record {identifier}: {message}")]
    Parse { identifier: String, message: String },
    #[error("no media package found in record {identifier}")]
    MissingMediaPackage { identifier: String },
}

impl From<OaiError> for MatterhornError {
    fn from(err: OaiError) -> Self {
        MatterhornError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_media_package() {
        let e = MatterhornError::MissingMediaPackage {
            identifier: "oai:example:1".to_string(),
        };
        assert_eq!(e.to_string(), "no media package found in record oai:example:1");
    }

    #[test]
    fn test_error_display_parse() {
        let e = MatterhornError::Parse {
            identifier: "oai:example:1".to_string(),
            message: "unexpected end of stream".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "xml error in record oai:example:1: unexpected end of stream"
        );
    }

    #[test]
    fn test_error_from_oai_error() {
        let e: MatterhornError = OaiError::Storage("db offline".to_string()).into();
        assert!(matches!(e, MatterhornError::Storage(_)));
        assert_eq!(e.to_string(), "storage error: Storage error: db offline");
    }
}
