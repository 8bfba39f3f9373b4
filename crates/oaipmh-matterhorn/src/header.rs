//! OAI-PMH record header fields.

use chrono::{DateTime, NaiveDate, Utc};
use roxmltree::Document;

use oaipmh_core::namespaces::OAI_NAMESPACE;

use crate::mediapackage::{child, parsing_options};

/// Read `header/datestamp` from a record's XML.
///
/// Accepts both OAI-PMH granularities, `YYYY-MM-DDThh:mm:ssZ` and
/// `YYYY-MM-DD` (taken as midnight UTC). Returns `None` when the XML does
/// not parse or the datestamp is missing or malformed.
pub fn datestamp(xml: &str) -> Option<DateTime<Utc>> {
    let doc = Document::parse_with_options(xml, parsing_options()).ok()?;
    let text = child(doc.root_element(), OAI_NAMESPACE, "header")
        .and_then(|header| child(header, OAI_NAMESPACE, "datestamp"))
        .and_then(|n| n.text())?;
    parse_datestamp(text.trim())
}

fn parse_datestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record_with_datestamp(datestamp: &str) -> String {
        format!(
            r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
  <header><identifier>oai:example:1</identifier><datestamp>{}</datestamp></header>
  <metadata/>
</record>"#,
            datestamp
        )
    }

    #[test]
    fn test_seconds_granularity() {
        let xml = record_with_datestamp("2023-11-14T22:13:20Z");
        assert_eq!(
            datestamp(&xml),
            Some(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap())
        );
    }

    #[test]
    fn test_day_granularity() {
        let xml = record_with_datestamp(" 2023-11-14 ");
        assert_eq!(
            datestamp(&xml),
            Some(Utc.with_ymd_and_hms(2023, 11, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_datestamp() {
        assert_eq!(datestamp(&record_with_datestamp("yesterday")), None);
    }

    #[test]
    fn test_missing_header() {
        let xml = r#"<record xmlns="http://www.openarchives.org/OAI/2.0/"><metadata/></record>"#;
        assert_eq!(datestamp(xml), None);
        assert_eq!(datestamp("<record>"), None);
    }
}
