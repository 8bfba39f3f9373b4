//! Media package field extraction.
//!
//! A Matterhorn record looks like:
//!
//! ```xml
//! <record xmlns="http://www.openarchives.org/OAI/2.0/">
//!   <header>...</header>
//!   <metadata>
//!     <mediapackage xmlns="http://mediapackage.opencastproject.org">
//!       <title>...</title>
//!       <description>...</description>
//!     </mediapackage>
//!   </metadata>
//! </record>
//! ```

use roxmltree::{Document, Node, ParsingOptions};

use oaipmh_core::namespaces::{MEDIAPACKAGE_NAMESPACE, OAI_NAMESPACE};

use crate::error::MatterhornError;

/// Fields copied from a media package onto its Matterhorn record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPackageFields {
    pub title: String,
    pub description: String,
}

/// Parse a record's XML and read the media package title and description.
///
/// The package must sit at `oai:metadata/m:mediapackage` directly below the
/// document element. A missing `title` or `description`, or one without
/// text, yields an empty string. A DOCTYPE declaration is accepted.
pub fn extract(identifier: &str, xml: &str) -> Result<MediaPackageFields, MatterhornError> {
    let doc =
        Document::parse_with_options(xml, parsing_options()).map_err(|e| MatterhornError::Parse {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })?;

    let package = child(doc.root_element(), OAI_NAMESPACE, "metadata")
        .and_then(|metadata| child(metadata, MEDIAPACKAGE_NAMESPACE, "mediapackage"))
        .ok_or_else(|| MatterhornError::MissingMediaPackage {
            identifier: identifier.to_string(),
        })?;

    Ok(MediaPackageFields {
        title: child_text(package, "title"),
        description: child_text(package, "description"),
    })
}

/// Options accepting a DOCTYPE declaration.
pub(crate) fn parsing_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// First child element with the given namespace and local name.
pub(crate) fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| {
        n.is_element()
            && n.tag_name().name() == name
            && n.tag_name().namespace() == Some(namespace)
    })
}

// Leading text of the element only, untrimmed.
fn child_text(package: Node<'_, '_>, name: &str) -> String {
    child(package, MEDIAPACKAGE_NAMESPACE, name)
        .and_then(|n| n.text())
        .unwrap_or_default()
        .to_string()
}
