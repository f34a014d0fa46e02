//! Link-format serialization of a node's resource set.
//!
//! Output shape: `</path>;attrs,</other>` in the order the resources were
//! given.  The document is rebuilt for every registration attempt because the
//! resource set may have changed in between.

use std::fmt;

use crate::error::ProtocolError;

/// Default ceiling for a registration payload.
pub const DEFAULT_MAX_PAYLOAD: usize = 256;

/// One entry of the node's resource table as seen by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Resource path without the leading `/` (e.g. `actuators/toggle`).
    pub path: String,
    /// Raw link attributes (e.g. `title="Toggle";rt="Control"`).
    pub attributes: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(path: impl Into<String>, attributes: Option<&str>) -> Self {
        Self {
            path: path.into(),
            attributes: attributes.map(str::to_string),
        }
    }

    /// Attributes, with an empty string treated as absent.
    pub fn attributes(&self) -> Option<&str> {
        self.attributes.as_deref().filter(|a| !a.is_empty())
    }
}

/// A serialized link-format document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkFormatDocument(String);

impl LinkFormatDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LinkFormatDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize `resources` into a link-format document of at most `max_len`
/// bytes.
///
/// Every fragment is size-checked before it is appended; a document that
/// would not fit yields [`ProtocolError::BufferOverflow`] and nothing else.
pub fn encode<'a, I>(resources: I, max_len: usize) -> Result<LinkFormatDocument, ProtocolError>
where
    I: IntoIterator<Item = &'a ResourceDescriptor>,
{
    let mut doc = String::with_capacity(max_len.min(DEFAULT_MAX_PAYLOAD));

    for (i, resource) in resources.into_iter().enumerate() {
        let path = resource.path.trim_start_matches('/');
        let attrs = resource.attributes();

        // ",</" + path + ">" [+ ";" + attrs]
        let separator = usize::from(i > 0);
        let entry_len = separator + 2 + path.len() + 1 + attrs.map_or(0, |a| 1 + a.len());
        let needed = doc.len() + entry_len;
        if needed > max_len {
            return Err(ProtocolError::BufferOverflow {
                needed,
                capacity: max_len,
            });
        }

        if i > 0 {
            doc.push(',');
        }
        doc.push_str("</");
        doc.push_str(path);
        doc.push('>');
        if let Some(attrs) = attrs {
            doc.push(';');
            doc.push_str(attrs);
        }
    }

    Ok(LinkFormatDocument(doc))
}
