//! Errors raised while reading or writing XML.

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;

/// Errors that can occur while reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The tokenizer rejected the input.
    #[error("malformed XML at byte {position}: {source}")]
    Malformed {
        /// Byte offset of the error in the input.
        position: u64,
        /// The underlying tokenizer error.
        source: quick_xml::Error,
    },

    /// An attribute could not be parsed (duplicate, missing quotes, ...).
    #[error("invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    /// A name, value, or text run is not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// An entity or character reference could not be resolved.
    #[error("invalid reference: {0}")]
    Escape(#[from] EscapeError),

    /// An element or attribute uses a prefix with no `xmlns:` binding.
    #[error("namespace prefix '{prefix}' is not declared")]
    UnboundPrefix {
        /// The undeclared prefix.
        prefix: String,
    },

    /// A closing tag with no open element.
    #[error("unexpected closing tag </{name}>")]
    UnexpectedEnd {
        /// The closing tag's name as written.
        name: String,
    },

    /// The input ended inside an element.
    #[error("element <{name}> is never closed")]
    Unclosed {
        /// The innermost open element's name.
        name: String,
    },

    /// The input contains no element.
    #[error("document has no root element")]
    NoRoot,

    /// A second top-level element follows the root.
    #[error("document has more than one root element")]
    MultipleRoots,

    /// The serializer failed.
    #[error("failed to write XML: {0}")]
    Write(String),
}
