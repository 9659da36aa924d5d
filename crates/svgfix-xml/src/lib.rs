//! svgfix-xml: XML reader and writer for svgfix documents (sans-IO).
//!
//! Parses SVG text into the [`svgfix_pipeline::Document`] tree with
//! namespaces resolved, and serializes it back with only the namespaces
//! that are still in use declared. Operates on strings; reading and
//! writing files is left to the caller.

pub mod error;
pub mod read;
pub mod write;

pub use error::XmlError;
pub use read::parse_document;
pub use write::write_document;
