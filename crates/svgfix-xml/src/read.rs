//! Parse XML text into a [`Document`] tree.
//!
//! Names are resolved against the `xmlns` declarations in scope, so the
//! tree holds namespace URIs rather than prefixes. The prefixes the input
//! declared are kept in [`Document::namespaces`] for the writer.
//! Comments, processing instructions, and the doctype are dropped.
//!
//! Whitespace-only runs between tags are indentation and are dropped,
//! except where `xml:space="preserve"` is in scope.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use svgfix_pipeline::names::attr;
use svgfix_pipeline::{Document, Element, Ns, QName};

use crate::error::XmlError;

const XMLNS: &str = "xmlns";
const PRESERVE: &str = "preserve";

/// Bindings declared on one open element: prefix -> URI.
type Scope = Vec<(String, String)>;

/// Parse `input` into a document.
///
/// # Errors
///
/// Returns [`XmlError::Malformed`] for tokenizer errors (mismatched tags,
/// bad syntax), [`XmlError::UnboundPrefix`] for undeclared prefixes, and
/// [`XmlError::NoRoot`] / [`XmlError::MultipleRoots`] /
/// [`XmlError::Unclosed`] for documents without exactly one complete root.
pub fn parse_document(input: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(input);
    let mut tree = TreeBuilder::default();

    loop {
        let event = reader.read_event().map_err(|source| XmlError::Malformed {
            position: reader.error_position(),
            source,
        })?;
        match event {
            Event::Start(start) => tree.open(&start)?,
            Event::Empty(start) => {
                tree.open(&start)?;
                tree.close(&start_name(&start)?)?;
            }
            Event::End(end) => tree.close(std::str::from_utf8(end.name().as_ref())?)?,
            Event::Text(text) => tree.text(std::str::from_utf8(&text)?),
            Event::CData(data) => tree.text(std::str::from_utf8(&data)?),
            Event::GeneralRef(reference) => {
                let name = std::str::from_utf8(&reference)?;
                let entity = format!("&{name};");
                let resolved = quick_xml::escape::unescape(&entity)?;
                tree.text(&resolved);
            }
            Event::Eof => break,
            // Declaration, doctype, comments, processing instructions.
            _ => {}
        }
    }

    tree.finish()
}

fn start_name(start: &BytesStart<'_>) -> Result<String, XmlError> {
    Ok(std::str::from_utf8(start.name().as_ref())?.to_owned())
}

/// Split `prefix:local`; unprefixed names get an empty prefix.
fn split_name(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or(("", name))
}

#[derive(Debug, Default)]
struct TreeBuilder {
    open: Vec<Element>,
    scopes: Vec<Scope>,
    /// Whether `xml:space="preserve"` applies, per open element.
    preserve: Vec<bool>,
    root: Option<Element>,
    namespaces: IndexMap<String, String>,
    /// Character data since the last tag.
    pending: String,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart<'_>) -> Result<(), XmlError> {
        self.flush_text();
        let mut scope = Scope::new();
        let mut plain = Vec::new();

        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = std::str::from_utf8(attribute.key.as_ref())?;
            let raw = std::str::from_utf8(&attribute.value)?;
            let value = quick_xml::escape::unescape(raw)?.into_owned();

            if key == XMLNS {
                scope.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.push((prefix.to_owned(), value));
            } else {
                plain.push((key.to_owned(), value));
            }
        }

        for (prefix, uri) in &scope {
            if !uri.is_empty() {
                self.namespaces
                    .entry(prefix.clone())
                    .or_insert_with(|| uri.clone());
            }
        }
        self.scopes.push(scope);

        let name = start_name(start)?;
        let (prefix, local) = split_name(&name);
        let namespace = self.resolve(prefix)?;
        let mut element = Element::new(QName::new(namespace, local));

        for (key, value) in plain {
            let (prefix, local) = split_name(&key);
            let namespace = if prefix.is_empty() {
                None
            } else {
                self.resolve(prefix)?
            };
            element.attributes.insert(QName::new(namespace, local), value);
        }

        let preserve = match element.attr(&attr::SPACE) {
            Some(space) => space == PRESERVE,
            None => self.preserving(),
        };
        self.preserve.push(preserve);
        self.open.push(element);
        Ok(())
    }

    fn preserving(&self) -> bool {
        self.preserve.last().copied().unwrap_or(false)
    }

    /// Resolve `prefix` against the open scopes, innermost first.
    ///
    /// The empty prefix resolves to the default namespace, or to no
    /// namespace when none is declared (or it was undeclared with
    /// `xmlns=""`).
    fn resolve(&self, prefix: &str) -> Result<Option<String>, XmlError> {
        if prefix == "xml" {
            return Ok(Some(Ns::Xml.uri().to_owned()));
        }
        let bound = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str());

        match bound {
            Some("") | None if prefix.is_empty() => Ok(None),
            Some(uri) if !uri.is_empty() => Ok(Some(uri.to_owned())),
            _ => Err(XmlError::UnboundPrefix {
                prefix: prefix.to_owned(),
            }),
        }
    }

    fn close(&mut self, name: &str) -> Result<(), XmlError> {
        self.flush_text();
        let Some(element) = self.open.pop() else {
            return Err(XmlError::UnexpectedEnd {
                name: name.to_owned(),
            });
        };
        self.scopes.pop();
        self.preserve.pop();

        match self.open.last_mut() {
            Some(parent) => parent.push(element),
            None if self.root.is_some() => return Err(XmlError::MultipleRoots),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn text(&mut self, content: &str) {
        self.pending.push_str(content);
    }

    /// Move the pending run into the tree: into the innermost open
    /// element's text before its first child, else into the tail of its
    /// last child. Text outside the root is dropped.
    fn flush_text(&mut self) {
        let run = std::mem::take(&mut self.pending);
        if run.is_empty() || (run.trim().is_empty() && !self.preserving()) {
            return;
        }
        let Some(element) = self.open.last_mut() else {
            return;
        };
        let slot = match element.children.last_mut() {
            Some(child) => &mut child.tail,
            None => &mut element.text,
        };
        slot.get_or_insert_with(String::new).push_str(&run);
    }

    fn finish(self) -> Result<Document, XmlError> {
        if let Some(element) = self.open.last() {
            return Err(XmlError::Unclosed {
                name: element.name.local_name().to_owned(),
            });
        }
        let root = self.root.ok_or(XmlError::NoRoot)?;
        Ok(Document::new(root, self.namespaces))
    }
}
