//! Serialize a [`Document`] tree back to XML text.
//!
//! Namespace declarations are regenerated from scratch on the root
//! element: only namespaces still referenced by some element or attribute
//! are declared, so pruning editor content also drops the editor's
//! `xmlns:` clutter. Prefixes follow the input where possible.

use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use svgfix_pipeline::names::attr;
use svgfix_pipeline::{Document, Element, Ns};

use crate::error::XmlError;

/// Prefix bindings chosen for one output document.
#[derive(Debug, Default, PartialEq, Eq)]
struct Bindings {
    /// URI declared as the default namespace.
    default: Option<String>,
    /// URI -> prefix, in declaration order.
    prefixes: IndexMap<String, String>,
}

impl Bindings {
    /// Choose bindings for every namespace used in `document`.
    ///
    /// The root element's namespace becomes the default. Any other URI,
    /// and the default URI when an attribute needs it, gets a named
    /// prefix: the input's prefix if it had one, else a conventional
    /// prefix, else `ns0`, `ns1`, ...
    fn for_document(document: &Document) -> Self {
        let mut element_uris = IndexSet::new();
        let mut attribute_uris = IndexSet::new();
        document.root.visit(&mut |element| {
            if let Some(uri) = element.name.namespace() {
                element_uris.insert(uri.to_owned());
            }
            for name in element.attributes.keys() {
                if let Some(uri) = name.namespace() {
                    attribute_uris.insert(uri.to_owned());
                }
            }
        });

        let default = document.root.name.namespace().map(str::to_owned);
        let mut bindings = Self {
            default,
            prefixes: IndexMap::new(),
        };
        let mut taken: IndexSet<String> = ["", "xml", "xmlns"].map(str::to_owned).into();

        for uri in element_uris.iter().chain(&attribute_uris) {
            if uri == Ns::Xml.uri() || bindings.prefixes.contains_key(uri) {
                continue;
            }
            let is_default = bindings.default.as_ref() == Some(uri);
            if is_default && !attribute_uris.contains(uri) {
                continue;
            }
            let prefix = choose_prefix(document, uri, &taken);
            taken.insert(prefix.clone());
            bindings.prefixes.insert(uri.clone(), prefix);
        }
        bindings
    }

    fn prefix(&self, uri: &str) -> Option<&str> {
        self.prefixes.get(uri).map(String::as_str)
    }

    /// The name of an element as written, given the default namespace
    /// in scope at its position.
    fn element_name(&self, element: &Element, default_in_scope: Option<&str>) -> String {
        let local = element.name.local_name();
        match element.name.namespace() {
            Some(uri) if Some(uri) == default_in_scope => local.to_owned(),
            Some(uri) if uri == Ns::Xml.uri() => format!("xml:{local}"),
            Some(uri) => match self.prefix(uri) {
                Some(prefix) => format!("{prefix}:{local}"),
                None => local.to_owned(),
            },
            None => local.to_owned(),
        }
    }

    fn attribute_name(&self, name: &svgfix_pipeline::QName) -> String {
        let local = name.local_name();
        match name.namespace() {
            None => local.to_owned(),
            Some(uri) if uri == Ns::Xml.uri() => format!("xml:{local}"),
            Some(uri) => match self.prefix(uri) {
                Some(prefix) => format!("{prefix}:{local}"),
                None => local.to_owned(),
            },
        }
    }
}

fn choose_prefix(document: &Document, uri: &str, taken: &IndexSet<String>) -> String {
    let conventional: &[&str] = Ns::from_uri(uri)
        .map(Ns::preferred_prefixes)
        .unwrap_or_default();

    document
        .prefixes_for(uri)
        .chain(conventional.iter().copied())
        .find(|prefix| !prefix.is_empty() && !taken.contains(*prefix))
        .map_or_else(
            || {
                (0_usize..)
                    .map(|n| format!("ns{n}"))
                    .find(|prefix| !taken.contains(prefix))
                    .unwrap_or_default()
            },
            str::to_owned,
        )
}

fn write_error(error: impl Display) -> XmlError {
    XmlError::Write(error.to_string())
}

/// Indentation unit per nesting level.
const INDENT: &str = "  ";

/// Serialize `document` as indented XML with an XML declaration and a
/// trailing newline.
///
/// Indentation is only added between elements that have no character
/// data around them and are outside any `xml:space="preserve"` scope,
/// so text content reads back unchanged.
///
/// # Errors
///
/// Returns [`XmlError::Write`] if the serializer fails.
pub fn write_document(document: &Document) -> Result<String, XmlError> {
    let bindings = Bindings::for_document(document);
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    write_whitespace(&mut writer, "\n")?;

    let root = Position {
        default_in_scope: None,
        depth: 0,
        inline: false,
        is_root: true,
    };
    write_element(&mut writer, &bindings, &document.root, &root)?;

    let mut out = String::from_utf8(writer.into_inner()).map_err(write_error)?;
    out.push('\n');
    Ok(out)
}

/// Where an element sits in the output.
#[derive(Debug, Clone, Copy)]
struct Position<'a> {
    /// Default namespace declared by an ancestor.
    default_in_scope: Option<&'a str>,
    /// Nesting level, for indentation.
    depth: usize,
    /// Inside mixed content or a preserved-space scope: no indentation.
    inline: bool,
    is_root: bool,
}

/// Whether the children of `element` may be laid out one per line.
fn indents_children(element: &Element, inline: bool) -> bool {
    !inline
        && element.text.is_none()
        && element.children.iter().all(|child| child.tail.is_none())
        && element.attr(&attr::SPACE) != Some("preserve")
}

fn write_whitespace(writer: &mut Writer<Vec<u8>>, whitespace: &str) -> Result<(), XmlError> {
    writer
        .write_event(Event::Text(BytesText::from_escaped(whitespace)))
        .map_err(write_error)
}

fn write_newline(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<(), XmlError> {
    write_whitespace(writer, &format!("\n{}", INDENT.repeat(depth)))
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), XmlError> {
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    bindings: &Bindings,
    element: &Element,
    position: &Position<'_>,
) -> Result<(), XmlError> {
    let default_in_scope = position.default_in_scope;
    let mut declarations: Vec<(String, String)> = Vec::new();
    let mut default_here = default_in_scope;

    if position.is_root {
        if let Some(uri) = &bindings.default {
            declarations.push(("xmlns".to_owned(), uri.clone()));
            default_here = Some(uri.as_str());
        }
        for (uri, prefix) in &bindings.prefixes {
            declarations.push((format!("xmlns:{prefix}"), uri.clone()));
        }
    } else {
        match element.name.namespace() {
            // A namespace-less element under a default namespace.
            None if default_in_scope.is_some() => {
                declarations.push(("xmlns".to_owned(), String::new()));
                default_here = None;
            }
            // Back into the default namespace after an `xmlns=""`.
            Some(uri)
                if bindings.default.as_deref() == Some(uri) && default_in_scope != Some(uri) =>
            {
                declarations.push(("xmlns".to_owned(), uri.to_owned()));
                default_here = bindings.default.as_deref();
            }
            _ => {}
        }
    }

    let name = bindings.element_name(element, default_here);
    let mut start = BytesStart::new(name.as_str());
    for (key, value) in &declarations {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    for (key, value) in &element.attributes {
        let key = bindings.attribute_name(key);
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    if let Some(text) = &element.text {
        write_text(writer, text)?;
    }

    let indent = indents_children(element, position.inline);
    let child_position = Position {
        default_in_scope: default_here,
        depth: position.depth + 1,
        inline: !indent,
        is_root: false,
    };
    for child in &element.children {
        if indent {
            write_newline(writer, child_position.depth)?;
        }
        write_element(writer, bindings, child, &child_position)?;
        if let Some(tail) = &child.tail {
            write_text(writer, tail)?;
        }
    }
    if indent && !element.children.is_empty() {
        write_newline(writer, position.depth)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(write_error)
}
