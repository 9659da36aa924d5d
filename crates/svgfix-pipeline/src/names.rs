//! Namespace-qualified names.
//!
//! [`Ns`] maps the handful of namespaces an Inkscape document uses to
//! their URIs in one place, and [`QName`] pairs an optional namespace URI
//! with a local name. The attribute names the pipeline reads or strips are
//! available as constants in [`attr`].

use std::borrow::Cow;
use std::fmt;

/// Well-known namespaces found in Inkscape SVG documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ns {
    /// The SVG namespace (usually the default namespace).
    Svg,
    /// XLink, used by `xlink:href` on `<use>` and friends.
    XLink,
    /// Inkscape editor metadata (`inkscape:label`, `inkscape:groupmode`, ...).
    Inkscape,
    /// Sodipodi editor metadata (`sodipodi:namedview`, `sodipodi:role`, ...).
    Sodipodi,
    /// The reserved `xml` namespace (`xml:space`). Never declared.
    Xml,
}

impl Ns {
    /// All well-known namespaces.
    pub const ALL: [Self; 5] = [
        Self::Svg,
        Self::XLink,
        Self::Inkscape,
        Self::Sodipodi,
        Self::Xml,
    ];

    /// The full namespace URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Svg => "http://www.w3.org/2000/svg",
            Self::XLink => "http://www.w3.org/1999/xlink",
            Self::Inkscape => "http://www.inkscape.org/namespaces/inkscape",
            Self::Sodipodi => "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
            Self::Xml => "http://www.w3.org/XML/1998/namespace",
        }
    }

    /// Conventional prefixes for this namespace, most preferred first.
    ///
    /// An empty prefix means the namespace may be declared as the default
    /// namespace (only usable for element names).
    #[must_use]
    pub const fn preferred_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Svg => &["", "svg"],
            Self::XLink => &["xlink"],
            Self::Inkscape => &["inkscape"],
            Self::Sodipodi => &["sodipodi"],
            Self::Xml => &["xml"],
        }
    }

    /// Look up a well-known namespace by URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.uri() == uri)
    }
}

/// A namespace-qualified element or attribute name.
///
/// Unprefixed attributes have no namespace; unprefixed element names take
/// the default namespace in scope where they were parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: Option<Cow<'static, str>>,
    local: Cow<'static, str>,
}

impl QName {
    /// A name in one of the well-known namespaces.
    #[must_use]
    pub const fn qualified(ns: Ns, local: &'static str) -> Self {
        Self {
            namespace: Some(Cow::Borrowed(ns.uri())),
            local: Cow::Borrowed(local),
        }
    }

    /// A name without a namespace.
    #[must_use]
    pub const fn unqualified(local: &'static str) -> Self {
        Self {
            namespace: None,
            local: Cow::Borrowed(local),
        }
    }

    /// A name built from owned parts, as produced by a parser.
    #[must_use]
    pub fn new(namespace: Option<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(Cow::Owned),
            local: Cow::Owned(local.into()),
        }
    }

    /// The namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Returns `true` if this name is `local` in namespace `ns`.
    #[must_use]
    pub fn is(&self, ns: Ns, local: &str) -> bool {
        self.namespace() == Some(ns.uri()) && self.local_name() == local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(uri) => write!(f, "{{{uri}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Attribute names used by the pipeline.
pub mod attr {
    use super::{Ns, QName};

    pub const ID: QName = QName::unqualified("id");
    pub const CLASS: QName = QName::unqualified("class");
    pub const STYLE: QName = QName::unqualified("style");
    pub const WIDTH: QName = QName::unqualified("width");
    pub const HEIGHT: QName = QName::unqualified("height");
    pub const SPACE: QName = QName::qualified(Ns::Xml, "space");

    pub const LABEL: QName = QName::qualified(Ns::Inkscape, "label");
    pub const GROUPMODE: QName = QName::qualified(Ns::Inkscape, "groupmode");
    pub const VERSION: QName = QName::qualified(Ns::Inkscape, "version");
    pub const ISSTOCK: QName = QName::qualified(Ns::Inkscape, "isstock");
    pub const STOCKID: QName = QName::qualified(Ns::Inkscape, "stockid");
    pub const TRANSFORM_CENTER_X: QName = QName::qualified(Ns::Inkscape, "transform-center-x");
    pub const TRANSFORM_CENTER_Y: QName = QName::qualified(Ns::Inkscape, "transform-center-y");

    pub const DOCNAME: QName = QName::qualified(Ns::Sodipodi, "docname");
    pub const ROLE: QName = QName::qualified(Ns::Sodipodi, "role");
    pub const NODETYPES: QName = QName::qualified(Ns::Sodipodi, "nodetypes");
}
