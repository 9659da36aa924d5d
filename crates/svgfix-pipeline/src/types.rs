//! Shared types for the svgfix pipeline.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::FixupReport;
use crate::ids::IdNumbering;
use crate::layer::LayerPolicy;
use crate::names::{Ns, QName};

/// A node in the document tree.
///
/// Attributes keep their document order so that rewritten output stays
/// close to the input. Character data is split the way mixed content
/// reads: `text` comes before the first child, and each child's `tail`
/// follows that child inside the parent. So `<text>A<tspan>B</tspan>C</text>`
/// has text `A`, and its `tspan` has text `B` and tail `C`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Namespace-qualified tag name.
    pub name: QName,
    /// Attributes in document order.
    pub attributes: IndexMap<QName, String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Text before the first child, if any.
    pub text: Option<String>,
    /// Text after this element's end tag, up to the next sibling or the
    /// parent's end tag.
    pub tail: Option<String>,
}

impl Element {
    /// Create an element with no attributes, children, or text.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: None,
            tail: None,
        }
    }

    /// The element's kind: its local tag name (`path`, `g`, `tspan`, ...).
    #[must_use]
    pub fn kind(&self) -> &str {
        self.name.local_name()
    }

    /// Returns `true` if this is the SVG element `local`.
    #[must_use]
    pub fn is_svg(&self, local: &str) -> bool {
        self.name.is(Ns::Svg, local)
    }

    /// Value of the attribute `name`, if present.
    #[must_use]
    pub fn attr(&self, name: &QName) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: QName, value: impl Into<String>) {
        self.attributes.insert(name, value.into());
    }

    /// Remove an attribute, preserving the order of the remaining ones.
    pub fn remove_attr(&mut self, name: &QName) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Append a child element.
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Visit this element and all its descendants in document order.
    pub fn visit(&self, f: &mut impl FnMut(&Self)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// A parsed document: the root element and the namespace prefixes the
/// input declared.
///
/// The prefix table maps prefix (empty for the default namespace) to URI,
/// in declaration order. Writers use it to pick prefixes for the
/// namespaces that are still referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The root element (`<svg>`).
    pub root: Element,
    /// Declared namespace prefixes: prefix -> URI.
    pub namespaces: IndexMap<String, String>,
}

impl Document {
    /// Create a document from a root element and its namespace table.
    #[must_use]
    pub const fn new(root: Element, namespaces: IndexMap<String, String>) -> Self {
        Self { root, namespaces }
    }

    /// Prefixes the input bound to `uri`, in declaration order.
    pub fn prefixes_for<'a>(&'a self, uri: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.namespaces
            .iter()
            .filter(move |(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }
}

/// Named presets for the two input shapes the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Multi-layer keyboard drawing: every layer is kept and processed.
    #[default]
    Keyboard,
    /// Circuit schematic: only the `Schematic` layer is kept, and
    /// `wire#<signal>` groups are rewired to CSS color variables.
    Schematic,
}

/// Configuration for the fixup pipeline.
///
/// Use [`FixupConfig::keyboard`] or [`FixupConfig::schematic`] (or
/// [`Variant`] via `From`) for the stock presets. Every field has a
/// default, so a partial JSON object deserializes on top of the keyboard
/// preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixupConfig {
    /// Which top-level layers are kept and processed.
    pub layer_policy: LayerPolicy,

    /// Whether the first id for a base name is bare (`path`) or numbered
    /// (`path_0`).
    pub id_numbering: IdNumbering,

    /// Declarations prepended to an element's style before class lookup,
    /// keyed by element kind. The prefix is part of the emitted rule.
    pub kind_style_prefixes: BTreeMap<String, String>,

    /// Whether `<grouptype>#<color>` labels are recognized and a `:root`
    /// color-variable rule is emitted.
    pub color_variables: bool,

    /// Group type whose descendants have their colors redirected to the
    /// group's color variable.
    pub wire_group_type: String,

    /// Separator between group type and color in a group label.
    pub label_separator: char,

    /// Element kinds whose `stroke`/`fill` are rewritten inside a wire
    /// group.
    pub color_kinds: Vec<String>,

    /// Placeholder value for every registered color variable.
    pub default_color: String,
}

impl FixupConfig {
    /// Default group type that marks a wire.
    pub const DEFAULT_WIRE_GROUP_TYPE: &'static str = "wire";

    /// Default group-label separator.
    pub const DEFAULT_LABEL_SEPARATOR: char = '#';

    /// Default placeholder color for CSS variables.
    pub const DEFAULT_COLOR: &'static str = "#000000";

    /// Default label of the layer kept by the schematic preset.
    pub const DEFAULT_SCHEMATIC_LAYER: &'static str = "Schematic";

    /// Style prefix injected for text spans by the keyboard preset.
    pub const TSPAN_STYLE_PREFIX: &'static str = "pointer-events:none;";

    /// Shape kinds that carry a wire's color.
    pub const DEFAULT_COLOR_KINDS: [&str; 7] = [
        "path", "rect", "circle", "ellipse", "line", "polyline", "polygon",
    ];

    /// Preset for multi-layer keyboard drawings.
    #[must_use]
    pub fn keyboard() -> Self {
        Self {
            layer_policy: LayerPolicy::AllLayers,
            id_numbering: IdNumbering::BareFirst,
            kind_style_prefixes: BTreeMap::from([(
                "tspan".to_owned(),
                Self::TSPAN_STYLE_PREFIX.to_owned(),
            )]),
            color_variables: false,
            ..Self::common()
        }
    }

    /// Preset for circuit schematics.
    ///
    /// No kind gets a style prefix here: schematic text spans keep their
    /// pointer events, unlike the keyboard preset's
    /// [`TSPAN_STYLE_PREFIX`](Self::TSPAN_STYLE_PREFIX).
    #[must_use]
    pub fn schematic() -> Self {
        Self {
            layer_policy: LayerPolicy::Named {
                label: Self::DEFAULT_SCHEMATIC_LAYER.to_owned(),
                id: Self::DEFAULT_SCHEMATIC_LAYER.to_owned(),
            },
            id_numbering: IdNumbering::SuffixFromZero,
            kind_style_prefixes: BTreeMap::new(),
            color_variables: true,
            ..Self::common()
        }
    }

    fn common() -> Self {
        Self {
            layer_policy: LayerPolicy::AllLayers,
            id_numbering: IdNumbering::BareFirst,
            kind_style_prefixes: BTreeMap::new(),
            color_variables: false,
            wire_group_type: Self::DEFAULT_WIRE_GROUP_TYPE.to_owned(),
            label_separator: Self::DEFAULT_LABEL_SEPARATOR,
            color_kinds: Self::DEFAULT_COLOR_KINDS
                .iter()
                .map(|&kind| kind.to_owned())
                .collect(),
            default_color: Self::DEFAULT_COLOR.to_owned(),
        }
    }

    /// Check the configuration for values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`FixupError::InvalidConfig`] if the wire group type or
    /// default color is empty, the label separator is whitespace, or a
    /// named layer policy has an empty label or id.
    pub fn validate(&self) -> Result<(), FixupError> {
        if self.wire_group_type.is_empty() {
            return Err(FixupError::InvalidConfig(
                "wire group type must not be empty".to_owned(),
            ));
        }
        if self.wire_group_type.contains(self.label_separator) {
            return Err(FixupError::InvalidConfig(format!(
                "wire group type '{}' contains the label separator '{}'",
                self.wire_group_type, self.label_separator,
            )));
        }
        if self.label_separator.is_whitespace() {
            return Err(FixupError::InvalidConfig(
                "label separator must not be whitespace".to_owned(),
            ));
        }
        if self.default_color.trim().is_empty() {
            return Err(FixupError::InvalidConfig(
                "default color must not be empty".to_owned(),
            ));
        }
        if let LayerPolicy::Named { label, id } = &self.layer_policy
            && (label.is_empty() || id.is_empty())
        {
            return Err(FixupError::InvalidConfig(
                "named layer policy needs a non-empty label and id".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self::keyboard()
    }
}

impl From<Variant> for FixupConfig {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Keyboard => Self::keyboard(),
            Variant::Schematic => Self::schematic(),
        }
    }
}

/// Result of a successful fixup run.
#[derive(Debug, Clone)]
pub struct FixupResult {
    /// The rewritten document, ready to be serialized.
    pub document: Document,
    /// Counts collected while rewriting.
    pub report: FixupReport,
}

/// Errors that can occur during a fixup run.
#[derive(Debug, thiserror::Error)]
pub enum FixupError {
    /// No top-level layer carries the required label.
    #[error("{label} layer not found")]
    LayerNotFound {
        /// The label that was searched for.
        label: String,
    },

    /// The configuration is unusable.
    #[error("invalid fixup configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::names::attr;

    #[test]
    fn set_attr_keeps_position_and_remove_keeps_order() {
        let mut el = Element::new(QName::qualified(Ns::Svg, "path"));
        el.set_attr(attr::ID, "a");
        el.set_attr(attr::STYLE, "fill:red");
        el.set_attr(attr::CLASS, "c");
        el.set_attr(attr::ID, "b");
        el.remove_attr(&attr::STYLE);

        let keys: Vec<String> = el.attributes.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["id", "class"]);
        assert_eq!(el.attr(&attr::ID), Some("b"));
    }

    #[test]
    fn visit_is_preorder() {
        let mut root = Element::new(QName::qualified(Ns::Svg, "svg"));
        let mut g = Element::new(QName::qualified(Ns::Svg, "g"));
        g.push(Element::new(QName::qualified(Ns::Svg, "path")));
        root.push(g);
        root.push(Element::new(QName::qualified(Ns::Svg, "rect")));

        let mut kinds = Vec::new();
        root.visit(&mut |el| kinds.push(el.kind().to_owned()));
        assert_eq!(kinds, ["svg", "g", "path", "rect"]);
    }

    #[test]
    fn presets_validate() {
        FixupConfig::keyboard().validate().unwrap();
        FixupConfig::schematic().validate().unwrap();
    }

    #[test]
    fn only_keyboard_prefixes_tspans() {
        assert_eq!(
            FixupConfig::keyboard().kind_style_prefixes.get("tspan").map(String::as_str),
            Some(FixupConfig::TSPAN_STYLE_PREFIX)
        );
        assert!(FixupConfig::schematic().kind_style_prefixes.is_empty());
    }

    #[test]
    fn empty_wire_group_type_is_rejected() {
        let config = FixupConfig {
            wire_group_type: String::new(),
            ..FixupConfig::schematic()
        };
        assert!(matches!(
            config.validate(),
            Err(FixupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: FixupConfig =
            serde_json::from_str(r#"{"color_variables": true, "default_color": "red"}"#).unwrap();
        assert!(config.color_variables);
        assert_eq!(config.default_color, "red");
        assert_eq!(config.layer_policy, LayerPolicy::AllLayers);
        assert_eq!(config.wire_group_type, "wire");
    }

    #[test]
    fn config_json_round_trip() {
        let config = FixupConfig::schematic();
        let json = serde_json::to_string(&config).unwrap();
        let back: FixupConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn layer_not_found_message() {
        let err = FixupError::LayerNotFound {
            label: "Schematic".to_owned(),
        };
        assert_eq!(err.to_string(), "Schematic layer not found");
    }
}
