//! Stylesheet emission.
//!
//! Serializes the collected classes (and color variables) into one CSS
//! block and injects it as a `<style>` element near the start of the
//! document.

use serde::{Deserialize, Serialize};

use crate::color::ColorVariableTable;
use crate::names::{Ns, QName};
use crate::style::StyleRegistry;
use crate::types::Element;

/// Child index of the root at which the `<style>` element is inserted.
///
/// Inkscape documents start with `<defs>` (and often `<title>`), so this
/// lands after the leading declarations and before the content layers.
pub const STYLE_INSERT_INDEX: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    selector: String,
    body: String,
}

/// An ordered list of CSS rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

/// Size of the emitted stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetStats {
    /// Number of CSS rules.
    pub rules: usize,
    /// Length of the CSS text in bytes.
    pub css_bytes: usize,
}

impl Stylesheet {
    /// Build the stylesheet: the `:root` variable rule first (when
    /// `colors` is given and not empty), then one rule per class in
    /// allocation order.
    #[must_use]
    pub fn build(styles: &StyleRegistry, colors: Option<&ColorVariableTable>) -> Self {
        let mut rules = Vec::with_capacity(styles.len() + 1);

        if let Some(colors) = colors.filter(|c| !c.is_empty()) {
            let body = colors
                .iter()
                .map(|(name, value)| format!("{name}:{value};"))
                .collect();
            rules.push(Rule {
                selector: ":root".to_owned(),
                body,
            });
        }

        rules.extend(styles.rules().map(|(class, declaration)| Rule {
            selector: format!(".{class}"),
            body: declaration.to_owned(),
        }));

        Self { rules }
    }

    /// Render as CSS text, one rule per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.rules
            .iter()
            .map(|rule| format!("{} {{{}}}", rule.selector, rule.body))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// An SVG `<style>` element holding the rendered CSS.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut style = Element::new(QName::qualified(Ns::Svg, "style"));
        let css = self.render();
        if !css.is_empty() {
            style.text = Some(css);
        }
        style
    }

    /// Insert the `<style>` element at [`STYLE_INSERT_INDEX`] of `root`
    /// (or at the end, if the root has fewer children).
    pub fn insert_into(&self, root: &mut Element) -> StylesheetStats {
        let element = self.to_element();
        let stats = StylesheetStats {
            rules: self.len(),
            css_bytes: element.text.as_ref().map_or(0, String::len),
        };
        let index = STYLE_INSERT_INDEX.min(root.children.len());
        root.children.insert(index, element);
        stats
    }
}
