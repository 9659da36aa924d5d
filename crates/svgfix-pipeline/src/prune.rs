//! Structural pruning of editor-only content.
//!
//! Removes Inkscape/Sodipodi bookkeeping that a web viewer has no use
//! for: the `<metadata>` and `<sodipodi:namedview>` elements, stock
//! markers in `<defs>`, and the root's fixed pixel size and document
//! attributes. Pruning an already pruned document changes nothing.

use serde::{Deserialize, Serialize};

use crate::names::{QName, attr};
use crate::types::Element;

/// Local names of top-level elements that only matter to the editor.
const EDITOR_ELEMENTS: [&str; 2] = ["metadata", "namedview"];

/// Stock-reference markers on `<defs>` content.
const STOCK_ATTRIBUTES: [QName; 2] = [attr::ISSTOCK, attr::STOCKID];

/// Sizing and document attributes stripped from the root.
const ROOT_ATTRIBUTES: [QName; 4] = [attr::WIDTH, attr::HEIGHT, attr::DOCNAME, attr::VERSION];

/// What [`prune`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneStats {
    /// Top-level editor elements removed.
    pub elements_removed: usize,
    /// Attributes removed from `<defs>` content and the root.
    pub attributes_removed: usize,
}

/// Strip editor-only elements and attributes from the document root.
pub fn prune(root: &mut Element) -> PruneStats {
    let mut stats = PruneStats::default();

    let before = root.children.len();
    root.children
        .retain(|child| !EDITOR_ELEMENTS.iter().any(|&kind| kind == child.kind()));
    stats.elements_removed = before - root.children.len();

    for defs in root.children.iter_mut().filter(|c| c.kind() == "defs") {
        for definition in &mut defs.children {
            stats.attributes_removed += strip_recursive(definition, &STOCK_ATTRIBUTES);
        }
    }

    stats.attributes_removed += strip(root, &ROOT_ATTRIBUTES);
    stats
}

/// Remove `names` from `element`; returns how many were present.
fn strip(element: &mut Element, names: &[QName]) -> usize {
    names
        .iter()
        .filter(|name| element.remove_attr(name).is_some())
        .count()
}

fn strip_recursive(element: &mut Element, names: &[QName]) -> usize {
    let own = strip(element, names);
    own + element
        .children
        .iter_mut()
        .map(|child| strip_recursive(child, names))
        .sum::<usize>()
}
