//! Layer selection: decide which top-level groups are processed.
//!
//! Inkscape stores each drawing layer as a top-level `<g>` carrying
//! `inkscape:groupmode="layer"` and an `inkscape:label`. This module
//! defines the [`LayerSelector`] trait and the [`LayerPolicy`] enum for
//! runtime selection between the keyboard and schematic behaviors.

use serde::{Deserialize, Serialize};

use crate::names::attr;
use crate::types::{Element, FixupError};

/// Placeholder used in diagnostics for layers without a label or id.
const UNNAMED: &str = "(unnamed)";

/// Selects which top-level layers survive and are handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerPolicy {
    /// Keep every top-level group.
    ///
    /// Each layer's id is taken from its label (numbered if that id is
    /// already in use), and the editor-only label and group mode
    /// attributes are removed.
    #[default]
    AllLayers,

    /// Keep only the layer labeled exactly `label`, renamed to `id`.
    ///
    /// Every other layer group is removed from the document; top-level
    /// groups that are not layers are left alone and not processed.
    Named {
        /// Label of the layer to keep.
        label: String,
        /// Id given to the kept layer.
        id: String,
    },
}

/// Layers kept and dropped by a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    /// Ids of the layers that will be processed.
    pub retained: Vec<String>,
    /// Labels of the layers removed from the document.
    pub removed: Vec<String>,
    /// Retained layers renamed because their id was already in use.
    pub id_collisions: usize,
}

/// Result of [`LayerSelector::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSelection {
    /// Indices into the root's children of the layers to process.
    pub indices: Vec<usize>,
    /// What was kept and what was dropped.
    pub stats: LayerStats,
}

/// Trait for layer selection strategies.
pub trait LayerSelector {
    /// Select (and relabel) the layers to process, removing the others.
    ///
    /// # Errors
    ///
    /// Returns [`FixupError::LayerNotFound`] if the strategy requires a
    /// layer that the document does not have. The root is not modified
    /// in that case.
    fn select(&self, root: &mut Element) -> Result<LayerSelection, FixupError>;
}

impl LayerSelector for LayerPolicy {
    fn select(&self, root: &mut Element) -> Result<LayerSelection, FixupError> {
        match self {
            Self::AllLayers => Ok(select_all(root)),
            Self::Named { label, id } => select_named(root, label, id),
        }
    }
}

fn is_layer(element: &Element) -> bool {
    element.is_svg("g") && element.attr(&attr::GROUPMODE) == Some("layer")
}

fn select_all(root: &mut Element) -> LayerSelection {
    let mut selection = LayerSelection::default();

    for (index, layer) in root.children.iter_mut().enumerate() {
        if !layer.is_svg("g") {
            continue;
        }
        if let Some(label) = layer.remove_attr(&attr::LABEL) {
            layer.set_attr(attr::ID, label);
        }
        layer.remove_attr(&attr::GROUPMODE);

        let name = layer.attr(&attr::ID).unwrap_or(UNNAMED).to_owned();
        selection.stats.retained.push(name);
        selection.indices.push(index);
    }

    selection
}

fn select_named(root: &mut Element, label: &str, id: &str) -> Result<LayerSelection, FixupError> {
    let keep = root
        .children
        .iter()
        .position(|child| is_layer(child) && child.attr(&attr::LABEL) == Some(label))
        .ok_or_else(|| FixupError::LayerNotFound {
            label: label.to_owned(),
        })?;

    let mut stats = LayerStats::default();
    let mut kept_index = 0;

    for (index, child) in std::mem::take(&mut root.children).into_iter().enumerate() {
        if index == keep {
            kept_index = root.children.len();
        } else if is_layer(&child) {
            let name = child.attr(&attr::LABEL).unwrap_or(UNNAMED).to_owned();
            if name == label {
                tracing::warn!(label, "removing duplicate layer; only the first is kept");
            }
            stats.removed.push(name);
            continue;
        }
        root.children.push(child);
    }

    if let Some(layer) = root.children.get_mut(kept_index) {
        layer.set_attr(attr::ID, id);
        layer.remove_attr(&attr::LABEL);
        layer.remove_attr(&attr::GROUPMODE);
    }
    stats.retained.push(id.to_owned());

    Ok(LayerSelection {
        indices: vec![kept_index],
        stats,
    })
}
