//! The style deduplication engine.
//!
//! Walks each selected layer depth-first. On the way down every element
//! gets a unique id, loses its editor-only attributes, and (inside a wire
//! group) has its colors redirected to the group's CSS variable. On the
//! way back up its inline `style` is collapsed into a shared class, so
//! the class lookup always sees the rewritten declaration.

use tracing::warn;

use crate::color::{ColorVariableTable, GroupLabel};
use crate::diagnostics::EngineStats;
use crate::ids::IdRegistry;
use crate::names::{QName, attr};
use crate::style::{StyleRegistry, rewrite_colors};
use crate::types::{Element, FixupConfig};

/// Editor-only attributes stripped from every processed element.
const EDITOR_ATTRIBUTES: [QName; 4] = [
    attr::ROLE,
    attr::NODETYPES,
    attr::TRANSFORM_CENTER_X,
    attr::TRANSFORM_CENTER_Y,
];

/// Registries for one run, populated as a side effect of the walk.
#[derive(Debug, Clone)]
pub struct FixupState {
    /// Id allocation.
    pub ids: IdRegistry,
    /// Style -> class mapping.
    pub styles: StyleRegistry,
    /// Color variables for the `:root` rule.
    pub colors: ColorVariableTable,
    /// Counters not tracked by the registries themselves.
    pub stats: EngineStats,
}

impl FixupState {
    /// Fresh, empty state for a run with `config`.
    #[must_use]
    pub fn new(config: &FixupConfig) -> Self {
        Self {
            ids: IdRegistry::new(config.id_numbering),
            styles: StyleRegistry::new(config.kind_style_prefixes.clone()),
            colors: ColorVariableTable::new(config.default_color.clone()),
            stats: EngineStats::default(),
        }
    }

    /// Engine statistics including the registry totals.
    #[must_use]
    pub fn engine_stats(&self) -> EngineStats {
        EngineStats {
            ids_assigned: self.ids.assigned(),
            classes: self.styles.classes_per_kind().clone(),
            color_variables: self.colors.len(),
            ..self.stats.clone()
        }
    }
}

/// Group type and color variable inherited by a labeled group's subtree.
#[derive(Debug, Clone)]
struct GroupContext {
    group_type: String,
    variable: String,
}

/// Rewrites layers according to a [`FixupConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    config: &'a FixupConfig,
}

impl<'a> Engine<'a> {
    /// Create an engine for `config`.
    #[must_use]
    pub const fn new(config: &'a FixupConfig) -> Self {
        Self { config }
    }

    /// Process every descendant of `layer`.
    ///
    /// The layer element itself is not renamed or restyled; its id is
    /// set by the layer selector and claimed before the engine runs.
    pub fn process_layer(&self, layer: &mut Element, state: &mut FixupState) {
        self.process_children(layer, None, state);
    }

    fn process_children(
        &self,
        parent: &mut Element,
        context: Option<&GroupContext>,
        state: &mut FixupState,
    ) {
        for child in &mut parent.children {
            self.process_node(child, context, state);
        }
    }

    fn process_node(
        &self,
        node: &mut Element,
        context: Option<&GroupContext>,
        state: &mut FixupState,
    ) {
        state.stats.elements_visited += 1;
        let kind = node.kind().to_owned();

        let label = node.remove_attr(&attr::LABEL);
        let id = state.ids.assign(label.as_deref().unwrap_or(&kind));
        node.set_attr(attr::ID, id);

        if let Some(context) = context
            && self.is_wire(context)
            && self.carries_color(&kind)
        {
            rewrite_style(node, &context.variable, &mut state.stats);
        }

        for name in &EDITOR_ATTRIBUTES {
            node.remove_attr(name);
        }

        match label.as_deref().and_then(|l| self.group_context(l, state)) {
            Some(group) => {
                if self.is_wire(&group) {
                    rewrite_style(node, &group.variable, &mut state.stats);
                }
                self.process_children(node, Some(&group), state);
            }
            None => self.process_children(node, context, state),
        }

        if let Some(style) = node.remove_attr(&attr::STYLE) {
            let class = state.styles.class_for(&kind, &style);
            node.set_attr(attr::CLASS, class);
            state.stats.styles_collapsed += 1;
        }
    }

    fn is_wire(&self, context: &GroupContext) -> bool {
        context.group_type == self.config.wire_group_type
    }

    fn carries_color(&self, kind: &str) -> bool {
        self.config.color_kinds.iter().any(|k| k == kind)
    }

    /// Parse a group label and register its color variable.
    fn group_context(&self, label: &str, state: &mut FixupState) -> Option<GroupContext> {
        if !self.config.color_variables {
            return None;
        }
        match GroupLabel::parse(label, self.config.label_separator) {
            Ok(Some(group)) => Some(GroupContext {
                group_type: group.group_type.to_owned(),
                variable: state.colors.register(group.color),
            }),
            Ok(None) => None,
            Err(error) => {
                warn!(label, %error, "label is not a valid group label; treating it as a plain label");
                state.stats.rejected_labels += 1;
                None
            }
        }
    }
}

/// Apply [`rewrite_colors`] to the element's inline style, if any.
fn rewrite_style(node: &mut Element, variable: &str, stats: &mut EngineStats) {
    let Some(style) = node.attr(&attr::STYLE) else {
        return;
    };
    let rewrite = rewrite_colors(style, variable);

    for declaration in &rewrite.skipped {
        warn!(
            id = ?node.attr(&attr::ID),
            declaration = declaration.as_str(),
            "skipping style declaration without ':'"
        );
    }
    stats.rewritten_declarations += rewrite.rewritten;
    stats.skipped_declarations += rewrite.skipped.len();

    node.set_attr(attr::STYLE, rewrite.style);
}
