//! svgfix-pipeline: Inkscape SVG cleanup for web viewers (sans-IO).
//!
//! Rewrites an in-memory SVG tree through:
//! prune -> layer selection -> id/style/color deduplication ->
//! stylesheet emission.
//!
//! This crate has **no I/O dependencies**. It operates on the
//! [`Document`] tree and returns it rewritten, together with a
//! [`FixupReport`]. Parsing and serializing XML lives in `svgfix-xml`.

pub mod color;
pub mod diagnostics;
pub mod engine;
pub mod ids;
pub mod layer;
pub mod names;
pub mod prune;
pub mod style;
pub mod stylesheet;
pub mod types;

pub use diagnostics::{EngineStats, FixupReport};
pub use engine::{Engine, FixupState};
pub use layer::{LayerPolicy, LayerSelection, LayerSelector};
pub use names::{Ns, QName};
pub use stylesheet::Stylesheet;
pub use types::{Document, Element, FixupConfig, FixupError, FixupResult, Variant};

use names::attr;

/// Run the full fixup pipeline.
///
/// Consumes the document so that a failed run can never leave a
/// half-rewritten tree behind.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Prune editor-only elements and attributes
/// 3. Select layers (pluggable strategy)
/// 4. Reserve ids that live outside the processed layers
/// 5. Assign ids, rewrite wire colors, collapse styles into classes
/// 6. Insert the stylesheet as the root's third child
///
/// # Errors
///
/// Returns [`FixupError::InvalidConfig`] if the configuration fails
/// [`FixupConfig::validate`].
/// Returns [`FixupError::LayerNotFound`] if the layer policy names a
/// layer the document does not have.
pub fn fixup(mut document: Document, config: &FixupConfig) -> Result<FixupResult, FixupError> {
    // 1. Validate.
    config.validate()?;

    // 2. Prune.
    let prune = prune::prune(&mut document.root);

    // 3. Layer selection.
    let mut selection = config.layer_policy.select(&mut document.root)?;

    // 4. Ids outside the layers are kept; layer ids must not clash with them.
    let mut state = FixupState::new(config);
    reserve_external_ids(&document.root, &selection.indices, &mut state);
    claim_layer_ids(&mut document.root, &mut selection, &mut state);

    // 5. Deduplicate.
    let engine = Engine::new(config);
    for &index in &selection.indices {
        if let Some(layer) = document.root.children.get_mut(index) {
            engine.process_layer(layer, &mut state);
        }
    }

    // 6. Stylesheet.
    let colors = config.color_variables.then_some(&state.colors);
    let stylesheet = Stylesheet::build(&state.styles, colors);
    let stylesheet_stats = stylesheet.insert_into(&mut document.root);

    let report = FixupReport {
        prune,
        layers: selection.stats,
        engine: state.engine_stats(),
        stylesheet: stylesheet_stats,
    };
    tracing::debug!(
        layers = ?report.layers.retained,
        ids = report.engine.ids_assigned,
        classes = report.engine.class_count(),
        variables = report.engine.color_variables,
        "fixup complete"
    );

    Ok(FixupResult { document, report })
}

/// Reserve the root id and every id outside the selected layers.
fn reserve_external_ids(root: &Element, selected: &[usize], state: &mut FixupState) {
    let mut reserve = |element: &Element| {
        if let Some(id) = element.attr(&attr::ID) {
            state.ids.reserve(id);
        }
    };

    reserve(root);
    for (index, child) in root.children.iter().enumerate() {
        if !selected.contains(&index) {
            child.visit(&mut reserve);
        }
    }
}

/// Register the selected layers' ids, renaming any layer whose id is
/// already in use.
fn claim_layer_ids(root: &mut Element, selection: &mut LayerSelection, state: &mut FixupState) {
    for (slot, &index) in selection.indices.iter().enumerate() {
        let Some(layer) = root.children.get_mut(index) else {
            continue;
        };
        let Some(wanted) = layer.attr(&attr::ID).map(str::to_owned) else {
            continue;
        };
        let id = state.ids.claim(&wanted);
        if id != wanted {
            tracing::warn!(layer = %wanted, renamed = %id, "layer id already in use");
            selection.stats.id_collisions += 1;
            layer.set_attr(attr::ID, id.as_str());
        }
        if let Some(retained) = selection.stats.retained.get_mut(slot) {
            *retained = id;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn el(ns: Ns, local: &'static str) -> Element {
        Element::new(QName::qualified(ns, local))
    }

    fn with(mut e: Element, name: QName, value: &str) -> Element {
        e.set_attr(name, value);
        e
    }

    fn layer(label: &str) -> Element {
        let g = with(el(Ns::Svg, "g"), attr::GROUPMODE, "layer");
        let g = with(g, attr::LABEL, label);
        with(g, attr::ID, "layer1")
    }

    /// defs, namedview, metadata, then the given layers.
    fn document(layers: Vec<Element>) -> Document {
        let mut root = with(el(Ns::Svg, "svg"), attr::WIDTH, "100mm");
        let marker = with(el(Ns::Svg, "marker"), attr::ID, "Arrow1Lend");
        let marker = with(marker, attr::ISSTOCK, "true");
        let mut defs = el(Ns::Svg, "defs");
        defs.push(marker);
        root.push(defs);
        root.push(el(Ns::Sodipodi, "namedview"));
        root.push(el(Ns::Svg, "metadata"));
        root.children.extend(layers);
        Document::new(root, IndexMap::new())
    }

    fn ids(root: &Element) -> Vec<String> {
        let mut out = Vec::new();
        root.visit(&mut |e| {
            if let Some(id) = e.attr(&attr::ID) {
                out.push(id.to_owned());
            }
        });
        out
    }

    #[test]
    fn schematic_wire_example() {
        let mut wire = with(el(Ns::Svg, "g"), attr::LABEL, "wire#power/3v3");
        wire.push(with(el(Ns::Svg, "path"), attr::STYLE, "stroke:#ff0000;fill:none"));
        let mut schematic = layer("Schematic");
        schematic.push(wire);

        let result = fixup(
            document(vec![layer("Helpers"), schematic]),
            &FixupConfig::schematic(),
        )
        .unwrap();
        let root = &result.document.root;

        let kinds: Vec<&str> = root.children.iter().map(Element::kind).collect();
        assert_eq!(kinds, ["defs", "g", "style"]);

        let style = root.children[2].text.as_deref().unwrap();
        assert_eq!(
            style,
            ":root {--color-powerbar3v3:#000000;}\n\
             .path_0 {stroke:var(--color-powerbar3v3);fill:none}"
        );

        let schematic = &root.children[1];
        assert_eq!(schematic.attr(&attr::ID), Some("Schematic"));
        let wire = &schematic.children[0];
        assert_eq!(wire.attr(&attr::ID), Some("wire#power/3v3_0"));
        let path = &wire.children[0];
        assert_eq!(path.attr(&attr::ID), Some("path_0"));
        assert_eq!(path.attr(&attr::CLASS), Some("path_0"));
        assert_eq!(path.attr(&attr::STYLE), None);

        assert_eq!(result.report.layers.removed, ["Helpers"]);
        assert_eq!(result.report.prune.elements_removed, 2);
        assert_eq!(result.report.stylesheet.rules, 2);
    }

    #[test]
    fn missing_schematic_layer_is_fatal() {
        let err = fixup(document(vec![layer("Keys")]), &FixupConfig::schematic()).unwrap_err();
        assert!(matches!(err, FixupError::LayerNotFound { ref label } if label == "Schematic"));
        assert_eq!(err.to_string(), "Schematic layer not found");
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let config = FixupConfig {
            wire_group_type: String::new(),
            ..FixupConfig::schematic()
        };
        let err = fixup(document(vec![layer("Schematic")]), &config).unwrap_err();
        assert!(matches!(err, FixupError::InvalidConfig(_)));
    }

    #[test]
    fn keyboard_keeps_all_layers_and_has_no_variables() {
        let mut keys = layer("Keys");
        keys.push(with(el(Ns::Svg, "rect"), attr::STYLE, "fill:#fff"));
        keys.push(with(el(Ns::Svg, "rect"), attr::STYLE, "fill:#fff"));
        let mut legend = layer("Legend");
        let mut text = with(el(Ns::Svg, "text"), attr::STYLE, "font-size:4px");
        text.push(with(el(Ns::Svg, "tspan"), attr::STYLE, "font-size:4px"));
        legend.push(text);

        let result = fixup(document(vec![keys, legend]), &FixupConfig::keyboard()).unwrap();
        let root = &result.document.root;

        let kinds: Vec<&str> = root.children.iter().map(Element::kind).collect();
        assert_eq!(kinds, ["defs", "g", "style", "g"]);
        assert_eq!(root.attr(&attr::WIDTH), None);

        let css = root.children[2].text.as_deref().unwrap();
        assert!(!css.contains(":root"));
        assert!(css.contains(".tspan_0 {pointer-events:none;font-size:4px}"));
        assert_eq!(result.report.engine.styles_collapsed, 4);
        assert_eq!(result.report.engine.class_count(), 3);

        assert_eq!(
            ids(root),
            ["Arrow1Lend", "Keys", "rect", "rect_1", "Legend", "text", "tspan"]
        );
    }

    #[test]
    fn reserved_ids_are_not_reissued() {
        let mut keys = layer("Keys");
        keys.push(with(el(Ns::Svg, "path"), attr::LABEL, "Arrow1Lend"));
        keys.push(with(el(Ns::Svg, "g"), attr::LABEL, "Keys"));

        let result = fixup(document(vec![keys]), &FixupConfig::keyboard()).unwrap();
        let layer = &result.document.root.children[1];
        assert_eq!(layer.children[0].attr(&attr::ID), Some("Arrow1Lend_1"));
        assert_eq!(layer.children[1].attr(&attr::ID), Some("Keys_1"));
    }

    #[test]
    fn colliding_layer_ids_are_renumbered() {
        let mut doc = document(vec![layer("Keys"), layer("Keys"), layer("svg8")]);
        doc.root.set_attr(attr::ID, "svg8");
        doc.root.children[3].push(with(el(Ns::Svg, "rect"), attr::LABEL, "Keys"));

        let result = fixup(doc, &FixupConfig::keyboard()).unwrap();
        let root = &result.document.root;
        let layer_ids: Vec<_> = root
            .children
            .iter()
            .filter(|e| e.is_svg("g"))
            .map(|e| e.attr(&attr::ID).unwrap())
            .collect();
        assert_eq!(layer_ids, ["Keys", "Keys_1", "svg8_1"]);
        assert_eq!(root.children[1].children[0].attr(&attr::ID), Some("Keys_2"));
        assert_eq!(result.report.layers.retained, ["Keys", "Keys_1", "svg8_1"]);
        assert_eq!(result.report.layers.id_collisions, 2);

        let mut all = ids(root);
        let count = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), count);
    }

    #[test]
    fn document_without_layers_still_gets_a_stylesheet() {
        let result = fixup(document(Vec::new()), &FixupConfig::keyboard()).unwrap();
        let root = &result.document.root;
        assert_eq!(root.children.len(), 2);
        assert!(root.children[1].is_svg("style"));
        assert_eq!(root.children[1].text, None);
    }
}
