//! Integration test: run the Inkscape fixtures through parse -> fixup -> write.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use svgfix_pipeline::names::attr;
use svgfix_pipeline::{Element, FixupConfig, FixupError, Ns, QName, fixup};
use svgfix_xml::{parse_document, write_document};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    assert!(path.exists(), "fixture not found at {path:?}");
    std::fs::read_to_string(&path).unwrap()
}

/// Fix up `name` with `config`, serialize, and parse the output again.
fn round_trip(name: &str, config: &FixupConfig) -> (String, Element) {
    let document = parse_document(&fixture(name)).expect("fixture should parse");
    let result = fixup(document, config).expect("fixup should succeed");
    eprintln!("{}", result.report.report());

    let out = write_document(&result.document).unwrap();
    let reparsed = parse_document(&out).expect("output should parse");
    (out, reparsed.root)
}

fn ids(elements: &[Element]) -> Vec<&str> {
    elements
        .iter()
        .map(|e| e.attr(&attr::ID).unwrap_or_default())
        .collect()
}

fn kinds(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(Element::kind).collect()
}

#[test]
fn keyboard_fixture() {
    let (out, root) = round_trip("keyboard.svg", &FixupConfig::keyboard());

    for gone in ["inkscape", "sodipodi", "metadata", "rdf", "width=\"120mm\""] {
        assert!(!out.contains(gone), "output still contains {gone}");
    }
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\""));

    let root_attributes: Vec<String> = root.attributes.keys().map(ToString::to_string).collect();
    assert_eq!(root_attributes, ["viewBox", "version", "id"]);
    assert_eq!(kinds(&root.children), ["defs", "g", "style", "g"]);

    let keys = &root.children[1];
    assert_eq!(keys.attr(&attr::ID), Some("Keys"));
    assert_eq!(ids(&keys.children), ["key_esc", "key_1", "path"]);
    let classes: Vec<_> = keys.children.iter().map(|e| e.attr(&attr::CLASS)).collect();
    assert_eq!(classes, [Some("rect_0"), Some("rect_0"), Some("path_0")]);
    assert!(keys.children.iter().all(|e| e.attr(&attr::STYLE).is_none()));

    let legend = &root.children[3];
    assert_eq!(legend.attr(&attr::ID), Some("Legend"));
    assert_eq!(ids(&legend.children), ["text", "text_1"]);
    let second = &legend.children[1];
    assert_eq!(second.attr(&QName::qualified(Ns::Xml, "space")), Some("preserve"));
    assert_eq!(ids(&second.children), ["tspan_1"]);
    assert_eq!(second.children[0].text.as_deref(), Some("1 & !"));
    assert!(out.contains(">1 &amp; !</tspan></text>"));

    assert_eq!(
        root.children[2].text.as_deref(),
        Some(
            ".rect_0 {fill:#ffffff;stroke:#000000;stroke-width:0.5}\n\
             .path_0 {fill:none;stroke:#000000;stroke-width:0.25}\n\
             .tspan_0 {pointer-events:none;font-size:4px;fill:#000000}\n\
             .text_0 {font-size:4px;fill:#000000}"
        )
    );
}

#[test]
fn schematic_fixture() {
    let document = parse_document(&fixture("schematic.svg")).unwrap();
    let result = fixup(document, &FixupConfig::schematic()).unwrap();

    assert_eq!(result.report.layers.retained, ["Schematic"]);
    assert_eq!(result.report.layers.removed, ["Helpers", "Notes"]);
    assert_eq!(result.report.prune.elements_removed, 1);
    assert_eq!(result.report.prune.attributes_removed, 6);
    assert_eq!(result.report.engine.color_variables, 3);
    assert_eq!(result.report.engine.rewritten_declarations, 4);

    let out = write_document(&result.document).unwrap();
    assert!(!out.contains("inkscape"));
    assert!(!out.contains("sodipodi"));
    assert!(out.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
    assert!(out.contains(r##"xlink:href="#rect132""##));

    let root = parse_document(&out).unwrap().root;
    assert_eq!(kinds(&root.children), ["title", "defs", "style", "g"]);
    assert_eq!(root.children[0].text.as_deref(), Some("6502 minimal"));

    let marker = &root.children[1].children[0];
    assert_eq!(marker.attr(&attr::ID), Some("Arrow1Lend"));
    assert_eq!(marker.attr(&attr::ISSTOCK), None);

    let schematic = &root.children[3];
    assert_eq!(schematic.attr(&attr::ID), Some("Schematic"));
    assert_eq!(
        ids(&schematic.children),
        ["wire#power/3v3_0", "wire#clk_0", "wire#clk_1", "chip#u1_0"]
    );
    let power = &schematic.children[0];
    assert_eq!(ids(&power.children), ["path_0", "circle_0", "text_0"]);
    let clk_paths: Vec<_> = schematic.children[1..3]
        .iter()
        .map(|wire| wire.children[0].attr(&attr::CLASS))
        .collect();
    assert_eq!(clk_paths, [Some("path_1"), Some("path_1")]);
    assert_eq!(
        schematic.children[1].children[0].attr(&QName::unqualified("marker-end")),
        Some("url(#Arrow1Lend)")
    );

    let css = root.children[2].text.as_deref().unwrap();
    let rules: Vec<&str> = css.lines().collect();
    assert_eq!(
        rules,
        [
            ":root {--color-powerbar3v3:#000000;--color-clk:#000000;--color-u1:#000000;}",
            ".path_0 {fill:none;stroke:var(--color-powerbar3v3);stroke-width:0.5}",
            ".circle_0 {fill:var(--color-powerbar3v3);stroke:none}",
            ".text_0 {font-size:3px;fill:#ff0000}",
            ".path_1 {fill:none;stroke:var(--color-clk);stroke-width:0.5}",
            ".rect_0 {fill:#ffffff;stroke:#000000;stroke-width:0.5}",
        ]
    );
}

#[test]
fn schematic_variant_on_keyboard_drawing_fails() {
    let document = parse_document(&fixture("keyboard.svg")).unwrap();
    let err = fixup(document, &FixupConfig::schematic()).unwrap_err();
    assert!(matches!(err, FixupError::LayerNotFound { .. }));
    assert_eq!(err.to_string(), "Schematic layer not found");
}

#[test]
fn keyboard_variant_on_schematic_keeps_every_layer() {
    let (_, root) = round_trip("schematic.svg", &FixupConfig::keyboard());
    let layer_ids: Vec<_> = root
        .children
        .iter()
        .filter(|e| e.is_svg("g"))
        .map(|e| e.attr(&attr::ID).unwrap_or_default())
        .collect();
    assert_eq!(layer_ids, ["Helpers", "Schematic", "Notes"]);

    let css = root.children[2].text.as_deref().unwrap();
    assert!(!css.contains(":root"));
    assert!(!css.contains("var("));
}
