//! Fixup diagnostics: what each stage removed, kept, and produced.
//!
//! Every call to [`fixup`](crate::fixup) collects a [`FixupReport`]
//! alongside the rewritten document. The CLI prints it with `--report`
//! or as JSON with `--json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layer::LayerStats;
use crate::prune::PruneStats;
use crate::stylesheet::StylesheetStats;

/// Counters collected by the style deduplication engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Elements visited below the selected layers.
    pub elements_visited: usize,
    /// Ids handed out.
    pub ids_assigned: usize,
    /// Elements whose inline style was replaced by a class.
    pub styles_collapsed: usize,
    /// `stroke`/`fill` declarations redirected to a color variable.
    pub rewritten_declarations: usize,
    /// Declarations without `:` left untouched during color rewriting.
    pub skipped_declarations: usize,
    /// Labels containing the separator that were not valid group labels.
    pub rejected_labels: usize,
    /// Classes allocated per element kind.
    pub classes: BTreeMap<String, usize>,
    /// Distinct color variables registered.
    pub color_variables: usize,
}

impl EngineStats {
    /// Total classes across all kinds.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.values().sum()
    }
}

/// Diagnostics collected from a single fixup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixupReport {
    /// Structural pruning.
    pub prune: PruneStats,
    /// Layer selection.
    pub layers: LayerStats,
    /// Style deduplication.
    pub engine: EngineStats,
    /// Stylesheet emission.
    pub stylesheet: StylesheetStats,
}

impl FixupReport {
    /// Render a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Fixup Report\n{}", "=".repeat(60)));

        lines.push(format!(
            "{:<24} {} elements, {} attributes removed",
            "Prune", self.prune.elements_removed, self.prune.attributes_removed,
        ));
        lines.push(format!(
            "{:<24} kept [{}], removed [{}]",
            "Layers",
            self.layers.retained.join(", "),
            self.layers.removed.join(", "),
        ));
        lines.push(format!(
            "{:<24} {} elements, {} ids, {} styles -> {} classes",
            "Deduplicate",
            self.engine.elements_visited,
            self.engine.ids_assigned,
            self.engine.styles_collapsed,
            self.engine.class_count(),
        ));
        lines.push(format!(
            "{:<24} {} variables, {} declarations rewritten",
            "Colors", self.engine.color_variables, self.engine.rewritten_declarations,
        ));
        lines.push(format!(
            "{:<24} {} rules, {} bytes",
            "Stylesheet", self.stylesheet.rules, self.stylesheet.css_bytes,
        ));

        if !self.engine.classes.is_empty() {
            lines.push(String::new());
            lines.push(format!("{:<24} {:>8}", "Kind", "Classes"));
            lines.push("-".repeat(33));
            for (kind, count) in &self.engine.classes {
                lines.push(format!("{kind:<24} {count:>8}"));
            }
        }

        let warnings = self.engine.skipped_declarations
            + self.engine.rejected_labels
            + self.layers.id_collisions;
        if warnings > 0 {
            lines.push(String::new());
            lines.push(format!(
                "Warnings: {} malformed declarations skipped, {} group labels rejected, \
                 {} layer ids renamed",
                self.engine.skipped_declarations,
                self.engine.rejected_labels,
                self.layers.id_collisions,
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> FixupReport {
        FixupReport {
            prune: PruneStats {
                elements_removed: 2,
                attributes_removed: 5,
            },
            layers: LayerStats {
                retained: vec!["Schematic".to_owned()],
                removed: vec!["Helpers".to_owned()],
                id_collisions: 0,
            },
            engine: EngineStats {
                elements_visited: 40,
                ids_assigned: 40,
                styles_collapsed: 35,
                rewritten_declarations: 12,
                skipped_declarations: 0,
                rejected_labels: 1,
                classes: BTreeMap::from([("path".to_owned(), 4), ("text".to_owned(), 2)]),
                color_variables: 3,
            },
            stylesheet: StylesheetStats {
                rules: 7,
                css_bytes: 300,
            },
        }
    }

    #[test]
    fn report_mentions_every_stage() {
        let text = sample().report();
        assert!(text.starts_with("Fixup Report"));
        assert!(text.contains("kept [Schematic], removed [Helpers]"));
        assert!(text.contains("35 styles -> 6 classes"));
        assert!(text.contains("3 variables, 12 declarations rewritten"));
        assert!(text.contains("1 group labels rejected"));
    }

    #[test]
    fn report_omits_warnings_when_clean() {
        let text = FixupReport::default().report();
        assert!(!text.contains("Warnings"));
        assert!(!text.contains("Kind"));
    }

    #[test]
    fn renamed_layers_are_a_warning() {
        let mut report = FixupReport::default();
        report.layers.id_collisions = 2;
        assert!(report.report().contains("2 layer ids renamed"));
    }

    #[test]
    fn json_round_trip() {
        let report = sample();
        let json = serde_json::to_string(&report).unwrap();
        let back: FixupReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
