//! Inline style handling: class deduplication and color rewriting.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

/// Maps inline style strings to shared CSS classes.
///
/// Classes are scoped by element kind: the same declaration on a `path`
/// and a `rect` yields `path_N` and `rect_M`. Within a kind, the same
/// declaration string always maps to the same class. Class numbers are
/// handed out per kind in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    prefixes: BTreeMap<String, String>,
    /// kind -> (declaration -> class)
    lookup: HashMap<String, HashMap<String, String>>,
    /// class -> declaration, in allocation order.
    rules: IndexMap<String, String>,
    /// kind -> classes allocated so far.
    counters: BTreeMap<String, usize>,
}

impl StyleRegistry {
    /// Create an empty registry.
    ///
    /// `prefixes` maps an element kind to declarations prepended to its
    /// style before lookup (e.g. `tspan` -> `pointer-events:none;`).
    #[must_use]
    pub fn new(prefixes: BTreeMap<String, String>) -> Self {
        Self {
            prefixes,
            ..Self::default()
        }
    }

    /// Return the class for `style` on an element of `kind`, allocating
    /// one if this declaration has not been seen for this kind yet.
    pub fn class_for(&mut self, kind: &str, style: &str) -> String {
        let declaration = match self.prefixes.get(kind) {
            Some(prefix) => format!("{prefix}{style}"),
            None => style.to_owned(),
        };

        let by_declaration = self.lookup.entry(kind.to_owned()).or_default();
        if let Some(class) = by_declaration.get(&declaration) {
            return class.clone();
        }

        let counter = self.counters.entry(kind.to_owned()).or_insert(0);
        let class = format!("{kind}_{counter}");
        *counter += 1;

        by_declaration.insert(declaration.clone(), class.clone());
        self.rules.insert(class.clone(), declaration);
        class
    }

    /// `(class, declaration)` pairs in allocation order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|(class, declaration)| (class.as_str(), declaration.as_str()))
    }

    /// Number of classes allocated per kind.
    #[must_use]
    pub const fn classes_per_kind(&self) -> &BTreeMap<String, usize> {
        &self.counters
    }

    /// Total number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no class has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Outcome of [`rewrite_colors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRewrite {
    /// The rewritten style string.
    pub style: String,
    /// Declarations now pointing at the variable.
    pub rewritten: usize,
    /// Declarations without a `key:value` separator, left untouched.
    pub skipped: Vec<String>,
}

/// Point every `stroke` and `fill` declaration in `style` at the CSS
/// variable `variable`, except those whose value is `none`.
///
/// The rest of the string is preserved byte for byte. Empty segments
/// (e.g. from a trailing `;`) are kept as-is; segments without a `:` are
/// kept and reported in [`ColorRewrite::skipped`].
#[must_use]
pub fn rewrite_colors(style: &str, variable: &str) -> ColorRewrite {
    let mut rewritten = 0;
    let mut skipped = Vec::new();

    let declarations: Vec<String> = style
        .split(';')
        .map(|declaration| {
            if declaration.trim().is_empty() {
                return declaration.to_owned();
            }
            let Some((key, value)) = declaration.split_once(':') else {
                skipped.push(declaration.to_owned());
                return declaration.to_owned();
            };
            let key = key.trim();
            if matches!(key, "stroke" | "fill") && !value.trim().eq_ignore_ascii_case("none") {
                rewritten += 1;
                format!("{key}:var({variable})")
            } else {
                declaration.to_owned()
            }
        })
        .collect();

    ColorRewrite {
        style: declarations.join(";"),
        rewritten,
        skipped,
    }
}
