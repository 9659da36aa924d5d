//! Group labels and CSS color variables.
//!
//! Inkscape labels double as a tiny naming convention:
//! `<grouptype>#<color>` marks a group (e.g. `wire#clk` or
//! `wire#power/3v3`) whose color token becomes a CSS custom property
//! `--color-<token>`. The viewer sets these properties at runtime to
//! highlight signals.

use indexmap::IndexMap;

/// A label of the form `<grouptype><sep><color>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLabel<'a> {
    /// The part before the separator (e.g. `wire`).
    pub group_type: &'a str,
    /// The part after the separator (e.g. `power/3v3`).
    pub color: &'a str,
}

/// Why a label containing the separator is not a valid group label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    /// More than one separator; the split would be ambiguous.
    #[error("label contains more than one '{0}' separator")]
    MultipleSeparators(char),
    /// Nothing before the separator.
    #[error("label has an empty group type")]
    EmptyGroupType,
    /// Nothing after the separator.
    #[error("label has an empty color")]
    EmptyColor,
}

impl<'a> GroupLabel<'a> {
    /// Parse a label.
    ///
    /// Returns `Ok(None)` for plain labels without a separator.
    ///
    /// # Errors
    ///
    /// Returns a [`LabelError`] if the label has more than one separator
    /// or an empty side. Such labels are still usable as id bases.
    pub fn parse(label: &'a str, separator: char) -> Result<Option<Self>, LabelError> {
        let Some((group_type, color)) = label.split_once(separator) else {
            return Ok(None);
        };
        if color.contains(separator) {
            return Err(LabelError::MultipleSeparators(separator));
        }
        if group_type.is_empty() {
            return Err(LabelError::EmptyGroupType);
        }
        if color.is_empty() {
            return Err(LabelError::EmptyColor);
        }
        Ok(Some(Self { group_type, color }))
    }
}

/// Derive the CSS custom property name for a color token.
///
/// `/` is not allowed in a CSS identifier and becomes `bar`, so
/// `power/3v3` maps to `--color-powerbar3v3`.
#[must_use]
pub fn color_variable_name(token: &str) -> String {
    format!("--color-{}", token.replace('/', "bar"))
}

/// Registered color variables, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ColorVariableTable {
    default_value: String,
    variables: IndexMap<String, String>,
}

impl ColorVariableTable {
    /// Create an empty table whose variables default to `default_value`.
    #[must_use]
    pub fn new(default_value: impl Into<String>) -> Self {
        Self {
            default_value: default_value.into(),
            variables: IndexMap::new(),
        }
    }

    /// Register the variable for `token` (once) and return its name.
    pub fn register(&mut self, token: &str) -> String {
        let name = color_variable_name(token);
        self.variables
            .entry(name.clone())
            .or_insert_with(|| self.default_value.clone());
        name
    }

    /// Variables and their placeholder values, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of registered variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns `true` if no variables have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
