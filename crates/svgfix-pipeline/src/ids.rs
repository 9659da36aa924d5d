//! Unique element ids.
//!
//! Every element the engine visits gets an id derived from a base name
//! (its editor label, or its kind when unlabeled). The [`IdNumbering`]
//! policy decides whether the first use of a base is bare or numbered.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// How the first id for a given base name is formed.
///
/// Downstream consumers may depend on the chosen scheme: the schematic
/// viewer finds wires with `[id^='wire#']` and cuts the signal name at
/// the first `_`, so schematics need [`SuffixFromZero`](Self::SuffixFromZero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdNumbering {
    /// `base`, `base_1`, `base_2`, ...
    #[default]
    BareFirst,
    /// `base_0`, `base_1`, `base_2`, ...
    SuffixFromZero,
}

/// Allocates ids that are unique for the duration of one run.
///
/// Ids registered with [`reserve`](Self::reserve) (e.g. ids of `<defs>`
/// content the engine does not touch) are never handed out again.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    numbering: IdNumbering,
    next_suffix: HashMap<String, usize>,
    taken: HashSet<String>,
    assigned: usize,
}

impl IdRegistry {
    /// Create an empty registry using the given numbering policy.
    #[must_use]
    pub fn new(numbering: IdNumbering) -> Self {
        Self {
            numbering,
            ..Self::default()
        }
    }

    /// Mark `id` as in use. Returns `false` if it already was.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.taken.insert(id.to_owned())
    }

    /// Returns `true` if `id` has been assigned or reserved.
    #[must_use]
    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Take `wanted` as an id if it is free, else the first free
    /// `wanted_1`, `wanted_2`, ...
    ///
    /// Unlike [`assign`](Self::assign), a free id is always used as is,
    /// whatever the numbering policy.
    pub fn claim(&mut self, wanted: &str) -> String {
        let id = if self.is_taken(wanted) {
            (1_usize..)
                .map(|n| format!("{wanted}_{n}"))
                .find(|candidate| !self.is_taken(candidate))
                .unwrap_or_default()
        } else {
            wanted.to_owned()
        };
        self.taken.insert(id.clone());
        id
    }

    /// Allocate the next free id for `base`.
    ///
    /// Candidates that collide with an earlier id (assigned or reserved)
    /// are skipped, so a label like `path_1` cannot clash with the
    /// numbered ids generated for unlabeled paths.
    pub fn assign(&mut self, base: &str) -> String {
        let mut suffix = match (self.next_suffix.get(base), self.numbering) {
            (Some(&next), _) => Some(next),
            (None, IdNumbering::BareFirst) => None,
            (None, IdNumbering::SuffixFromZero) => Some(0),
        };

        loop {
            let candidate = suffix.map_or_else(|| base.to_owned(), |n| format!("{base}_{n}"));
            let next = suffix.map_or(1, |n| n + 1);

            if self.taken.insert(candidate.clone()) {
                self.next_suffix.insert(base.to_owned(), next);
                self.assigned += 1;
                return candidate;
            }
            suffix = Some(next);
        }
    }

    /// Number of ids handed out by [`assign`](Self::assign).
    #[must_use]
    pub const fn assigned(&self) -> usize {
        self.assigned
    }
}
