//! The shared symbol model for one documentation run.
//!
//! Built incrementally by the extractor (one module at a time, any order),
//! rewritten once by the merge pass, then read by the renderer. Ordered maps
//! keep every traversal deterministic so identical inputs render identical
//! output.

use std::collections::{BTreeMap, BTreeSet};

use crate::markdown::doctest;

/// Aggregate of everything the compiler knows about the declarations seen
/// so far, keyed by fully-qualified dotted names.
#[derive(Debug, Default)]
pub struct SymbolModel {
    /// Unfinalized text template per declaration. The placeholders are
    /// filled with the final name and anchor slug at render time.
    pub docs: BTreeMap<String, String>,
    /// Doctest-fenced docstring text.
    pub docstrings: BTreeMap<String, String>,
    /// Nesting depth of the declaring module (its dot count).
    pub levels: BTreeMap<String, usize>,
    /// Per-module export allow-list (`__all__`), fully qualified. An empty
    /// set means the module declared no restriction.
    pub exports: BTreeMap<String, BTreeSet<String>>,
    /// Literal right-hand expression for every import and single-name
    /// assignment. Append-only during extraction.
    pub aliases: BTreeMap<String, String>,
    /// The module that declares each symbol.
    pub owners: BTreeMap<String, String>,
    /// Type descriptors for UPPERCASE module-level names.
    pub consts: BTreeMap<String, String>,
}

impl SymbolModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a name denotes a module (namespace) entry.
    pub fn is_module(&self, name: &str) -> bool {
        self.exports.contains_key(name)
    }

    /// Docstring-only fallback for extension modules: a collaborator that
    /// introspected a live module may supply text for names that are
    /// already registered. Unknown names are ignored.
    pub fn supply_docstring(&mut self, name: &str, doc: &str) -> bool {
        if !self.docs.contains_key(name) {
            return false;
        }
        self.docstrings.insert(name.to_string(), doctest(doc));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_docstring_requires_registration() {
        let mut model = SymbolModel::new();
        assert!(!model.supply_docstring("m.f", "text"));
        model.docs.insert("m.f".to_string(), String::new());
        assert!(model.supply_docstring("m.f", "text"));
        assert_eq!(model.docstrings.get("m.f").map(String::as_str), Some("text"));
    }
}
