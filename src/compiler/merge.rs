//! Re-export folding and public-visibility rules.
//!
//! Runs once, globally, after every module has been extracted. Folding
//! migrates documented entries to the shorter path they are re-exported
//! under; visibility stays a computed property and is never stored.

use tracing::{debug, instrument};

use crate::names::{is_public_family, parent, strip_prefix_or, strip_suffix_or};

use super::SymbolModel;

impl SymbolModel {
    /// The alias-merge test: `target` must live directly above or below the
    /// scope the alias name belongs to. This deliberately narrow string
    /// surgery separates a genuine re-export from an unrelated symbol that
    /// happens to share a name.
    fn is_immediate_family(&self, name: &str, target: &str) -> bool {
        let owner = self.owners.get(target).map(String::as_str).unwrap_or("");
        let suffix = strip_prefix_or(target, owner);
        target.starts_with(strip_suffix_or(name, suffix))
    }

    /// Fold re-exported declarations onto their public alias path. Every
    /// documented key prefixed by the alias target migrates atomically:
    /// the old key leaves `docs`, `docstrings`, `levels` and `consts` in
    /// the same operation that inserts the new one.
    #[instrument(skip(self))]
    pub fn fold_aliases(&mut self) {
        let aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(n, a)| (n.clone(), a.clone()))
            .collect();
        for (name, target) in aliases {
            if !self.docs.contains_key(&target) || !self.is_immediate_family(&name, &target) {
                continue;
            }
            let children: Vec<String> = self
                .docs
                .keys()
                .filter(|key| key.starts_with(&target))
                .cloned()
                .collect();
            for child in children {
                let migrated = format!("{}{}", name, strip_prefix_or(&child, &target));
                debug!(from = %child, to = %migrated, "folding re-export");
                if let Some(doc) = self.docs.remove(&child) {
                    self.docs.insert(migrated.clone(), doc);
                }
                let docstring = self.docstrings.remove(&child).unwrap_or_default();
                self.docstrings.insert(migrated.clone(), docstring);
                let owner = self.owners.remove(&child).unwrap_or_default();
                let local = strip_prefix_or(&child, &owner).to_string();
                let new_owner = strip_suffix_or(&migrated, &local).to_string();
                self.levels.remove(&child);
                self.levels
                    .insert(migrated.clone(), new_owner.matches('.').count());
                self.owners.insert(migrated.clone(), new_owner);
                if let Some(ty) = self.consts.remove(&child) {
                    self.consts.insert(migrated, ty);
                }
            }
        }
    }

    /// Whether a name appears in the rendered output.
    ///
    /// A module with nothing public underneath it is hidden. A declared
    /// `__all__` admits the module itself, the listed names and their direct
    /// children; without one, plain underscore names are private.
    pub fn is_public(&self, name: &str) -> bool {
        if self.is_module(name) {
            let dotted = format!("{}.", name);
            let has_public_child = self
                .docs
                .keys()
                .chain(self.consts.keys())
                .any(|child| child.starts_with(&dotted) && is_public_family(child));
            if !has_public_child {
                return false;
            }
        }
        let owner = self.owners.get(name).map(String::as_str).unwrap_or("");
        match self.exports.get(owner) {
            Some(listed) if !listed.is_empty() => {
                name == owner || listed.contains(name) || listed.contains(parent(name, 1))
            }
            _ => is_public_family(name),
        }
    }
}
