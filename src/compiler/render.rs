//! Deterministic rendering of the finalized symbol model.

use tracing::{info, instrument};

use crate::errors::Diagnostic;
use crate::markdown::{code, table};
use crate::names::{is_lower_name, is_magic, strip_prefix_or};

use super::{Compiler, SymbolModel};

/// Fill the positional `{}` placeholders of a declaration template.
fn fill(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for arg in args {
        out = out.replacen("{}", arg, 1);
    }
    out
}

impl SymbolModel {
    /// Sort key for rendering: declaring-module depth first, then the
    /// case-folded name, with mixed-case names after plain lowercase ones.
    fn render_key(&self, name: &str) -> (usize, String, bool) {
        let level = self.levels.get(name).copied().unwrap_or(0);
        (level, name.to_lowercase(), !is_lower_name(name))
    }

    /// Constants table for one module, restricted to its own public
    /// UPPERCASE names, sorted by their simple name.
    fn constants_table(&self, module: &str) -> String {
        let dotted = format!("{}.", module);
        let rows: Vec<[String; 2]> = self
            .consts
            .iter()
            .filter(|(name, _)| {
                self.owners.get(*name).map(String::as_str) == Some(module) && self.is_public(name)
            })
            .map(|(name, ty)| [code(strip_prefix_or(name, &dotted)), code(ty)])
            .collect();
        if rows.is_empty() {
            String::new()
        } else {
            table(&["Constants", "Type"], rows)
        }
    }
}

impl Compiler {
    /// Fold re-exports, then serialize every public declaration in sorted
    /// order. Magic names without documentation are skipped silently; any
    /// other public declaration without a docstring is reported.
    #[instrument(skip(self))]
    pub fn compile(&mut self) -> String {
        self.model.fold_aliases();
        info!(declarations = self.model.docs.len(), "rendering documentation");

        let mut names: Vec<String> = self.model.docs.keys().cloned().collect();
        names.sort_by_cached_key(|name| self.model.render_key(name));

        let mut toc = vec!["**Table of contents:**".to_string()];
        let mut blocks: Vec<String> = Vec::new();
        for name in names {
            if !self.model.is_public(&name) {
                continue;
            }
            let link = name.to_lowercase().replace('.', "-");
            let template = match self.model.docs.get(&name) {
                Some(template) => template,
                None => continue,
            };
            let mut doc = if self.opts.link {
                fill(template, &[&name, &link])
            } else {
                fill(template, &[&name])
            };
            if self.model.is_module(&name) {
                doc.push_str(&self.model.constants_table(&name));
            }
            if let Some(docstring) = self.model.docstrings.get(&name) {
                doc.push_str(docstring);
            } else if is_magic(&name) {
                continue;
            } else {
                self.diags
                    .warn(Diagnostic::MissingDocumentation { name: name.clone() });
            }
            let owner = self.model.owners.get(&name).map(String::as_str).unwrap_or("");
            let depth = strip_prefix_or(&name, owner).matches('.').count();
            toc.push(format!(
                "{}+ [{}](#{})",
                "    ".repeat(depth),
                code(&name),
                link
            ));
            blocks.push(doc.trim_end().to_string());
        }
        if self.opts.toc {
            format!("{}\n\n{}\n", toc.join("\n"), blocks.join("\n\n"))
        } else {
            format!("{}\n", blocks.join("\n\n"))
        }
    }
}
