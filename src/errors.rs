//! Diagnostic taxonomy for a documentation run.
//!
//! Nothing here aborts a run: syntax errors isolate the offending module,
//! everything else is a warning attached to the rendered result.

use std::fmt;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A module's source failed to parse; its declarations are absent from
    /// the output while the rest of the run continues.
    ParseFailure { module: String, message: String },
    /// A deprecated generic spelling was rewritten to its canonical form.
    DeprecatedSpelling {
        line: usize,
        col: usize,
        found: String,
        replacement: String,
    },
    /// A public, non-magic declaration carries no docstring.
    MissingDocumentation { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFailure { module, message } => {
                write!(f, "failed to parse module {}: {}", module, message)
            }
            Self::DeprecatedSpelling { line, col, found, replacement } => {
                write!(
                    f,
                    "{}:{}: find deprecated name {}, recommended to use {}",
                    line, col, found, replacement
                )
            }
            Self::MissingDocumentation { name } => {
                write!(f, "missing documentation for {}", name)
            }
        }
    }
}

/// Collector for the diagnostics of one compilation run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning-level diagnostic.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    /// Record an error-level diagnostic. Errors here are still isolated to
    /// one module; the run carries on.
    pub fn error(&mut self, diagnostic: Diagnostic) {
        error!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let d = Diagnostic::DeprecatedSpelling {
            line: 3,
            col: 4,
            found: "typing.List".to_string(),
            replacement: "list".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "3:4: find deprecated name typing.List, recommended to use list"
        );
    }

    #[test]
    fn test_collector() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.warn(Diagnostic::MissingDocumentation { name: "m.f".to_string() });
        assert_eq!(diags.len(), 1);
    }
}
