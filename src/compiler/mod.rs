//! The documentation compiler: extraction, merge and render over one shared
//! symbol model.
//!
//! Usage:
//!
//! ```
//! use apimark::{Compiler, Options};
//!
//! let source = "\"\"\"Package.\"\"\"\n\ndef run() -> int:\n    \"\"\"Run it.\"\"\"\n";
//! let mut compiler = Compiler::new(Options::default());
//! compiler.parse("pkg", source).unwrap();
//! let markdown = compiler.compile();
//! assert!(markdown.contains("Module `pkg`"));
//! assert!(markdown.contains("run()"));
//! ```

pub mod extract;
pub mod merge;
pub mod model;
pub mod render;

pub use model::SymbolModel;

use crate::ast::LineIndex;
use crate::errors::Diagnostics;
use crate::frontend::Options;

/// Drives a whole documentation run: feed each module through [`parse`],
/// then call [`compile`] once.
///
/// [`parse`]: Compiler::parse
/// [`compile`]: Compiler::compile
#[derive(Debug, Default)]
pub struct Compiler {
    pub opts: Options,
    pub model: SymbolModel,
    pub diags: Diagnostics,
    /// Line index of the module currently being extracted.
    pub(crate) index: LineIndex,
}

impl Compiler {
    pub fn new(opts: Options) -> Self {
        Self {
            opts: opts.normalized(),
            model: SymbolModel::new(),
            diags: Diagnostics::new(),
            index: LineIndex::default(),
        }
    }

    /// Docstring-only fallback for modules without textual source; see
    /// [`SymbolModel::supply_docstring`].
    pub fn supply_docstring(&mut self, name: &str, doc: &str) -> bool {
        self.model.supply_docstring(name, doc)
    }
}
