//! AST traversal and printing utilities for documentation extraction.

pub mod location;
pub mod unparse;
pub mod walk;

pub use location::LineIndex;
pub use unparse::{constant_repr, unparse};
pub use walk::{clean_doc, docstring_of, flat_body};
