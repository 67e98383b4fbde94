//! Statement traversal for documentation extraction.
//!
//! Declarations guarded by `if`/`try` blocks are still part of the static
//! API surface, so those bodies are flattened to the surrounding nesting
//! level instead of being treated as separate scopes.

use rustpython_parser::ast::{Constant, ExceptHandler, Expr, Stmt};

fn flatten<'a>(body: &'a [Stmt], out: &mut Vec<&'a Stmt>) {
    for stmt in body {
        match stmt {
            Stmt::If(node) => {
                flatten(&node.body, out);
                flatten(&node.orelse, out);
            }
            Stmt::Try(node) => {
                flatten(&node.body, out);
                for handler in &node.handlers {
                    let ExceptHandler::ExceptHandler(h) = handler;
                    flatten(&h.body, out);
                }
                flatten(&node.orelse, out);
                flatten(&node.finalbody, out);
            }
            Stmt::TryStar(node) => {
                flatten(&node.body, out);
                for handler in &node.handlers {
                    let ExceptHandler::ExceptHandler(h) = handler;
                    flatten(&h.body, out);
                }
                flatten(&node.orelse, out);
                flatten(&node.finalbody, out);
            }
            _ => out.push(stmt),
        }
    }
}

/// Traverse a statement body with conditional and exception-handling blocks
/// flattened into the surrounding scope.
pub fn flat_body(body: &[Stmt]) -> Vec<&Stmt> {
    let mut out = Vec::with_capacity(body.len());
    flatten(body, &mut out);
    out
}

/// Extract the docstring of a body: its first statement, when that is a
/// bare string constant. The text is cleaned the way `inspect.cleandoc`
/// does so indented docstrings render flush left.
pub fn docstring_of(body: &[Stmt]) -> Option<String> {
    if let Some(Stmt::Expr(node)) = body.first() {
        if let Expr::Constant(constant) = node.value.as_ref() {
            if let Constant::Str(text) = &constant.value {
                return Some(clean_doc(text));
            }
        }
    }
    None
}

/// Normalize docstring indentation: strip leading whitespace from the first
/// line, remove the common leading whitespace of the remaining lines, and
/// drop blank lines at both ends.
pub fn clean_doc(doc: &str) -> String {
    let mut lines: Vec<String> = doc.split('\n').map(|l| l.to_string()).collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    for line in lines.iter_mut().skip(1) {
        if line.len() >= margin {
            *line = line[margin..].to_string();
        } else {
            *line = line.trim_start().to_string();
        }
    }
    while lines.first().map_or(false, |l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
