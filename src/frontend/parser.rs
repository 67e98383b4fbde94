use rustpython_parser::ast::{Expr, Mod, ModExpression, ModModule};
use rustpython_parser::{parse, Mode};
use tracing::{debug, instrument, trace};

pub type ParseError = String;

/// Parse one module's source into its statement tree.
#[instrument(skip(source), fields(source_len = source.len()))]
pub fn parse_module(source: &str) -> Result<ModModule, ParseError> {
    trace!("parsing module");
    match parse(source, Mode::Module, "<module>") {
        Ok(Mod::Module(module)) => Ok(module),
        Ok(_) => Err("expected a module".to_string()),
        Err(e) => {
            debug!(error = %e, "failed to parse module");
            Err(format!("parse error: {}", e))
        }
    }
}

/// Parse a single expression, as needed for string-literal forward
/// references and alias expansion.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    match parse(source, Mode::Expression, "<expression>") {
        Ok(Mod::Expression(ModExpression { body, .. })) => Ok(*body),
        Ok(_) => Err("expected an expression".to_string()),
        Err(e) => Err(format!("parse error: {}", e)),
    }
}
