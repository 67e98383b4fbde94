//! Annotation resolution.
//!
//! Rewrites a type-annotation expression into its canonical, human-readable
//! form: string-literal forward references are re-parsed, import aliases and
//! type aliases expand transparently, `Union`/`Optional` sugar becomes `|`
//! chains, deprecated generic spellings are replaced by their PEP 585 form,
//! and the `typing.` prefix is dropped. Names that resolve to nothing pass
//! through verbatim; resolution never fails.

pub mod pep585;

use std::collections::BTreeMap;

use rustpython_parser::ast::{
    Constant, Expr, ExprAttribute, ExprBinOp, ExprConstant, ExprContext, ExprName, ExprSubscript,
    ExprTuple, Identifier, Operator,
};

use crate::ast::{unparse, LineIndex};
use crate::errors::{Diagnostic, Diagnostics};
use crate::frontend::parse_expression;
use crate::names::join;
use pep585::PEP585;

/// Placeholder type for everything that carries no usable annotation.
pub const ANY: &str = "Any";

fn name_expr(id: &str) -> Expr {
    Expr::Name(ExprName {
        id: Identifier::new(id),
        ctx: ExprContext::Load,
        range: Default::default(),
    })
}

fn none_expr() -> Expr {
    Expr::Constant(ExprConstant {
        value: Constant::None,
        kind: None,
        range: Default::default(),
    })
}

fn bitor(left: Expr, right: Expr) -> Expr {
    Expr::BinOp(ExprBinOp {
        left: Box::new(left),
        op: Operator::BitOr,
        right: Box::new(right),
        range: Default::default(),
    })
}

/// Rewrites annotation expressions against one module's alias table.
pub struct Resolver<'a> {
    module: &'a str,
    aliases: &'a BTreeMap<String, String>,
    self_ty: &'a str,
    index: &'a LineIndex,
    diags: &'a mut Diagnostics,
    /// Aliases currently being expanded; blocks cycles such as the alias a
    /// plain `import enum` records for the name `enum`.
    expanding: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        module: &'a str,
        aliases: &'a BTreeMap<String, String>,
        self_ty: &'a str,
        index: &'a LineIndex,
        diags: &'a mut Diagnostics,
    ) -> Self {
        Self { module, aliases, self_ty, index, diags, expanding: Vec::new() }
    }

    /// Resolve an annotation expression to its canonical source form.
    pub fn resolve(&mut self, expr: &Expr) -> String {
        let folded = self.fold(expr.clone());
        unparse(&folded)
    }

    fn fold(&mut self, expr: Expr) -> Expr {
        match expr {
            // A string constant that parses as an expression is a forward
            // reference; anything else stays opaque.
            Expr::Constant(node) => {
                if let Constant::Str(text) = &node.value {
                    if let Ok(parsed) = parse_expression(text) {
                        return self.fold(parsed);
                    }
                }
                Expr::Constant(node)
            }
            Expr::Name(node) => {
                if !self.self_ty.is_empty() && node.id.as_str() == self.self_ty {
                    return name_expr("Self");
                }
                let full = join([self.module, node.id.as_str()]);
                if let Some(target) = self.aliases.get(&full).cloned() {
                    // A self-referential alias would expand forever.
                    if !target.contains(full.as_str()) && !self.expanding.contains(&full) {
                        if let Ok(parsed) = parse_expression(&target) {
                            if !self.is_type_var(&parsed) {
                                self.expanding.push(full);
                                let folded = self.fold(parsed);
                                self.expanding.pop();
                                return folded;
                            }
                        }
                    }
                }
                Expr::Name(node)
            }
            Expr::Subscript(node) => self.fold_subscript(node),
            Expr::Attribute(node) => {
                if let Expr::Name(base) = node.value.as_ref() {
                    if base.id.as_str() == "typing" {
                        return name_expr(node.attr.as_str());
                    }
                }
                let ExprAttribute { value, attr, ctx, range } = node;
                Expr::Attribute(ExprAttribute {
                    value: Box::new(self.fold(*value)),
                    attr,
                    ctx,
                    range,
                })
            }
            mut other => {
                self.fold_children(&mut other);
                other
            }
        }
    }

    /// PEP 604 union sugar and PEP 585 deprecated aliases.
    fn fold_subscript(&mut self, node: ExprSubscript) -> Expr {
        let pos = self.index.locate(&node);
        let ident = match node.value.as_ref() {
            Expr::Name(base) => {
                let full = join([self.module, base.id.as_str()]);
                Some(
                    self.aliases
                        .get(&full)
                        .cloned()
                        .unwrap_or_else(|| base.id.to_string()),
                )
            }
            _ => None,
        };
        let ExprSubscript { value, slice, ctx, range } = node;
        if let Some(id) = ident.as_deref() {
            if id == "typing.Union" {
                return match *slice {
                    Expr::Tuple(ExprTuple { elts, ctx, range }) => {
                        let mut acc: Option<Expr> = None;
                        for elt in elts {
                            let folded = self.fold(elt);
                            acc = Some(match acc {
                                Some(left) => bitor(left, folded),
                                None => folded,
                            });
                        }
                        acc.unwrap_or_else(|| {
                            Expr::Tuple(ExprTuple { elts: Vec::new(), ctx, range })
                        })
                    }
                    other => self.fold(other),
                };
            } else if id == "typing.Optional" {
                return bitor(self.fold(*slice), none_expr());
            } else if let Some(replacement) = PEP585.get(id).copied() {
                let (line, col) = pos;
                self.diags.warn(Diagnostic::DeprecatedSpelling {
                    line,
                    col,
                    found: id.to_string(),
                    replacement: replacement.to_string(),
                });
                return Expr::Subscript(ExprSubscript {
                    value: Box::new(name_expr(replacement)),
                    slice: Box::new(self.fold(*slice)),
                    ctx,
                    range,
                });
            }
        }
        Expr::Subscript(ExprSubscript {
            value: Box::new(self.fold(*value)),
            slice: Box::new(self.fold(*slice)),
            ctx,
            range,
        })
    }

    /// `TypeVar(...)` aliases are generic variables, not expandable types.
    fn is_type_var(&self, expr: &Expr) -> bool {
        if let Expr::Call(call) = expr {
            if let Expr::Name(func) = call.func.as_ref() {
                let full = join([self.module, func.id.as_str()]);
                let ident = self
                    .aliases
                    .get(&full)
                    .map(String::as_str)
                    .unwrap_or(func.id.as_str());
                return ident == "typing.TypeVar";
            }
        }
        false
    }

    fn fold_slot(&mut self, slot: &mut Expr) {
        let owned = std::mem::replace(slot, none_expr());
        *slot = self.fold(owned);
    }

    fn fold_children(&mut self, expr: &mut Expr) {
        match expr {
            Expr::BoolOp(node) => {
                for value in &mut node.values {
                    self.fold_slot(value);
                }
            }
            Expr::NamedExpr(node) => {
                self.fold_slot(&mut node.target);
                self.fold_slot(&mut node.value);
            }
            Expr::BinOp(node) => {
                self.fold_slot(&mut node.left);
                self.fold_slot(&mut node.right);
            }
            Expr::UnaryOp(node) => {
                self.fold_slot(&mut node.operand);
            }
            Expr::Lambda(node) => {
                self.fold_slot(&mut node.body);
            }
            Expr::IfExp(node) => {
                self.fold_slot(&mut node.test);
                self.fold_slot(&mut node.body);
                self.fold_slot(&mut node.orelse);
            }
            Expr::Dict(node) => {
                for key in node.keys.iter_mut().flatten() {
                    self.fold_slot(key);
                }
                for value in &mut node.values {
                    self.fold_slot(value);
                }
            }
            Expr::Set(node) => {
                for elt in &mut node.elts {
                    self.fold_slot(elt);
                }
            }
            Expr::ListComp(node) => {
                self.fold_slot(&mut node.elt);
                self.fold_generators(&mut node.generators);
            }
            Expr::SetComp(node) => {
                self.fold_slot(&mut node.elt);
                self.fold_generators(&mut node.generators);
            }
            Expr::DictComp(node) => {
                self.fold_slot(&mut node.key);
                self.fold_slot(&mut node.value);
                self.fold_generators(&mut node.generators);
            }
            Expr::GeneratorExp(node) => {
                self.fold_slot(&mut node.elt);
                self.fold_generators(&mut node.generators);
            }
            Expr::Await(node) => {
                self.fold_slot(&mut node.value);
            }
            Expr::Yield(node) => {
                if let Some(value) = &mut node.value {
                    self.fold_slot(value);
                }
            }
            Expr::YieldFrom(node) => {
                self.fold_slot(&mut node.value);
            }
            Expr::Compare(node) => {
                self.fold_slot(&mut node.left);
                for comparator in &mut node.comparators {
                    self.fold_slot(comparator);
                }
            }
            Expr::Call(node) => {
                self.fold_slot(&mut node.func);
                for arg in &mut node.args {
                    self.fold_slot(arg);
                }
                for keyword in &mut node.keywords {
                    self.fold_slot(&mut keyword.value);
                }
            }
            Expr::FormattedValue(node) => {
                self.fold_slot(&mut node.value);
            }
            Expr::JoinedStr(_) => {}
            Expr::Starred(node) => {
                self.fold_slot(&mut node.value);
            }
            Expr::List(node) => {
                for elt in &mut node.elts {
                    self.fold_slot(elt);
                }
            }
            Expr::Tuple(node) => {
                for elt in &mut node.elts {
                    self.fold_slot(elt);
                }
            }
            Expr::Slice(node) => {
                if let Some(lower) = &mut node.lower {
                    self.fold_slot(lower);
                }
                if let Some(upper) = &mut node.upper {
                    self.fold_slot(upper);
                }
                if let Some(step) = &mut node.step {
                    self.fold_slot(step);
                }
            }
            // Handled in `fold` before recursion reaches here.
            Expr::Constant(_) | Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => {}
        }
    }

    fn fold_generators(&mut self, generators: &mut [rustpython_parser::ast::Comprehension]) {
        for gen in generators {
            self.fold_slot(&mut gen.target);
            self.fold_slot(&mut gen.iter);
            for cond in &mut gen.ifs {
                self.fold_slot(cond);
            }
        }
    }
}

fn constant_type_name(value: &Constant) -> &'static str {
    match value {
        Constant::None => "NoneType",
        Constant::Bool(_) => "bool",
        Constant::Str(_) => "str",
        Constant::Bytes(_) => "bytes",
        Constant::Int(_) => "int",
        Constant::Float(_) => "float",
        Constant::Complex { .. } => "complex",
        Constant::Ellipsis => "ellipsis",
        Constant::Tuple(_) => "tuple",
    }
}

/// Element types for container literals: `[int, str]` when every element in
/// each group is a literal constant, `[Any]` for mixed groups, empty when
/// inference is not possible.
fn elem_type(groups: &[Vec<&Expr>]) -> String {
    if groups.is_empty() {
        return String::new();
    }
    let mut ts = Vec::with_capacity(groups.len());
    for group in groups {
        if group.is_empty() {
            return String::new();
        }
        let mut t = "";
        for e in group {
            let name = match e {
                Expr::Constant(node) => constant_type_name(&node.value),
                _ => return String::new(),
            };
            if !t.is_empty() && t != name {
                t = ANY;
                break;
            }
            t = name;
        }
        ts.push(t);
    }
    format!("[{}]", ts.join(", "))
}

/// Structural type inference for constant initializers.
pub fn const_type(node: &Expr) -> String {
    match node {
        Expr::Constant(constant) => constant_type_name(&constant.value).to_string(),
        Expr::Tuple(tuple) => format!("tuple{}", elem_type(&[tuple.elts.iter().collect()])),
        Expr::List(list) => format!("list{}", elem_type(&[list.elts.iter().collect()])),
        Expr::Set(set) => format!("set{}", elem_type(&[set.elts.iter().collect()])),
        Expr::Dict(dict) => {
            let mut keys: Vec<&Expr> = Vec::with_capacity(dict.keys.len());
            let mut literal = true;
            for key in &dict.keys {
                match key {
                    Some(k) => keys.push(k),
                    None => {
                        literal = false;
                        break;
                    }
                }
            }
            let elems = if literal {
                elem_type(&[keys, dict.values.iter().collect()])
            } else {
                String::new()
            };
            format!("dict{}", elems)
        }
        Expr::Call(call)
            if matches!(call.func.as_ref(), Expr::Name(_) | Expr::Attribute(_)) =>
        {
            let func = unparse(&call.func);
            if matches!(func.as_str(), "bool" | "int" | "float" | "complex" | "str")
                || PEP585.contains_key(func.as_str())
                || PEP585.values().any(|v| *v == func)
            {
                return func;
            }
            ANY.to_string()
        }
        _ => ANY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_with(
        source: &str,
        aliases: &[(&str, &str)],
        self_ty: &str,
    ) -> (String, Vec<Diagnostic>) {
        let alias_map: BTreeMap<String, String> = aliases
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let index = LineIndex::new(source);
        let mut diags = Diagnostics::new();
        let expr = parse_expression(source).unwrap();
        let mut resolver = Resolver::new("m", &alias_map, self_ty, &index, &mut diags);
        let out = resolver.resolve(&expr);
        (out, diags.iter().cloned().collect())
    }

    #[test]
    fn test_union_rewrite() {
        let (out, warnings) =
            resolve_with("Union[int, str]", &[("m.Union", "typing.Union")], "");
        assert_eq!(out, "int | str");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_optional_rewrite() {
        let (out, _) = resolve_with("Optional[int]", &[("m.Optional", "typing.Optional")], "");
        assert_eq!(out, "int | None");
    }

    #[test]
    fn test_union_single_subscript() {
        let (out, _) = resolve_with("Union[int]", &[("m.Union", "typing.Union")], "");
        assert_eq!(out, "int");
    }

    #[test]
    fn test_deprecated_alias_warns_once() {
        let (out, warnings) = resolve_with("List[int]", &[("m.List", "typing.List")], "");
        assert_eq!(out, "list[int]");
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Diagnostic::DeprecatedSpelling { .. }));
    }

    #[test]
    fn test_nested_deprecated_alias() {
        let (out, warnings) = resolve_with("List[List[int]]", &[("m.List", "typing.List")], "");
        assert_eq!(out, "list[list[int]]");
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_deprecated_alias_position() {
        let (_, warnings) = resolve_with("Dict[str, int]", &[("m.Dict", "typing.Dict")], "");
        assert_eq!(
            warnings[0],
            Diagnostic::DeprecatedSpelling {
                line: 1,
                col: 0,
                found: "typing.Dict".to_string(),
                replacement: "dict".to_string(),
            }
        );
    }

    #[test]
    fn test_alias_transparency() {
        let direct = resolve_with("X.y", &[("m.A", "X")], "").0;
        let aliased = resolve_with("A.y", &[("m.A", "X")], "").0;
        assert_eq!(direct, aliased);
        assert_eq!(aliased, "X.y");
    }

    #[test]
    fn test_type_var_not_expanded() {
        let aliases = [("m.T", "TypeVar('T')"), ("m.TypeVar", "typing.TypeVar")];
        let (out, _) = resolve_with("T", &aliases, "");
        assert_eq!(out, "T");
    }

    #[test]
    fn test_self_type_rewrite() {
        let (out, _) = resolve_with("C", &[], "C");
        assert_eq!(out, "Self");
    }

    #[test]
    fn test_forward_reference_string() {
        let (out, _) = resolve_with("'C'", &[], "C");
        assert_eq!(out, "Self");
    }

    #[test]
    fn test_opaque_string_kept() {
        let (out, _) = resolve_with("'not an expr ('", &[], "");
        assert_eq!(out, "'not an expr ('");
    }

    #[test]
    fn test_typing_prefix_stripped() {
        let (out, _) = resolve_with("typing.Sequence[int]", &[], "");
        assert_eq!(out, "Sequence[int]");
    }

    #[test]
    fn test_unresolvable_passes_through() {
        let (out, _) = resolve_with("SomeUnknown[int]", &[], "");
        assert_eq!(out, "SomeUnknown[int]");
    }

    #[test]
    fn test_plain_import_does_not_cycle() {
        // `import enum` records `m.enum -> enum`; expansion must stop.
        let (out, _) = resolve_with("enum.Enum", &[("m.enum", "enum")], "");
        assert_eq!(out, "enum.Enum");
    }

    #[test]
    fn test_mutual_alias_cycle_stops() {
        let aliases = [("m.A", "B"), ("m.B", "A")];
        let (out, _) = resolve_with("A", &aliases, "");
        assert_eq!(out, "A");
    }

    #[test]
    fn test_type_alias_expansion() {
        let aliases = [
            ("m.Pair", "tuple[int, int]"),
        ];
        let (out, _) = resolve_with("Pair", &aliases, "");
        assert_eq!(out, "tuple[int, int]");
    }

    #[test]
    fn test_const_type_literals() {
        let int_expr = parse_expression("1").unwrap();
        assert_eq!(const_type(&int_expr), "int");
        let list_expr = parse_expression("[1, 2]").unwrap();
        assert_eq!(const_type(&list_expr), "list[int]");
        let mixed = parse_expression("(1, 'a')").unwrap();
        assert_eq!(const_type(&mixed), "tuple[Any]");
        let dict_expr = parse_expression("{'a': 1}").unwrap();
        assert_eq!(const_type(&dict_expr), "dict[str, int]");
        let empty = parse_expression("[]").unwrap();
        assert_eq!(const_type(&empty), "list");
        let opaque = parse_expression("[f()]").unwrap();
        assert_eq!(const_type(&opaque), "list");
    }

    #[test]
    fn test_const_type_calls() {
        let known = parse_expression("int('2')").unwrap();
        assert_eq!(const_type(&known), "int");
        let frozen = parse_expression("frozenset()").unwrap();
        assert_eq!(const_type(&frozen), "frozenset");
        let unknown = parse_expression("make_thing()").unwrap();
        assert_eq!(const_type(&unknown), ANY);
    }
}
