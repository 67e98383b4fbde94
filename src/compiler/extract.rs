//! Declaration extraction: a single pass over one module's statement tree
//! that populates the symbol model.
//!
//! Imports and assignments are recorded first so annotations resolve against
//! the complete alias table, then function and class declarations are turned
//! into documentation templates.

use rustpython_parser::ast::{Arguments, Constant, Expr, Stmt};
use tracing::{debug, instrument};

use crate::ast::{docstring_of, flat_body, unparse, LineIndex};
use crate::frontend::{parse_module, ParseError};
use crate::markdown::{code, doctest, esc_underscore, table};
use crate::names::{is_public_family, is_upper_name, join, parent, strip_prefix_or, strip_suffix_or};
use crate::resolve::{const_type, Resolver, ANY};

use super::Compiler;

/// One documentable definition statement.
#[derive(Clone, Copy)]
enum ApiNode<'a> {
    Func {
        name: &'a str,
        args: &'a Arguments,
        returns: Option<&'a Expr>,
        body: &'a [Stmt],
        decorators: &'a [Expr],
        is_async: bool,
    },
    Class {
        name: &'a str,
        bases: &'a [Expr],
        body: &'a [Stmt],
        decorators: &'a [Expr],
    },
}

impl<'a> ApiNode<'a> {
    fn from_stmt(stmt: &'a Stmt) -> Option<Self> {
        match stmt {
            Stmt::FunctionDef(node) => Some(Self::Func {
                name: node.name.as_str(),
                args: &node.args,
                returns: node.returns.as_deref(),
                body: &node.body,
                decorators: &node.decorator_list,
                is_async: false,
            }),
            Stmt::AsyncFunctionDef(node) => Some(Self::Func {
                name: node.name.as_str(),
                args: &node.args,
                returns: node.returns.as_deref(),
                body: &node.body,
                decorators: &node.decorator_list,
                is_async: true,
            }),
            Stmt::ClassDef(node) => Some(Self::Class {
                name: node.name.as_str(),
                bases: &node.bases,
                body: &node.body,
                decorators: &node.decorator_list,
            }),
            _ => None,
        }
    }

    fn name(&self) -> &'a str {
        match self {
            Self::Func { name, .. } | Self::Class { name, .. } => name,
        }
    }

    fn body(&self) -> &'a [Stmt] {
        match self {
            Self::Func { body, .. } | Self::Class { body, .. } => body,
        }
    }

    fn decorators(&self) -> &'a [Expr] {
        match self {
            Self::Func { decorators, .. } | Self::Class { decorators, .. } => decorators,
        }
    }
}

/// A linearized signature entry, including the separator markers and the
/// trailing `return` pseudo-parameter.
struct Param<'a> {
    name: String,
    annotation: Option<&'a Expr>,
    default: Option<&'a Expr>,
}

impl<'a> Param<'a> {
    fn marker(name: &str) -> Self {
        Self { name: name.to_string(), annotation: None, default: None }
    }
}

fn signature_params<'a>(args: &'a Arguments, returns: Option<&'a Expr>) -> Vec<Param<'a>> {
    let mut params = Vec::new();
    if !args.posonlyargs.is_empty() {
        for a in &args.posonlyargs {
            params.push(Param {
                name: a.def.arg.to_string(),
                annotation: a.def.annotation.as_deref(),
                default: a.default.as_deref(),
            });
        }
        params.push(Param::marker("/"));
    }
    for a in &args.args {
        params.push(Param {
            name: a.def.arg.to_string(),
            annotation: a.def.annotation.as_deref(),
            default: a.default.as_deref(),
        });
    }
    if let Some(vararg) = &args.vararg {
        params.push(Param {
            name: format!("*{}", vararg.arg.as_str()),
            annotation: vararg.annotation.as_deref(),
            default: None,
        });
    } else if !args.kwonlyargs.is_empty() {
        params.push(Param::marker("*"));
    }
    for a in &args.kwonlyargs {
        params.push(Param {
            name: a.def.arg.to_string(),
            annotation: a.def.annotation.as_deref(),
            default: a.default.as_deref(),
        });
    }
    if let Some(kwarg) = &args.kwarg {
        params.push(Param {
            name: format!("**{}", kwarg.arg.as_str()),
            annotation: kwarg.annotation.as_deref(),
            default: None,
        });
    }
    params.push(Param { name: "return".to_string(), annotation: returns, default: None });
    params
}

impl Compiler {
    /// Extract one module. A syntax error is isolated to this module: the
    /// model stays untouched and the caller decides how to report it.
    #[instrument(skip(self, source))]
    pub fn parse(&mut self, module: &str, source: &str) -> Result<(), ParseError> {
        let tree = parse_module(source)?;
        self.index = LineIndex::new(source);
        debug!(statements = tree.body.len(), "extracting module");

        let mut doc = format!("{}# Module `{{}}`", "#".repeat(self.opts.level));
        if self.opts.link {
            doc.push_str("\n<a id=\"{}\"></a>");
        }
        doc.push_str("\n\n");
        self.model.docs.insert(module.to_string(), doc);
        self.model.levels.insert(module.to_string(), module.matches('.').count());
        self.model.exports.entry(module.to_string()).or_default();
        self.model.owners.insert(module.to_string(), module.to_string());

        // Aliases and export lists first so annotation resolution sees them.
        for stmt in flat_body(&tree.body) {
            match stmt {
                Stmt::Import(_) | Stmt::ImportFrom(_) => self.imports(module, stmt),
                Stmt::Assign(_) | Stmt::AnnAssign(_) => self.globals(module, stmt),
                _ => {}
            }
        }
        if let Some(text) = docstring_of(&tree.body) {
            self.model.docstrings.insert(module.to_string(), doctest(&text));
        }
        for stmt in flat_body(&tree.body) {
            if let Some(node) = ApiNode::from_stmt(stmt) {
                self.api(module, "", node);
            }
        }
        Ok(())
    }

    pub(crate) fn resolve(&mut self, module: &str, expr: &Expr, self_ty: &str) -> String {
        let mut resolver =
            Resolver::new(module, &self.model.aliases, self_ty, &self.index, &mut self.diags);
        resolver.resolve(expr)
    }

    /// Record import targets in the alias table.
    fn imports(&mut self, module: &str, stmt: &Stmt) {
        match stmt {
            Stmt::Import(node) => {
                for alias in &node.names {
                    let name = alias.asname.as_ref().unwrap_or(&alias.name);
                    self.model
                        .aliases
                        .insert(join([module, name.as_str()]), alias.name.to_string());
                }
            }
            Stmt::ImportFrom(node) => {
                if let Some(target) = &node.module {
                    let level = node.level.as_ref().map_or(0, |l| l.to_u32() as usize);
                    let base = if level > 0 { parent(module, level - 1) } else { "" };
                    for alias in &node.names {
                        let name = alias.asname.as_ref().unwrap_or(&alias.name);
                        self.model.aliases.insert(
                            join([module, name.as_str()]),
                            join([base, target.as_str(), alias.name.as_str()]),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    /// Record module-level assignments: type aliases, constants and the
    /// `__all__` export list.
    fn globals(&mut self, module: &str, stmt: &Stmt) {
        let (target, value, ann) = match stmt {
            Stmt::AnnAssign(node) => {
                let target = match node.target.as_ref() {
                    Expr::Name(name) => name,
                    _ => return,
                };
                let value = match &node.value {
                    Some(value) => value.as_ref(),
                    None => return,
                };
                let ann = self.resolve(module, &node.annotation, "");
                (target, value, ann)
            }
            Stmt::Assign(node) => {
                if node.targets.len() != 1 {
                    return;
                }
                let target = match &node.targets[0] {
                    Expr::Name(name) => name,
                    _ => return,
                };
                let ann = match &node.type_comment {
                    Some(comment) => comment.clone(),
                    None => const_type(&node.value),
                };
                (target, node.value.as_ref(), ann)
            }
            _ => return,
        };
        let name = join([module, target.id.as_str()]);
        self.model.aliases.insert(name.clone(), unparse(value));
        if is_upper_name(target.id.as_str()) {
            self.model.owners.insert(name.clone(), module.to_string());
            if self.model.consts.get(&name).map_or(true, |t| t == ANY) {
                self.model.consts.insert(name.clone(), ann);
            }
        }
        if target.id.as_str() != "__all__" {
            return;
        }
        let elts = match value {
            Expr::Tuple(tuple) => &tuple.elts,
            Expr::List(list) => &list.elts,
            _ => return,
        };
        for elt in elts {
            if let Expr::Constant(constant) = elt {
                if let Constant::Str(entry) = &constant.value {
                    self.model
                        .exports
                        .entry(module.to_string())
                        .or_default()
                        .insert(join([module, entry.as_str()]));
                }
            }
        }
    }

    /// Register a function or class declaration and everything nested in it.
    /// `prefix` is the simple name of the immediately enclosing class.
    fn api(&mut self, module: &str, prefix: &str, node: ApiNode) {
        let hashes = "#".repeat(self.opts.level + if prefix.is_empty() { 2 } else { 3 });
        let simple = node.name();
        let name = join([module, prefix, simple]);
        let level = self.model.levels.get(module).copied().unwrap_or(0);
        self.model.levels.insert(name.clone(), level);
        self.model.owners.insert(name.clone(), module.to_string());

        let short = esc_underscore(&join([prefix, simple]));
        let mut doc = match node {
            ApiNode::Func { is_async: false, .. } => format!("{} {}()\n\n", hashes, short),
            ApiNode::Func { is_async: true, .. } => format!("{} async {}()\n\n", hashes, short),
            ApiNode::Class { .. } => format!("{} class {}\n\n", hashes, short),
        };
        doc.push_str("*Full name:* `{}`");
        if self.opts.link {
            doc.push_str("\n<a id=\"{}\"></a>");
        }
        doc.push_str("\n\n");

        let decorators: Vec<String> = node
            .decorators()
            .iter()
            .map(|d| format!("@{}", self.resolve(module, d, "")))
            .collect();
        if !decorators.is_empty() {
            doc.push_str(&table(
                &["Decorators"],
                decorators.iter().map(|d| [code(d)]),
            ));
        }

        match node {
            ApiNode::Func { args, returns, .. } => {
                let has_self =
                    !prefix.is_empty() && !decorators.iter().any(|d| d == "@staticmethod");
                let cls_method = decorators.iter().any(|d| d == "@classmethod");
                doc.push_str(&self.func_table(module, prefix, args, returns, has_self, cls_method));
            }
            ApiNode::Class { bases, body, .. } => {
                doc.push_str(&self.class_table(module, &name, bases, body));
            }
        }
        self.model.docs.insert(name.clone(), doc);
        if let Some(text) = docstring_of(node.body()) {
            self.model.docstrings.insert(name, doctest(&text));
        }

        if let ApiNode::Class { body, .. } = node {
            for stmt in flat_body(body) {
                if let Some(child) = ApiNode::from_stmt(stmt) {
                    self.api(module, simple, child);
                }
            }
        }
    }

    /// Signature table: one annotation row, plus a defaults row when any
    /// parameter carries a default value.
    fn func_table(
        &mut self,
        module: &str,
        class_name: &str,
        args: &Arguments,
        returns: Option<&Expr>,
        has_self: bool,
        cls_method: bool,
    ) -> String {
        let params = signature_params(args, returns);
        let annotations = self.func_ann(module, class_name, &params, has_self, cls_method);
        let titles: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        let types_row: Vec<String> = annotations.iter().map(|a| code(a)).collect();
        let no_defaults = params.iter().all(|p| p.default.is_none());
        let mut rows = vec![types_row];
        if !no_defaults {
            rows.push(
                params
                    .iter()
                    .map(|p| match p.default {
                        Some(default) => code(&unparse(default)),
                        None => " ".to_string(),
                    })
                    .collect(),
            );
        }
        table(&titles, rows)
    }

    /// Annotation cells in calling order. The receiver renders as `Self`
    /// (`type[Self]` for class methods); an explicit annotation on it
    /// replaces the enclosing class name as the signature's self type.
    fn func_ann(
        &mut self,
        module: &str,
        class_name: &str,
        params: &[Param],
        has_self: bool,
        cls_method: bool,
    ) -> Vec<String> {
        let mut self_ty = if has_self { class_name.to_string() } else { String::new() };
        let mut out = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            if has_self && i == 0 {
                if let Some(annotation) = param.annotation {
                    self_ty = self.resolve(module, annotation, "");
                    if cls_method {
                        self_ty =
                            strip_suffix_or(strip_prefix_or(&self_ty, "type["), "]").to_string();
                    }
                }
                out.push(if cls_method { "type[Self]" } else { "Self" }.to_string());
            } else if param.name == "*" {
                out.push(String::new());
            } else if let Some(annotation) = param.annotation {
                out.push(self.resolve(module, annotation, &self_ty));
            } else {
                out.push(ANY.to_string());
            }
        }
        out
    }

    /// Bases table plus either an enum-member list or a typed members table
    /// collected from the class body. Attribute initializers land in the
    /// alias table under the class's qualified name.
    fn class_table(&mut self, module: &str, class: &str, bases: &[Expr], body: &[Stmt]) -> String {
        let mut doc = String::new();
        let resolved_bases: Vec<String> =
            bases.iter().map(|b| self.resolve(module, b, "")).collect();
        if !resolved_bases.is_empty() {
            doc.push_str(&table(&["Bases"], resolved_bases.iter().map(|b| [code(b)])));
        }
        let is_enum = resolved_bases.iter().any(|b| b.starts_with("enum."));
        let mut members = std::collections::BTreeMap::new();
        let mut enums: Vec<String> = Vec::new();
        for stmt in flat_body(body) {
            match stmt {
                Stmt::AnnAssign(node) => {
                    if let Expr::Name(target) = node.target.as_ref() {
                        let attr = target.id.to_string();
                        if let Some(value) = &node.value {
                            self.model
                                .aliases
                                .insert(join([class, attr.as_str()]), unparse(value));
                        }
                        if is_enum {
                            enums.push(attr);
                        } else if is_public_family(&attr) {
                            let ty = self.resolve(module, &node.annotation, "");
                            members.insert(attr, ty);
                        }
                    }
                }
                Stmt::Assign(node) => {
                    if node.targets.len() != 1 {
                        continue;
                    }
                    if let Expr::Name(target) = &node.targets[0] {
                        let attr = target.id.to_string();
                        self.model
                            .aliases
                            .insert(join([class, attr.as_str()]), unparse(&node.value));
                        if is_enum {
                            enums.push(attr);
                        } else if is_public_family(&attr) {
                            let ty = match &node.type_comment {
                                Some(comment) => comment.clone(),
                                None => const_type(&node.value),
                            };
                            members.insert(attr, ty);
                        }
                    }
                }
                Stmt::Delete(node) => {
                    for target in &node.targets {
                        if let Expr::Name(target) = target {
                            let attr = target.id.as_str();
                            members.remove(attr);
                            enums.retain(|e| e != attr);
                        }
                    }
                }
                _ => {}
            }
        }
        if !enums.is_empty() {
            doc.push_str(&table(&["Enums"], enums.iter().map(|e| [e.clone()])));
        } else if !members.is_empty() {
            doc.push_str(&table(
                &["Members", "Type"],
                members.iter().map(|(attr, ty)| [code(attr), code(ty)]),
            ));
        }
        doc
    }
}
