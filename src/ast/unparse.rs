//! Expression unparsing for rustpython-parser trees.
//!
//! The parser crate has no source printer, so annotation and default-value
//! expressions are turned back into text here. Parentheses follow Python
//! operator precedence; the printer favors the minimal form (`a | b | c`,
//! `dict[str, int]`) since the output lands in documentation tables.

use rustpython_parser::ast::{
    Arguments, BoolOp, CmpOp, Comprehension, Constant, Expr, Operator, UnaryOp,
};

// Precedence levels, lowest binds loosest. Mirrors the Python grammar from
// lambda/ternary down to atoms.
const PREC_TEST: u8 = 1;
const PREC_OR: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_CMP: u8 = 5;
const PREC_BOR: u8 = 6;
const PREC_BXOR: u8 = 7;
const PREC_BAND: u8 = 8;
const PREC_SHIFT: u8 = 9;
const PREC_ARITH: u8 = 10;
const PREC_TERM: u8 = 11;
const PREC_FACTOR: u8 = 12;
const PREC_POWER: u8 = 13;
const PREC_AWAIT: u8 = 14;
const PREC_ATOM: u8 = 15;

/// Unparse an expression into Python source text.
pub fn unparse(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, 0);
    out
}

fn operator_token(op: Operator) -> (&'static str, u8) {
    match op {
        Operator::Add => ("+", PREC_ARITH),
        Operator::Sub => ("-", PREC_ARITH),
        Operator::Mult => ("*", PREC_TERM),
        Operator::MatMult => ("@", PREC_TERM),
        Operator::Div => ("/", PREC_TERM),
        Operator::Mod => ("%", PREC_TERM),
        Operator::Pow => ("**", PREC_POWER),
        Operator::LShift => ("<<", PREC_SHIFT),
        Operator::RShift => (">>", PREC_SHIFT),
        Operator::BitOr => ("|", PREC_BOR),
        Operator::BitXor => ("^", PREC_BXOR),
        Operator::BitAnd => ("&", PREC_BAND),
        Operator::FloorDiv => ("//", PREC_TERM),
    }
}

fn cmp_token(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::NotEq => "!=",
        CmpOp::Lt => "<",
        CmpOp::LtE => "<=",
        CmpOp::Gt => ">",
        CmpOp::GtE => ">=",
        CmpOp::Is => "is",
        CmpOp::IsNot => "is not",
        CmpOp::In => "in",
        CmpOp::NotIn => "not in",
    }
}

fn str_repr(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn float_repr(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Source form of a literal constant.
pub fn constant_repr(value: &Constant) -> String {
    match value {
        Constant::None => "None".to_string(),
        Constant::Bool(true) => "True".to_string(),
        Constant::Bool(false) => "False".to_string(),
        Constant::Str(s) => str_repr(s),
        Constant::Bytes(b) => {
            let mut out = String::from("b'");
            for byte in b {
                if byte.is_ascii_graphic() && *byte != b'\'' && *byte != b'\\' {
                    out.push(*byte as char);
                } else {
                    out.push_str(&format!("\\x{:02x}", byte));
                }
            }
            out.push('\'');
            out
        }
        Constant::Int(i) => format!("{}", i),
        Constant::Float(v) => float_repr(*v),
        Constant::Complex { real, imag } => {
            if *real == 0.0 {
                format!("{}j", float_repr(*imag))
            } else {
                format!("({}+{}j)", float_repr(*real), float_repr(*imag))
            }
        }
        Constant::Ellipsis => "...".to_string(),
        Constant::Tuple(items) => {
            let parts: Vec<String> = items.iter().map(constant_repr).collect();
            if parts.len() == 1 {
                format!("({},)", parts[0])
            } else {
                format!("({})", parts.join(", "))
            }
        }
    }
}

fn write_list(out: &mut String, items: &[Expr], sep: &str, level: u8) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_expr(out, item, level);
    }
}

fn write_comprehensions(out: &mut String, generators: &[Comprehension]) {
    for gen in generators {
        out.push_str(if gen.is_async { " async for " } else { " for " });
        write_expr(out, &gen.target, PREC_TEST);
        out.push_str(" in ");
        write_expr(out, &gen.iter, PREC_OR);
        for cond in &gen.ifs {
            out.push_str(" if ");
            write_expr(out, cond, PREC_OR);
        }
    }
}

fn write_lambda_args(out: &mut String, args: &Arguments) {
    let mut first = true;
    let mut push_sep = |out: &mut String, first: &mut bool| {
        if !*first {
            out.push_str(", ");
        }
        *first = false;
    };
    for a in &args.posonlyargs {
        push_sep(out, &mut first);
        out.push_str(a.def.arg.as_str());
        if let Some(default) = &a.default {
            out.push('=');
            write_expr(out, default, PREC_TEST);
        }
    }
    if !args.posonlyargs.is_empty() {
        push_sep(out, &mut first);
        out.push('/');
    }
    for a in &args.args {
        push_sep(out, &mut first);
        out.push_str(a.def.arg.as_str());
        if let Some(default) = &a.default {
            out.push('=');
            write_expr(out, default, PREC_TEST);
        }
    }
    if let Some(vararg) = &args.vararg {
        push_sep(out, &mut first);
        out.push('*');
        out.push_str(vararg.arg.as_str());
    } else if !args.kwonlyargs.is_empty() {
        push_sep(out, &mut first);
        out.push('*');
    }
    for a in &args.kwonlyargs {
        push_sep(out, &mut first);
        out.push_str(a.def.arg.as_str());
        if let Some(default) = &a.default {
            out.push('=');
            write_expr(out, default, PREC_TEST);
        }
    }
    if let Some(kwarg) = &args.kwarg {
        push_sep(out, &mut first);
        out.push_str("**");
        out.push_str(kwarg.arg.as_str());
    }
}

fn write_expr(out: &mut String, expr: &Expr, level: u8) {
    let prec = expr_prec(expr);
    let parens = prec < level;
    if parens {
        out.push('(');
    }
    match expr {
        Expr::BoolOp(node) => {
            let (token, prec) = match node.op {
                BoolOp::And => (" and ", PREC_AND),
                BoolOp::Or => (" or ", PREC_OR),
            };
            for (i, value) in node.values.iter().enumerate() {
                if i > 0 {
                    out.push_str(token);
                }
                write_expr(out, value, prec + 1);
            }
        }
        Expr::NamedExpr(node) => {
            out.push('(');
            write_expr(out, &node.target, PREC_ATOM);
            out.push_str(" := ");
            write_expr(out, &node.value, PREC_TEST);
            out.push(')');
        }
        Expr::BinOp(node) => {
            let (token, prec) = operator_token(node.op);
            let (left_level, right_level) = if matches!(node.op, Operator::Pow) {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            write_expr(out, &node.left, left_level);
            out.push(' ');
            out.push_str(token);
            out.push(' ');
            write_expr(out, &node.right, right_level);
        }
        Expr::UnaryOp(node) => match node.op {
            UnaryOp::Not => {
                out.push_str("not ");
                write_expr(out, &node.operand, PREC_NOT);
            }
            UnaryOp::Invert => {
                out.push('~');
                write_expr(out, &node.operand, PREC_FACTOR);
            }
            UnaryOp::UAdd => {
                out.push('+');
                write_expr(out, &node.operand, PREC_FACTOR);
            }
            UnaryOp::USub => {
                out.push('-');
                write_expr(out, &node.operand, PREC_FACTOR);
            }
        },
        Expr::Lambda(node) => {
            if node.args.posonlyargs.is_empty()
                && node.args.args.is_empty()
                && node.args.vararg.is_none()
                && node.args.kwonlyargs.is_empty()
                && node.args.kwarg.is_none()
            {
                out.push_str("lambda");
            } else {
                out.push_str("lambda ");
                write_lambda_args(out, &node.args);
            }
            out.push_str(": ");
            write_expr(out, &node.body, PREC_TEST);
        }
        Expr::IfExp(node) => {
            write_expr(out, &node.body, PREC_OR);
            out.push_str(" if ");
            write_expr(out, &node.test, PREC_OR);
            out.push_str(" else ");
            write_expr(out, &node.orelse, PREC_TEST);
        }
        Expr::Dict(node) => {
            out.push('{');
            for (i, (key, value)) in node.keys.iter().zip(&node.values).enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match key {
                    Some(key) => {
                        write_expr(out, key, PREC_TEST);
                        out.push_str(": ");
                        write_expr(out, value, PREC_TEST);
                    }
                    None => {
                        out.push_str("**");
                        write_expr(out, value, PREC_ATOM);
                    }
                }
            }
            out.push('}');
        }
        Expr::Set(node) => {
            out.push('{');
            write_list(out, &node.elts, ", ", PREC_TEST);
            out.push('}');
        }
        Expr::ListComp(node) => {
            out.push('[');
            write_expr(out, &node.elt, PREC_TEST);
            write_comprehensions(out, &node.generators);
            out.push(']');
        }
        Expr::SetComp(node) => {
            out.push('{');
            write_expr(out, &node.elt, PREC_TEST);
            write_comprehensions(out, &node.generators);
            out.push('}');
        }
        Expr::DictComp(node) => {
            out.push('{');
            write_expr(out, &node.key, PREC_TEST);
            out.push_str(": ");
            write_expr(out, &node.value, PREC_TEST);
            write_comprehensions(out, &node.generators);
            out.push('}');
        }
        Expr::GeneratorExp(node) => {
            out.push('(');
            write_expr(out, &node.elt, PREC_TEST);
            write_comprehensions(out, &node.generators);
            out.push(')');
        }
        Expr::Await(node) => {
            out.push_str("await ");
            write_expr(out, &node.value, PREC_AWAIT);
        }
        Expr::Yield(node) => {
            out.push_str("yield");
            if let Some(value) = &node.value {
                out.push(' ');
                write_expr(out, value, PREC_TEST);
            }
        }
        Expr::YieldFrom(node) => {
            out.push_str("yield from ");
            write_expr(out, &node.value, PREC_TEST);
        }
        Expr::Compare(node) => {
            write_expr(out, &node.left, PREC_CMP + 1);
            for (op, comparator) in node.ops.iter().zip(&node.comparators) {
                out.push(' ');
                out.push_str(cmp_token(*op));
                out.push(' ');
                write_expr(out, comparator, PREC_CMP + 1);
            }
        }
        Expr::Call(node) => {
            write_expr(out, &node.func, PREC_ATOM);
            out.push('(');
            let mut first = true;
            for arg in &node.args {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                write_expr(out, arg, PREC_TEST);
            }
            for keyword in &node.keywords {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                match &keyword.arg {
                    Some(name) => {
                        out.push_str(name.as_str());
                        out.push('=');
                        write_expr(out, &keyword.value, PREC_TEST);
                    }
                    None => {
                        out.push_str("**");
                        write_expr(out, &keyword.value, PREC_ATOM);
                    }
                }
            }
            out.push(')');
        }
        Expr::FormattedValue(node) => {
            out.push_str("f'{");
            write_expr(out, &node.value, PREC_TEST);
            out.push_str("}'");
        }
        Expr::JoinedStr(node) => {
            out.push_str("f'");
            for value in &node.values {
                match value {
                    Expr::Constant(constant) => {
                        if let Constant::Str(s) = &constant.value {
                            out.push_str(s);
                        }
                    }
                    Expr::FormattedValue(fv) => {
                        out.push('{');
                        write_expr(out, &fv.value, PREC_TEST);
                        out.push('}');
                    }
                    other => write_expr(out, other, PREC_TEST),
                }
            }
            out.push('\'');
        }
        Expr::Constant(node) => {
            out.push_str(&constant_repr(&node.value));
        }
        Expr::Attribute(node) => {
            write_expr(out, &node.value, PREC_ATOM);
            out.push('.');
            out.push_str(node.attr.as_str());
        }
        Expr::Subscript(node) => {
            write_expr(out, &node.value, PREC_ATOM);
            out.push('[');
            // Tuple subscripts print bare: `dict[str, int]`.
            match node.slice.as_ref() {
                Expr::Tuple(tuple) if !tuple.elts.is_empty() => {
                    write_list(out, &tuple.elts, ", ", PREC_TEST);
                }
                other => write_expr(out, other, 0),
            }
            out.push(']');
        }
        Expr::Starred(node) => {
            out.push('*');
            write_expr(out, &node.value, PREC_ATOM);
        }
        Expr::Name(node) => {
            out.push_str(node.id.as_str());
        }
        Expr::List(node) => {
            out.push('[');
            write_list(out, &node.elts, ", ", PREC_TEST);
            out.push(']');
        }
        Expr::Tuple(node) => {
            out.push('(');
            write_list(out, &node.elts, ", ", PREC_TEST);
            if node.elts.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Expr::Slice(node) => {
            if let Some(lower) = &node.lower {
                write_expr(out, lower, PREC_TEST);
            }
            out.push(':');
            if let Some(upper) = &node.upper {
                write_expr(out, upper, PREC_TEST);
            }
            if let Some(step) = &node.step {
                out.push(':');
                write_expr(out, step, PREC_TEST);
            }
        }
    }
    if parens {
        out.push(')');
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Lambda(_) | Expr::IfExp(_) => PREC_TEST,
        Expr::BoolOp(node) => match node.op {
            BoolOp::And => PREC_AND,
            BoolOp::Or => PREC_OR,
        },
        Expr::UnaryOp(node) => match node.op {
            UnaryOp::Not => PREC_NOT,
            _ => PREC_FACTOR,
        },
        Expr::Compare(_) => PREC_CMP,
        Expr::BinOp(node) => operator_token(node.op).1,
        Expr::Await(_) => PREC_AWAIT,
        Expr::Yield(_) | Expr::YieldFrom(_) => PREC_TEST,
        _ => PREC_ATOM,
    }
}
