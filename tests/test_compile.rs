use apimark::{Compiler, Diagnostic, Options};

fn compile(modules: &[(&str, &str)], opts: Options) -> (String, Vec<Diagnostic>) {
    let mut compiler = Compiler::new(opts);
    for (name, source) in modules {
        compiler.parse(name, source).unwrap();
    }
    let doc = compiler.compile();
    let diags = compiler.diags.iter().cloned().collect();
    (doc, diags)
}

#[test]
fn test_class_with_forward_reference_scenario() {
    let source = "class C:\n    \"\"\"Doc.\"\"\"\n    def f(self, x: int) -> \"C\": ...\n";
    let (doc, diags) = compile(&[("m", source)], Options::default());

    let expected = "\
## Module `m`
<a id=\"m\"></a>

### class C

*Full name:* `m.C`
<a id=\"m-c\"></a>

Doc.

#### C.f()

*Full name:* `m.C.f`
<a id=\"m-c-f\"></a>

| self | x | return |
|:----:|:---:|:------:|
| `Self` | `int` | `Self` |
";
    assert_eq!(doc, expected);

    // The module and the undocumented method are flagged; the class is not.
    assert!(diags
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingDocumentation { name } if name == "m")));
    assert!(diags
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingDocumentation { name } if name == "m.C.f")));
    assert_eq!(diags.len(), 2);
}

#[test]
fn test_reexport_folding() {
    let pkg = "\"\"\"Pkg.\"\"\"\n\nfrom pkg.impl import Widget\n";
    let imp = "\"\"\"Impl.\"\"\"\n\nclass Widget:\n    \"\"\"A widget.\"\"\"\n    def size(self) -> int:\n        \"\"\"S.\"\"\"\n";
    let (doc, _) = compile(&[("pkg", pkg), ("pkg.impl", imp)], Options::default());

    assert!(doc.contains("*Full name:* `pkg.Widget`"));
    assert!(doc.contains("*Full name:* `pkg.Widget.size`"));
    assert!(doc.contains("A widget."));
    assert!(!doc.contains("pkg.impl"));
    assert_eq!(doc.matches("class Widget").count(), 1);
}

#[test]
fn test_reexport_folding_is_order_independent() {
    let pkg = "\"\"\"Pkg.\"\"\"\n\nfrom pkg.impl import Widget\n";
    let imp = "\"\"\"Impl.\"\"\"\n\nclass Widget:\n    \"\"\"A widget.\"\"\"\n";
    let (forward, _) = compile(&[("pkg", pkg), ("pkg.impl", imp)], Options::default());
    let (backward, _) = compile(&[("pkg.impl", imp), ("pkg", pkg)], Options::default());
    assert_eq!(forward, backward);
}

#[test]
fn test_export_list_visibility() {
    let source = "\
\"\"\"V.\"\"\"

__all__ = ['pub']

def pub() -> None:
    \"\"\"P.\"\"\"

def hidden() -> None:
    \"\"\"H.\"\"\"
";
    let (doc, _) = compile(&[("v", source)], Options::default());
    assert!(doc.contains("pub()"));
    assert!(!doc.contains("hidden()"));
}

#[test]
fn test_underscore_names_hidden_without_exports() {
    let source = "\
\"\"\"P.\"\"\"

def ok() -> None:
    \"\"\"Ok.\"\"\"

def _secret() -> None:
    \"\"\"S.\"\"\"
";
    let (doc, _) = compile(&[("p", source)], Options::default());
    assert!(doc.contains("ok()"));
    assert!(!doc.contains("_secret"));
}

#[test]
fn test_export_list_can_expose_underscore_name() {
    let source = "\
\"\"\"V.\"\"\"

__all__ = ['_special']

def _special() -> None:
    \"\"\"S.\"\"\"
";
    let (doc, _) = compile(&[("v", source)], Options::default());
    assert!(doc.contains("_special()"));
    // The module itself has no public-family children, so only the listed
    // name renders.
    assert!(!doc.contains("Module `v`"));
}

#[test]
fn test_defaults_row() {
    let with_default = "\"\"\"D.\"\"\"\n\ndef g(a, b=1) -> int:\n    \"\"\"G.\"\"\"\n";
    let (doc, _) = compile(&[("d", with_default)], Options::default());
    assert!(doc.contains(
        "| a | b | return |\n|:---:|:---:|:------:|\n| `Any` | `Any` | `int` |\n|   | `1` |   |"
    ));

    let without_default = "\"\"\"D.\"\"\"\n\ndef g(a, b) -> int:\n    \"\"\"G.\"\"\"\n";
    let (doc, _) = compile(&[("d", without_default)], Options::default());
    assert!(doc.contains("| a | b | return |\n|:---:|:---:|:------:|\n| `Any` | `Any` | `int` |"));
    assert!(!doc.contains("|   |"));
}

#[test]
fn test_separator_markers() {
    let source = "\"\"\"S.\"\"\"\n\ndef h(a, /, b, *, c=3) -> None:\n    \"\"\"H.\"\"\"\n";
    let (doc, _) = compile(&[("s", source)], Options::default());
    assert!(doc.contains("| a | / | b | * | c | return |"));
    // The bare keyword-only marker renders an empty cell.
    assert!(doc.contains("| `Any` | `Any` | `Any` |   | `Any` | `None` |"));
}

#[test]
fn test_variadics() {
    let source = "\"\"\"S.\"\"\"\n\ndef v(*args: int, **kw: str) -> None:\n    \"\"\"V.\"\"\"\n";
    let (doc, _) = compile(&[("s", source)], Options::default());
    assert!(doc.contains("| *args | **kw | return |"));
    assert!(doc.contains("| `int` | `str` | `None` |"));
}

#[test]
fn test_classmethod_and_staticmethod() {
    let source = "\
\"\"\"F.\"\"\"

class Factory:
    \"\"\"Makes things.\"\"\"

    @classmethod
    def build(cls, size: int) -> \"Factory\":
        \"\"\"B.\"\"\"

    @staticmethod
    def ping(host: str) -> bool:
        \"\"\"P.\"\"\"
";
    let (doc, _) = compile(&[("f", source)], Options::default());
    assert!(doc.contains("| `@classmethod` |"));
    assert!(doc.contains("| cls | size | return |"));
    assert!(doc.contains("| `type[Self]` | `int` | `Self` |"));
    // Static methods take no receiver.
    assert!(doc.contains("| host | return |"));
    assert!(doc.contains("| `str` | `bool` |"));
}

#[test]
fn test_async_function_heading() {
    let source = "\"\"\"A.\"\"\"\n\nasync def fetch(url: str) -> str:\n    \"\"\"F.\"\"\"\n";
    let (doc, _) = compile(&[("a", source)], Options::default());
    assert!(doc.contains("### async fetch()"));
}

#[test]
fn test_constants_table() {
    let source = "\
\"\"\"K.\"\"\"

MAX_SIZE = 10
NAMES = ['a', 'b']
_INTERNAL = 5

def use() -> None:
    \"\"\"U.\"\"\"
";
    let (doc, _) = compile(&[("k", source)], Options::default());
    assert!(doc.contains("| Constants | Type |"));
    assert!(doc.contains("| `MAX_SIZE` | `int` |"));
    assert!(doc.contains("| `NAMES` | `list[str]` |"));
    assert!(!doc.contains("_INTERNAL"));
}

#[test]
fn test_type_alias_expands_in_signatures() {
    let source = "\
\"\"\"T.\"\"\"

from typing import Union

Number = Union[int, float]

def f(x: Number) -> Number:
    \"\"\"F.\"\"\"
";
    let (doc, _) = compile(&[("t", source)], Options::default());
    assert!(doc.contains("<code>int &#124; float</code>"));
}

#[test]
fn test_deprecated_spelling_warns_with_position() {
    let source = "\
\"\"\"Dep.\"\"\"

from typing import List

def f(xs: List[int]) -> None:
    \"\"\"F.\"\"\"
";
    let (doc, diags) = compile(&[("dep", source)], Options::default());
    assert!(doc.contains("`list[int]`"));
    let deprecations: Vec<_> = diags
        .iter()
        .filter(|d| matches!(d, Diagnostic::DeprecatedSpelling { .. }))
        .collect();
    assert_eq!(deprecations.len(), 1);
    if let Diagnostic::DeprecatedSpelling { line, found, replacement, .. } = deprecations[0] {
        assert_eq!(*line, 5);
        assert_eq!(found, "typing.List");
        assert_eq!(replacement, "list");
    }
}

#[test]
fn test_enum_members() {
    let source = "\
\"\"\"E.\"\"\"

import enum

class Color(enum.Enum):
    \"\"\"Colors.\"\"\"
    RED = 1
    GREEN = 2
";
    let (doc, _) = compile(&[("e", source)], Options::default());
    assert!(doc.contains("| Bases |\n|:-----:|\n| `enum.Enum` |"));
    assert!(doc.contains("| Enums |\n|:-----:|\n| RED |\n| GREEN |"));
}

#[test]
fn test_members_table_honors_delete() {
    let source = "\
\"\"\"M.\"\"\"

class Box:
    \"\"\"B.\"\"\"
    width: int
    height: int
    del height
";
    let (doc, _) = compile(&[("m", source)], Options::default());
    assert!(doc.contains("| Members | Type |"));
    assert!(doc.contains("| `width` | `int` |"));
    assert!(!doc.contains("height"));
}

#[test]
fn test_class_attribute_initializers_recorded() {
    let source = "\
\"\"\"M.\"\"\"

class Cfg:
    \"\"\"C.\"\"\"
    retries: int = 3
    name = 'x'
";
    let mut compiler = Compiler::new(Options::default());
    compiler.parse("m", source).unwrap();
    assert_eq!(
        compiler.model.aliases.get("m.Cfg.retries").map(String::as_str),
        Some("3")
    );
    assert_eq!(
        compiler.model.aliases.get("m.Cfg.name").map(String::as_str),
        Some("'x'")
    );
}

#[test]
fn test_magic_methods_skipped_silently() {
    let source = "\
\"\"\"M.\"\"\"

class C:
    \"\"\"C.\"\"\"
    def __init__(self):
        pass
";
    let (doc, diags) = compile(&[("m", source)], Options::default());
    assert!(!doc.contains("__init__"));
    assert!(!diags
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingDocumentation { name } if name.contains("__init__"))));
}

#[test]
fn test_table_of_contents() {
    let source = "\"\"\"W.\"\"\"\n\ndef f() -> None:\n    \"\"\"F.\"\"\"\n";
    let opts = Options::new(true, 1, true);
    let (doc, _) = compile(&[("w", source)], opts);
    assert!(doc.starts_with("**Table of contents:**\n+ [`w`](#w)\n    + [`w.f`](#w-f)\n\n"));
}

#[test]
fn test_no_link_omits_anchors() {
    let source = "\"\"\"W.\"\"\"\n\ndef f() -> None:\n    \"\"\"F.\"\"\"\n";
    let opts = Options::new(false, 1, false);
    let (doc, _) = compile(&[("w", source)], opts);
    assert!(!doc.contains("<a id="));
    assert!(doc.contains("## Module `w`"));
}

#[test]
fn test_heading_base_level() {
    let source = "\"\"\"W.\"\"\"\n\ndef f() -> None:\n    \"\"\"F.\"\"\"\n";
    let opts = Options::new(true, 2, false);
    let (doc, _) = compile(&[("w", source)], opts);
    assert!(doc.contains("### Module `w`"));
    assert!(doc.contains("#### f()"));
}

#[test]
fn test_idempotent_output() {
    let source = "\
\"\"\"Stable.\"\"\"

from typing import Optional

LIMIT = 7

class Node:
    \"\"\"N.\"\"\"
    def next(self) -> Optional[\"Node\"]:
        \"\"\"Next node.\"\"\"
";
    let (first, _) = compile(&[("stable", source)], Options::default());
    let (second, _) = compile(&[("stable", source)], Options::default());
    assert_eq!(first, second);
    assert!(first.contains("<code>Self &#124; None</code>"));
}

#[test]
fn test_doctest_fencing_in_output() {
    let source = "\
\"\"\"Doc module.

Usage:
>>> f(1)
2
\"\"\"

def f(x: int) -> int:
    \"\"\"F.\"\"\"
";
    let (doc, _) = compile(&[("dm", source)], Options::default());
    assert!(doc.contains("```python\n>>> f(1)\n```\n2"));
}

#[test]
fn test_supply_docstring_fallback() {
    let mut compiler = Compiler::new(Options::default());
    compiler.parse("e", "def q() -> None: ...\n").unwrap();
    assert!(compiler.supply_docstring("e.q", "From the extension module."));
    assert!(!compiler.supply_docstring("e.missing", "Ignored."));
    let doc = compiler.compile();
    assert!(doc.contains("From the extension module."));
}

#[test]
fn test_module_without_public_children_is_hidden() {
    let source = "\"\"\"Only doc.\"\"\"\n";
    let (doc, _) = compile(&[("lonely", source)], Options::default());
    assert_eq!(doc, "\n");
}

#[test]
fn test_nested_class_uses_inner_prefix() {
    let source = "\
\"\"\"N.\"\"\"

class Outer:
    \"\"\"O.\"\"\"
    class Inner:
        \"\"\"I.\"\"\"
        def f(self) -> None:
            \"\"\"F.\"\"\"
";
    let (doc, _) = compile(&[("n", source)], Options::default());
    assert!(doc.contains("*Full name:* `n.Outer.Inner`"));
    // Nested declarations are prefixed by their immediately enclosing class.
    assert!(doc.contains("*Full name:* `n.Inner.f`"));
}
