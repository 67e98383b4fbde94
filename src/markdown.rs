//! Markdown assembly helpers: inline code escaping, pipe tables and doctest
//! fencing. The renderer and the extractor both emit through these so the
//! output stays uniform.

/// Escape a fragment for an inline code span. Pipe characters would break the
/// surrounding table, so they force the HTML form.
pub fn code(doc: &str) -> String {
    let doc = doc.replace('|', "&#124;");
    if doc.contains('&') {
        format!("<code>{}</code>", doc)
    } else if !doc.is_empty() {
        format!("`{}`", doc)
    } else {
        " ".to_string()
    }
}

/// Escape underscores in a name that would otherwise read as emphasis.
pub fn esc_underscore(doc: &str) -> String {
    if doc.matches('_').count() > 1 {
        doc.replace('_', "\\_")
    } else {
        doc.to_string()
    }
}

/// Wrap contiguous interactive-example (`>>> `) runs in fenced Python code
/// blocks, preserving blank-line boundaries exactly.
pub fn doctest(doc: &str) -> String {
    let lines: Vec<&str> = doc.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut keep = false;
    for (i, line) in lines.iter().enumerate() {
        let signed = line.starts_with(">>> ");
        if signed {
            if !keep {
                out.push("```python");
                keep = true;
            }
        } else if keep {
            out.push("```");
            keep = false;
        }
        out.push(line);
        if signed && i == lines.len() - 1 {
            out.push("```");
        }
    }
    out.join("\n")
}

fn table_row<I>(cells: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = String::from("|");
    for cell in cells {
        out.push(' ');
        out.push_str(&cell);
        out.push_str(" |");
    }
    out
}

fn table_split(titles: &[&str]) -> String {
    let mut out = String::from("|");
    for title in titles {
        out.push(':');
        out.push_str(&"-".repeat(title.len().max(3)));
        out.push_str(":|");
    }
    out
}

/// Create a multi-column table with centered alignment.
///
/// ```text
/// | a | b |
/// |:---:|:---:|
/// | c | d |
/// ```
pub fn table<R, I>(titles: &[&str], items: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut out = table_row(titles.iter().map(|t| t.to_string()));
    out.push('\n');
    out.push_str(&table_split(titles));
    for row in items {
        out.push('\n');
        out.push_str(&table_row(row));
    }
    out.push_str("\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code() {
        assert_eq!(code("int"), "`int`");
        assert_eq!(code(""), " ");
        assert_eq!(code("dict[str, int] | None"), "`dict[str, int] | None`");
        assert_eq!(code("Callable[[], int]"), "`Callable[[], int]`");
    }

    #[test]
    fn test_code_pipe_escapes_to_html() {
        assert_eq!(code("a|b"), "<code>a&#124;b</code>");
    }

    #[test]
    fn test_esc_underscore() {
        assert_eq!(esc_underscore("__init__"), "\\_\\_init\\_\\_");
        assert_eq!(esc_underscore("my_name"), "my_name");
        assert_eq!(esc_underscore("plain"), "plain");
    }

    #[test]
    fn test_table() {
        let rendered = table(&["a", "b"], vec![
            vec!["c".to_string(), "d".to_string()],
            vec!["e".to_string(), "f".to_string()],
        ]);
        assert_eq!(rendered, "| a | b |\n|:---:|:---:|\n| c | d |\n| e | f |\n\n");
    }

    #[test]
    fn test_table_split_minimum_width() {
        let rendered = table(&["return"], vec![vec!["`int`".to_string()]]);
        assert_eq!(rendered, "| return |\n|:------:|\n| `int` |\n\n");
    }

    #[test]
    fn test_doctest_fences() {
        let doc = "Summary.\n\n>>> f(1)\n2\n\nTail.";
        let expected = "Summary.\n\n```python\n>>> f(1)\n```\n2\n\nTail.";
        assert_eq!(doctest(doc), expected);
    }

    #[test]
    fn test_doctest_trailing_prompt() {
        let doc = "Usage:\n>>> run()";
        assert_eq!(doctest(doc), "Usage:\n```python\n>>> run()\n```");
    }

    #[test]
    fn test_doctest_without_prompts() {
        assert_eq!(doctest("Just text."), "Just text.");
    }
}
