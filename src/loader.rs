//! Package discovery and end-to-end document generation.
//!
//! Walks a search path for a root package's `.py`/`.pyi` sources without
//! importing anything, feeds them through the compiler and writes one
//! Markdown file per root.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::compiler::Compiler;
use crate::errors::{Diagnostic, Diagnostics};
use crate::frontend::Options;

/// PEP 561 stub-package directory suffix.
pub const STUB_SUFFIX: &str = "-stubs";

/// Enumerate the modules of `name` under `path` without importing them.
///
/// Yields `(module name, path stem)` pairs, one per module, where the stem
/// carries no extension: the caller picks `.py` over `.pyi` when both
/// exist. `-stubs` package directories document under the plain package
/// name and `__init__` files under their package.
pub fn walk_packages(name: &str, path: &Path) -> Vec<(String, PathBuf)> {
    let base = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string();
    let roots = [
        format!("{}{}{}", base, MAIN_SEPARATOR, name),
        format!("{}{}{}{}", base, MAIN_SEPARATOR, name, STUB_SUFFIX),
    ];
    let mut found: BTreeMap<String, PathBuf> = BTreeMap::new();
    for pattern in [
        format!("{}/**/*.py", base),
        format!("{}/**/*.pyi", base),
    ] {
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(pattern, error = %e, "bad glob pattern");
                continue;
            }
        };
        for entry in entries {
            let file = match entry {
                Ok(file) => file,
                Err(e) => {
                    warn!(error = %e, "unreadable path while walking");
                    continue;
                }
            };
            let text = file.to_string_lossy();
            let stem = match text.strip_suffix(".pyi").or_else(|| text.strip_suffix(".py")) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            if !roots.iter().any(|root| stem.starts_with(root.as_str())) {
                continue;
            }
            let mut module = stem
                .trim_start_matches(&base)
                .trim_start_matches(MAIN_SEPARATOR)
                .replace(STUB_SUFFIX, "")
                .replace(MAIN_SEPARATOR, ".");
            if let Some(plain) = module.strip_suffix(".__init__") {
                module = plain.to_string();
            }
            found.entry(module).or_insert_with(|| PathBuf::from(stem));
        }
    }
    found.into_iter().collect()
}

/// Read a module's source, preferring the hand-written `.py` form over a
/// `.pyi` stub.
pub fn read_source(stem: &Path) -> io::Result<(PathBuf, String)> {
    for ext in ["py", "pyi"] {
        let candidate = PathBuf::from(format!("{}.{}", stem.display(), ext));
        if candidate.is_file() {
            let source = fs::read_to_string(&candidate)?;
            return Ok((candidate, source));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no source for {}", stem.display()),
    ))
}

/// Compile every module of one root package into a rendered document.
///
/// Sources are read in parallel; extraction itself runs sequentially over
/// the single symbol model, in deterministic module order.
#[instrument(skip(opts))]
pub fn load_root(root: &str, pwd: &Path, opts: &Options) -> (String, Diagnostics) {
    let modules = walk_packages(root, pwd);
    if modules.is_empty() {
        warn!(root, path = %pwd.display(), "no modules found");
        return (String::new(), Diagnostics::new());
    }
    let sources: Vec<(String, io::Result<(PathBuf, String)>)> = modules
        .par_iter()
        .map(|(module, stem)| (module.clone(), read_source(stem)))
        .collect();
    let mut compiler = Compiler::new(opts.clone());
    for (module, source) in sources {
        match source {
            Ok((path, text)) => {
                debug!(module, path = %path.display(), "extracting");
                if let Err(message) = compiler.parse(&module, &text) {
                    compiler.diags.error(Diagnostic::ParseFailure { module, message });
                }
            }
            Err(e) => warn!(module, error = %e, "no readable source"),
        }
    }
    let doc = compiler.compile();
    (doc, compiler.diags)
}

/// Generate one Markdown document per `(title, root)` pair under `prefix`.
/// With `dry` set, documents are printed instead of written.
pub fn generate(
    roots: &[(String, String)],
    pwd: &Path,
    prefix: &Path,
    opts: &Options,
    dry: bool,
) -> io::Result<Vec<String>> {
    if !prefix.is_dir() && !dry {
        info!(dir = %prefix.display(), "creating output directory");
        fs::create_dir_all(prefix)?;
    }
    let mut outputs = Vec::new();
    for (title, root) in roots {
        info!(root, title, "loading root");
        let (doc, _diags) = load_root(root, pwd, opts);
        if doc.trim().is_empty() {
            warn!(root, "root produced no documentation");
            continue;
        }
        let doc = format!("{} {} API\n\n{}", "#".repeat(opts.level), title, doc);
        if dry {
            println!("{}", doc);
        } else {
            let path = prefix.join(format!("{}-api.md", root.replace('_', "-")));
            info!(path = %path.display(), "writing document");
            fs::write(&path, &doc)?;
        }
        outputs.push(doc);
    }
    Ok(outputs)
}
