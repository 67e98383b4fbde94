use std::path::PathBuf;

use apimark::logging::{init_logging, LogConfig};
use apimark::{loader, Options};
use tracing::Level;

#[derive(Debug)]
struct Args {
    /// `(title, root module)` pairs from `Title=module` arguments.
    roots: Vec<(String, String)>,
    current: PathBuf,
    dir: PathBuf,
    /// Flags left `None`/`false` fall back to a discovered `apimark.toml`.
    level: Option<usize>,
    toc: bool,
    no_link: bool,
    dry: bool,
    verbose: bool,
}

impl Args {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        if args.len() < 2 {
            return Err(Self::usage(&args[0]));
        }

        let mut roots = Vec::new();
        let mut current = PathBuf::from(".");
        let mut dir = PathBuf::from("docs");
        let mut level = None;
        let mut toc = false;
        let mut no_link = false;
        let mut dry = false;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => return Err(Self::usage(&args[0])),
                "-v" | "--version" => {
                    return Err(format!("apimark {}", env!("CARGO_PKG_VERSION")));
                }
                "-c" | "--current" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--current requires a directory".to_string());
                    }
                    current = PathBuf::from(&args[i]);
                }
                "-d" | "--dir" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--dir requires a directory".to_string());
                    }
                    dir = PathBuf::from(&args[i]);
                }
                "--level" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--level requires a number".to_string());
                    }
                    level = Some(
                        args[i]
                            .parse()
                            .map_err(|_| "invalid value for --level".to_string())?,
                    );
                }
                "--toc" => toc = true,
                "--no-link" => no_link = true,
                "--dry" => dry = true,
                "--debug" => verbose = true,
                arg if arg.starts_with('-') => {
                    return Err(format!("unknown option: {}\n\n{}", arg, Self::usage(&args[0])));
                }
                pair => {
                    // `Title=module` names the section; a bare name is both.
                    let (title, module) = match pair.split_once('=') {
                        Some((title, "")) => (title, title),
                        Some((title, module)) => (title, module),
                        None => (pair, pair),
                    };
                    roots.push((title.to_string(), module.to_string()));
                }
            }
            i += 1;
        }

        if roots.is_empty() {
            return Err("no modules specified".to_string());
        }
        Ok(Self { roots, current, dir, level, toc, no_link, dry, verbose })
    }

    fn usage(prog: &str) -> String {
        format!(
            "apimark - Compile Python public APIs into generic Markdown\n\n\
            USAGE:\n    {} [OPTIONS] <module>...\n\n\
            Each module is a name in the search path; use `Title=module_name`\n\
            to give its document a separate title.\n\n\
            OPTIONS:\n    \
            -h, --help       Print help information\n    \
            -v, --version    Print version information\n    \
            -c, --current D  Search path for the packages (default: .)\n    \
            -d, --dir D      Output directory (default: docs)\n    \
            --level N        Starting heading level (default: 1)\n    \
            --toc            Generate a table of contents\n    \
            --no-link        Don't emit anchor links\n    \
            --dry            Print the result instead of writing files\n    \
            --debug          Verbose logging\n\n\
            Unset options fall back to an `apimark.toml` found in the\n\
            search path or one of its parents.",
            prog
        )
    }
}

fn main() {
    let args = match Args::from_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let _guard = init_logging(LogConfig::new().with_level(log_level));

    let mut opts = Options::discover(&args.current);
    if let Some(level) = args.level {
        opts.level = level;
    }
    if args.toc {
        opts.toc = true;
    }
    if args.no_link {
        opts.link = false;
    }
    let opts = opts.normalized();
    match loader::generate(&args.roots, &args.current, &args.dir, &opts, args.dry) {
        Ok(docs) => {
            if docs.is_empty() {
                eprintln!("nothing documented");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
