//! typewriter: render Go type declarations as TypeScript, Flow or Elm.

mod config;
mod discover;
mod sink;

use anyhow::{Context, Result, bail};
use clap::Parser;
use config::TypewriterConfig;
use sink::Sink;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use typewriter::{Diagnostics, Dialect, Error, RenderOptions, draw, parse_files};

/// Convert Go types to other languages.
#[derive(Parser, Debug)]
#[command(name = "typewriter", version, about)]
struct Cli {
    /// Directory to parse types from
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Parse a single Go file (overrides --dir and --recursive)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Descend into subdirectories of --dir (the default)
    #[arg(short, long, overrides_with = "no_recursive")]
    recursive: bool,

    /// Only parse files directly inside --dir
    #[arg(long, overrides_with = "recursive")]
    no_recursive: bool,

    /// Target language: ts, flow, elm
    #[arg(short, long)]
    lang: Option<String>,

    /// Output file or directory (stdout if not specified)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Report every skipped type, field and unresolved reference
    #[arg(short, long)]
    verbose: bool,

    /// Print the parsed type model as JSON instead of rendering
    #[arg(long)]
    dump_model: bool,

    /// Leave out the `export` keyword (TypeScript)
    #[arg(long)]
    no_export: bool,

    /// Render every record as an exact object type (Flow)
    #[arg(long)]
    exact: bool,

    /// Module name of the generated file (Elm)
    #[arg(long)]
    elm_module: Option<String>,
}

/// Everything a run needs, after flags and config files are merged.
#[derive(Debug)]
struct Settings {
    inputs: Input,
    dialect: Option<Dialect>,
    options: RenderOptions,
    out: Option<PathBuf>,
    verbose: bool,
    dump_model: bool,
}

#[derive(Debug, PartialEq)]
enum Input {
    File(PathBuf),
    Dir { root: PathBuf, recursive: bool },
}

impl Settings {
    fn resolve(cli: Cli, config: &TypewriterConfig) -> Result<Self> {
        let lang = cli.lang.as_deref().or(config.lang());
        let dialect = match lang {
            Some(lang) => Some(lang.parse::<Dialect>()?),
            None if cli.dump_model => None,
            None => bail!("no language selected; pass --lang with one of: ts, flow, elm"),
        };

        let recursive = if cli.no_recursive {
            false
        } else {
            cli.recursive || config.recursive()
        };
        let inputs = match cli.file {
            Some(file) => Input::File(file),
            None => Input::Dir {
                root: cli.dir,
                recursive,
            },
        };

        Ok(Self {
            inputs,
            dialect,
            options: RenderOptions {
                export: !cli.no_export && config.export(),
                exact: cli.exact || config.exact(),
                elm_module: cli
                    .elm_module
                    .unwrap_or_else(|| config.elm_module().to_string()),
            },
            out: cli.out,
            verbose: cli.verbose,
            dump_model: cli.dump_model,
        })
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config_root = match &cli.file {
        Some(file) => file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        None => cli.dir.clone(),
    };
    let config = TypewriterConfig::load(&config_root);
    let settings = Settings::resolve(cli, &config)?;

    // Validate the renderer and destination before touching any source.
    let extension = match settings.dialect {
        Some(_) if settings.dump_model => "json",
        Some(dialect) => dialect.renderer(&settings.options)?.extension(),
        None => "json",
    };
    let mut sink = Sink::open(settings.out.as_deref(), extension)?;

    let paths = match &settings.inputs {
        Input::File(file) => vec![file.clone()],
        Input::Dir { root, recursive } => discover::go_files(root, *recursive)
            .with_context(|| format!("failed to read {}", root.display()))?,
    };
    tracing::info!(files = paths.len(), "scanning");

    let mut diags = Diagnostics::new(settings.verbose);
    let registry = parse_files(&paths, &mut diags)?;

    match settings.dialect {
        Some(dialect) if !settings.dump_model => {
            draw(&registry, sink.writer(), dialect, &settings.options, &mut diags)?;
        }
        _ => {
            let writer = sink.writer();
            serde_json::to_writer_pretty(&mut *writer, &registry)?;
            writeln!(writer)?;
        }
    }

    if let Some(path) = sink.commit()? {
        tracing::info!(path = %path.display(), "wrote output");
    }
    if diags.verbose() {
        tracing::info!(warnings = diags.warnings().len(), "done");
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<Error>() {
            // Each parse error on its own line, already formatted.
            Some(Error::Parse(_)) => eprintln!("{}", e),
            _ => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("typewriter").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve(parse(&["--lang", "ts"]), &TypewriterConfig::default()).unwrap();
        assert_eq!(
            settings.inputs,
            Input::Dir {
                root: PathBuf::from("."),
                recursive: true
            }
        );
        assert_eq!(settings.dialect, Some(Dialect::TypeScript));
        assert_eq!(settings.options, RenderOptions::default());
        assert!(settings.out.is_none());
    }

    #[test]
    fn test_short_flags() {
        let settings = Settings::resolve(
            parse(&["-d", "models", "-l", "flow", "-o", "out.js", "-v"]),
            &TypewriterConfig::default(),
        )
        .unwrap();
        assert_eq!(
            settings.inputs,
            Input::Dir {
                root: PathBuf::from("models"),
                recursive: true
            }
        );
        assert_eq!(settings.dialect, Some(Dialect::Flow));
        assert_eq!(settings.out, Some(PathBuf::from("out.js")));
        assert!(settings.verbose);
    }

    #[test]
    fn test_file_overrides_dir() {
        let settings = Settings::resolve(
            parse(&["--dir", "models", "--file", "models/user.go", "--lang", "elm"]),
            &TypewriterConfig::default(),
        )
        .unwrap();
        assert_eq!(settings.inputs, Input::File(PathBuf::from("models/user.go")));
    }

    #[test]
    fn test_flags_override_config() {
        let config: TypewriterConfig = toml::from_str(
            "[scan]\nrecursive = false\n\n[output]\nlang = \"flow\"\nexport = false\nelm_module = \"Api\"\n",
        )
        .unwrap();

        let from_config = Settings::resolve(parse(&[]), &config).unwrap();
        assert_eq!(from_config.dialect, Some(Dialect::Flow));
        assert!(!from_config.options.export);
        assert_eq!(from_config.options.elm_module, "Api");
        assert!(matches!(from_config.inputs, Input::Dir { recursive: false, .. }));

        let overridden = Settings::resolve(
            parse(&["--lang", "elm", "--elm-module", "Types.Api", "-r"]),
            &config,
        )
        .unwrap();
        assert_eq!(overridden.dialect, Some(Dialect::Elm));
        assert_eq!(overridden.options.elm_module, "Types.Api");
        assert!(matches!(overridden.inputs, Input::Dir { recursive: true, .. }));
    }

    #[test]
    fn test_no_recursive() {
        let settings = Settings::resolve(
            parse(&["--no-recursive", "--lang", "ts"]),
            &TypewriterConfig::default(),
        )
        .unwrap();
        assert!(matches!(settings.inputs, Input::Dir { recursive: false, .. }));
    }

    #[test]
    fn test_language_is_required_unless_dumping() {
        let err = Settings::resolve(parse(&[]), &TypewriterConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no language selected"));

        let dump = Settings::resolve(parse(&["--dump-model"]), &TypewriterConfig::default());
        assert!(dump.unwrap().dialect.is_none());
    }

    #[test]
    fn test_unknown_language() {
        let err = Settings::resolve(parse(&["--lang", "kotlin"]), &TypewriterConfig::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<typewriter::ConfigError>(),
            Some(typewriter::ConfigError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("user.go"),
            "package models\n\ntype User struct {\n\tID int `json:\"id\"`\n}\n",
        )
        .unwrap();
        let out = dir.path().join("gen/");

        let cli = parse(&[
            "--dir",
            dir.path().to_str().unwrap(),
            "--lang",
            "ts",
            "--out",
            out.to_str().unwrap(),
        ]);
        run(cli).unwrap();

        let written = std::fs::read_to_string(dir.path().join("gen/types.ts")).unwrap();
        assert!(written.contains("export interface User {\n  id: number;\n}\n"));
    }

    #[test]
    fn test_run_leaves_no_file_on_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.go"), "package m\n\ntype X struct {\n").unwrap();
        let out = dir.path().join("types.js");

        let cli = parse(&[
            "--dir",
            dir.path().to_str().unwrap(),
            "--lang",
            "flow",
            "--out",
            out.to_str().unwrap(),
        ]);
        let err = run(cli).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Parse(_))));
        assert!(!out.exists());
    }
}
