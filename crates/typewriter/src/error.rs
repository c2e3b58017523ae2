//! Fatal errors.
//!
//! Non-fatal anomalies go through [`Diagnostics`](crate::diagnostics::Diagnostics)
//! instead; nothing in this module is ever downgraded to a warning.

use std::path::PathBuf;

/// A source file that could not be scanned.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{}:{line}:{column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::Syntax { path, .. } | ParseError::Read { path, .. } => path,
        }
    }
}

/// A discovered shape the selected dialect cannot express at all.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{dialect}: recursive alias `{name}` cannot be expressed without a record")]
    RecursiveAlias { dialect: &'static str, name: String },
}

/// Invalid input, raised before any file is scanned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown language `{0}`; expected one of: ts, flow, elm")]
    UnknownDialect(String),

    #[error("dialect `{0}` is not enabled in this build")]
    DialectDisabled(&'static str),

    #[error("no Go source files to scan")]
    NoInputFiles,

    #[error("cannot write to {}: {source}", path.display())]
    UnwritableSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any error that stops a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{} file(s) failed to parse:\n{}", .0.len(), format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no exported types found")]
    NoTypes,

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_file_and_position() {
        let err = ParseError::Syntax {
            path: PathBuf::from("models/user.go"),
            line: 3,
            column: 7,
            message: "unexpected `}`".into(),
        };
        assert_eq!(err.to_string(), "models/user.go:3:7: unexpected `}`");
    }

    #[test]
    fn accumulated_parse_errors_are_listed() {
        let err = Error::Parse(vec![
            ParseError::Syntax {
                path: PathBuf::from("a.go"),
                line: 1,
                column: 1,
                message: "syntax error".into(),
            },
            ParseError::Syntax {
                path: PathBuf::from("b.go"),
                line: 2,
                column: 4,
                message: "missing `}`".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 file(s) failed to parse"));
        assert!(text.contains("  a.go:1:1: syntax error"));
        assert!(text.contains("  b.go:2:4: missing `}`"));
    }
}
