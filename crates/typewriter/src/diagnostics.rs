//! Non-fatal warnings collected during a run.

use std::fmt;

/// A degraded-but-recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A referenced type is not declared in any scanned file.
    UnresolvedType { owner: String, name: String },
    /// A shape the target cannot express faithfully; a fallback was used.
    UnsupportedShape { owner: String, detail: String },
    /// A field was left out of the output.
    SkippedField {
        owner: String,
        field: String,
        reason: String,
    },
    /// A promoted field lost to a field of the same name.
    FieldCollision {
        owner: String,
        field: String,
        embedded: String,
    },
    /// Two packages declare the same bare type name.
    DuplicateName { name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedType { owner, name } => {
                write!(f, "{}: unresolved type `{}`, using placeholder", owner, name)
            }
            Warning::UnsupportedShape { owner, detail } => write!(f, "{}: {}", owner, detail),
            Warning::SkippedField {
                owner,
                field,
                reason,
            } => write!(f, "{}.{}: skipped ({})", owner, field, reason),
            Warning::FieldCollision {
                owner,
                field,
                embedded,
            } => write!(
                f,
                "{}.{}: promoted field from `{}` shadowed, dropped",
                owner, field, embedded
            ),
            Warning::DuplicateName { name } => {
                write!(f, "type name `{}` is declared in more than one package", name)
            }
        }
    }
}

/// Warning sink.
///
/// Warnings are recorded (and logged) only in verbose mode; they never
/// change what gets rendered.
#[derive(Debug, Default)]
pub struct Diagnostics {
    verbose: bool,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            warnings: Vec::new(),
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn warn(&mut self, warning: Warning) {
        if !self.verbose {
            return;
        }
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
