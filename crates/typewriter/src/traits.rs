//! Traits for dialect renderers.

use crate::diagnostics::Diagnostics;
use crate::error::{ConfigError, RenderError};
use crate::registry::TypeRegistry;
use std::fmt;
use std::str::FromStr;

/// A renderer turns the whole registry into source text for one dialect.
///
/// # Implementing Custom Renderers
///
/// ```ignore
/// use typewriter::{Diagnostics, RenderError, Renderer, TypeRegistry};
///
/// struct KotlinRenderer;
///
/// impl Renderer for KotlinRenderer {
///     fn dialect(&self) -> &'static str { "kotlin" }
///     fn extension(&self) -> &'static str { "kt" }
///     fn render(&self, registry: &TypeRegistry, diags: &mut Diagnostics) -> Result<String, RenderError> {
///         /* ... */
///     }
/// }
/// ```
pub trait Renderer: Send + Sync {
    /// Dialect identifier (e.g., "typescript", "elm").
    fn dialect(&self) -> &'static str;

    /// File extension for generated code (e.g., "ts", "js", "elm").
    fn extension(&self) -> &'static str;

    /// Render every exported type, in registry order.
    fn render(&self, registry: &TypeRegistry, diags: &mut Diagnostics)
    -> Result<String, RenderError>;
}

/// The closed set of supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    TypeScript,
    Flow,
    Elm,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::TypeScript, Dialect::Flow, Dialect::Elm];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::TypeScript => "typescript",
            Dialect::Flow => "flow",
            Dialect::Elm => "elm",
        }
    }

    /// Build the renderer for this dialect.
    ///
    /// Fails when the dialect's feature was compiled out.
    pub fn renderer(self, options: &RenderOptions) -> Result<Box<dyn Renderer>, ConfigError> {
        match self {
            #[cfg(feature = "dialect-typescript")]
            Dialect::TypeScript => Ok(Box::new(crate::output::TypeScriptRenderer::new(options))),
            #[cfg(feature = "dialect-flow")]
            Dialect::Flow => Ok(Box::new(crate::output::FlowRenderer::new(options))),
            #[cfg(feature = "dialect-elm")]
            Dialect::Elm => Ok(Box::new(crate::output::ElmRenderer::new(options))),
            #[allow(unreachable_patterns)]
            other => {
                let _ = options;
                Err(ConfigError::DialectDisabled(other.name()))
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Ok(Dialect::TypeScript),
            "flow" => Ok(Dialect::Flow),
            "elm" => Ok(Dialect::Elm),
            _ => Err(ConfigError::UnknownDialect(s.to_string())),
        }
    }
}

/// Options shared by all renderers. Each dialect reads the ones it knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix declarations with `export` (TypeScript).
    pub export: bool,
    /// Render every record as an exact object type (Flow).
    pub exact: bool,
    /// Module name in the generated header (Elm).
    pub elm_module: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            export: true,
            exact: false,
            elm_module: "Types".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dialect_names() {
        assert_eq!("ts".parse::<Dialect>().unwrap(), Dialect::TypeScript);
        assert_eq!("TypeScript".parse::<Dialect>().unwrap(), Dialect::TypeScript);
        assert_eq!("flow".parse::<Dialect>().unwrap(), Dialect::Flow);
        assert_eq!("elm".parse::<Dialect>().unwrap(), Dialect::Elm);
    }

    #[test]
    fn unknown_dialect_is_a_config_error() {
        let err = "kotlin".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDialect(ref s) if s == "kotlin"));
    }

    #[test]
    fn every_dialect_has_a_renderer() {
        let options = RenderOptions::default();
        for dialect in Dialect::ALL {
            let renderer = dialect.renderer(&options).unwrap();
            assert_eq!(renderer.dialect(), dialect.name());
        }
    }
}
