//! Go type declarations rendered as TypeScript, Flow or Elm.
//!
//! `typewriter` reads Go source, builds a language-agnostic model of the
//! declared types, and renders that model through one of several dialect
//! renderers.
//!
//! # Architecture
//!
//! ```text
//! Input            IR                       Output
//! ─────────     ──────────────────────     ─────────────────
//!               builder.rs                ┌─> TypeScript interfaces
//! *.go ──scan──> ─────────> TypeRegistry ─┼─> Flow object types
//! (input/)      (resolve,   (registry.rs) └─> Elm records
//!                embed, hoist)
//! ```
//!
//! Scanning runs in parallel per file; the builder and renderers are
//! single-threaded. Recoverable problems are collected as [`Warning`]s in
//! [`Diagnostics`] (verbose mode only); anything that stops a run is an
//! [`Error`].
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use typewriter::{Diagnostics, Dialect, RenderOptions, build_registry, draw, input};
//!
//! let file = input::scan_source(
//!     Path::new("user.go"),
//!     "package models\n\ntype User struct {\n\tID int `json:\"id\"`\n}\n",
//! )
//! .unwrap();
//!
//! let mut diags = Diagnostics::new(false);
//! let registry = build_registry(&[file], &mut diags);
//!
//! let mut out = Vec::new();
//! draw(&registry, &mut out, Dialect::TypeScript, &RenderOptions::default(), &mut diags).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("id: number;"));
//! ```
//!
//! # Feature Flags
//!
//! Dialect flags (use `dialect-*` prefix, all on by default):
//! - `dialect-typescript` - TypeScript interfaces and type aliases
//! - `dialect-flow` - Flow object types
//! - `dialect-elm` - Elm records and custom types

pub mod builder;
pub mod diagnostics;
pub mod draw;
pub mod error;
pub mod input;
pub mod ir;
pub mod output;
pub mod registry;
pub mod traits;

pub use builder::build_registry;
pub use diagnostics::{Diagnostics, Warning};
pub use draw::{draw, generate, parse_files};
pub use error::{ConfigError, Error, ParseError, RenderError};
pub use ir::{Field, PackageKind, PackageType, Primitive, TypeRef};
pub use registry::TypeRegistry;
pub use traits::{Dialect, RenderOptions, Renderer};

// Re-export renderer structs
#[cfg(feature = "dialect-typescript")]
pub use output::TypeScriptRenderer;

#[cfg(feature = "dialect-flow")]
pub use output::FlowRenderer;

#[cfg(feature = "dialect-elm")]
pub use output::ElmRenderer;
