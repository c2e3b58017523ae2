//! Source scanning.
//!
//! Reads Go files into syntax-level declarations ([`RawDecl`]) that the
//! [builder](crate::builder) lowers into the IR.

pub mod go;
pub mod tags;

pub use go::{RawDecl, RawField, RawType, SourceFile, scan_file, scan_files, scan_source};
pub use tags::{StructTag, TagValue};
