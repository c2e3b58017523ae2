//! Render a registry and hand the result to a sink.

use crate::builder::build_registry;
use crate::diagnostics::Diagnostics;
use crate::error::{ConfigError, Error};
use crate::input::scan_files;
use crate::registry::TypeRegistry;
use crate::traits::{Dialect, RenderOptions};
use std::io::Write;
use std::path::PathBuf;

/// Render every exported type of `registry` and write it to `sink`.
///
/// The output is produced in memory first; `sink` sees a single write, and
/// nothing at all when rendering fails.
pub fn draw<W: Write + ?Sized>(
    registry: &TypeRegistry,
    sink: &mut W,
    dialect: Dialect,
    options: &RenderOptions,
    diags: &mut Diagnostics,
) -> Result<(), Error> {
    if registry.exported().next().is_none() {
        return Err(Error::NoTypes);
    }
    let renderer = dialect.renderer(options)?;
    let output = renderer.render(registry, diags)?;
    tracing::debug!(dialect = renderer.dialect(), bytes = output.len(), "rendered");
    sink.write_all(output.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Scan and build the registry for `paths`.
///
/// Every file is scanned even when some fail; any failure stops the run
/// before rendering, with all parse errors reported together.
pub fn parse_files(paths: &[PathBuf], diags: &mut Diagnostics) -> Result<TypeRegistry, Error> {
    if paths.is_empty() {
        return Err(ConfigError::NoInputFiles.into());
    }
    let (files, errors) = scan_files(paths);
    tracing::debug!(scanned = files.len(), failed = errors.len(), "scanned files");
    if !errors.is_empty() {
        return Err(Error::Parse(errors));
    }
    Ok(build_registry(&files, diags))
}

/// Scan, build and render in one call, returning the rendered text.
pub fn generate(
    paths: &[PathBuf],
    dialect: Dialect,
    options: &RenderOptions,
    verbose: bool,
) -> Result<String, Error> {
    // Fail on a disabled dialect before touching any file.
    dialect.renderer(options)?;

    let mut diags = Diagnostics::new(verbose);
    let registry = parse_files(paths, &mut diags)?;
    let mut output = Vec::new();
    draw(&registry, &mut output, dialect, options, &mut diags)?;
    String::from_utf8(output).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
