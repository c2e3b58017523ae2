//! Output destinations.
//!
//! A file destination is written through a temporary file in the same
//! directory, which replaces the destination only on [`Sink::commit`]. A
//! failed run never leaves a half-written file behind.

use anyhow::Context;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use typewriter::ConfigError;

pub enum Sink {
    Stdout(io::Stdout),
    File {
        temp: NamedTempFile,
        target: PathBuf,
    },
}

impl Sink {
    /// Prepare the destination. Runs before any scanning so that an
    /// unwritable target fails fast.
    pub fn open(out: Option<&Path>, extension: &str) -> Result<Self, ConfigError> {
        let Some(out) = out else {
            return Ok(Sink::Stdout(io::stdout()));
        };
        let target = target_path(out, extension);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let unwritable = |source| ConfigError::UnwritableSink {
            path: target.clone(),
            source,
        };
        std::fs::create_dir_all(&dir).map_err(unwritable)?;
        let temp = new_temp(&dir, &target).map_err(unwritable)?;
        Ok(Sink::File { temp, target })
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Stdout(stdout) => stdout,
            Sink::File { temp, .. } => temp.as_file_mut(),
        }
    }

    /// Move the output into place. Returns the written path, if any.
    pub fn commit(self) -> anyhow::Result<Option<PathBuf>> {
        match self {
            Sink::Stdout(mut stdout) => {
                stdout.flush()?;
                Ok(None)
            }
            Sink::File { temp, target } => {
                temp.persist(&target)
                    .map_err(|e| e.error)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                Ok(Some(target))
            }
        }
    }
}

/// A temp file in `dir` that ends up with the mode a plain create would
/// give: the existing target's, or 0644 less the umask.
fn new_temp(dir: &Path, target: &Path) -> io::Result<NamedTempFile> {
    #[allow(unused_mut)]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let temp = builder.tempfile_in(dir)?;
    if let Ok(existing) = std::fs::metadata(target) {
        temp.as_file().set_permissions(existing.permissions())?;
    }
    Ok(temp)
}

/// Where output lands: a directory (existing, or spelled with a trailing
/// separator) gets `types.<extension>` inside it.
pub fn target_path(out: &Path, extension: &str) -> PathBuf {
    let spelled_as_dir = out
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator);
    if out.is_dir() || spelled_as_dir {
        out.join(format!("types.{}", extension))
    } else {
        out.to_path_buf()
    }
}
