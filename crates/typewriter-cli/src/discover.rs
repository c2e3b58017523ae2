//! Go source discovery.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories the Go tool itself ignores.
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata"];

/// Collect `.go` files under `root`, sorted by path.
///
/// Test files, `vendor`, `testdata` and hidden directories are skipped.
/// Without `recursive` only files directly in `root` are returned.
pub fn go_files(root: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_go_source(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "discovered Go files");
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go") && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "package x\n").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_recursive_discovery() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b.go");
        touch(root, "a.go");
        touch(root, "a_test.go");
        touch(root, "README.md");
        touch(root, "sub/c.go");
        touch(root, "vendor/lib/v.go");
        touch(root, "testdata/t.go");
        touch(root, ".git/h.go");
        touch(root, "_build/u.go");

        let files = go_files(root, true).unwrap();
        assert_eq!(names(root, &files), vec!["a.go", "b.go", "sub/c.go"]);
    }

    #[test]
    fn test_flat_discovery() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "a.go");
        touch(root, "sub/c.go");

        let files = go_files(root, false).unwrap();
        assert_eq!(names(root, &files), vec!["a.go"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(go_files(&dir.path().join("nope"), true).is_err());
    }
}
