//! Configuration system for typewriter.
//!
//! Loads config from:
//! 1. Global: ~/.config/typewriter/config.toml
//! 2. Per-project: .typewriter/config.toml in the scanned directory
//!    (overrides global)
//!
//! Command-line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [scan]
//! recursive = true
//!
//! [output]
//! lang = "ts"
//! export = true
//! exact = false
//! elm_module = "Types"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Descend into subdirectories of the scanned directory.
    pub recursive: Option<bool>,
}

/// Rendering configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Target dialect: ts, flow or elm.
    pub lang: Option<String>,
    /// Prefix TypeScript declarations with `export`.
    pub export: Option<bool>,
    /// Render Flow records as exact object types.
    pub exact: Option<bool>,
    /// Module name for Elm output.
    pub elm_module: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TypewriterConfig {
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

impl TypewriterConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/typewriter/config.toml,
    /// then merges with per-project config from .typewriter/config.toml.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::load_file(&global_path) {
                config = config.merge(global);
            }
        }

        let project_path = root.join(".typewriter").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("typewriter").join("config.toml"))
    }

    /// Load config from a file path. Missing files are silently skipped.
    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring invalid config: {}", e);
                None
            }
        }
    }

    /// Merge another config into this one. Keys set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            scan: ScanConfig {
                recursive: other.scan.recursive.or(self.scan.recursive),
            },
            output: OutputConfig {
                lang: other.output.lang.or(self.output.lang),
                export: other.output.export.or(self.output.export),
                exact: other.output.exact.or(self.output.exact),
                elm_module: other.output.elm_module.or(self.output.elm_module),
            },
        }
    }

    pub fn recursive(&self) -> bool {
        self.scan.recursive.unwrap_or(true)
    }

    pub fn lang(&self) -> Option<&str> {
        self.output.lang.as_deref()
    }

    pub fn export(&self) -> bool {
        self.output.export.unwrap_or(true)
    }

    pub fn exact(&self) -> bool {
        self.output.exact.unwrap_or(false)
    }

    pub fn elm_module(&self) -> &str {
        self.output.elm_module.as_deref().unwrap_or("Types")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_project_config(dir: &TempDir, content: &str) {
        let config_dir = dir.path().join(".typewriter");
        std::fs::create_dir_all(&config_dir).unwrap();
        let mut file = std::fs::File::create(config_dir.join("config.toml")).unwrap();
        writeln!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = TypewriterConfig::default();
        assert!(config.recursive());
        assert_eq!(config.lang(), None);
        assert!(config.export());
        assert!(!config.exact());
        assert_eq!(config.elm_module(), "Types");
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_project_config(
            &dir,
            r#"
[scan]
recursive = false

[output]
lang = "elm"
elm_module = "Api.Types"
"#,
        );

        let config = TypewriterConfig::load(dir.path());
        assert!(!config.recursive());
        assert_eq!(config.lang(), Some("elm"));
        assert_eq!(config.elm_module(), "Api.Types");
        assert!(config.export()); // default
    }

    #[test]
    fn test_partial_merge_keeps_unset_keys() {
        let global = TypewriterConfig {
            scan: ScanConfig {
                recursive: Some(false),
            },
            output: OutputConfig {
                lang: Some("flow".into()),
                exact: Some(true),
                ..Default::default()
            },
        };
        let project: TypewriterConfig = toml::from_str("[output]\nlang = \"ts\"\n").unwrap();

        let config = global.merge(project);
        assert_eq!(config.lang(), Some("ts"));
        assert!(config.exact());
        assert!(!config.recursive());
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        write_project_config(&dir, "[output\nlang = ");
        assert_eq!(
            TypewriterConfig::load_file(&dir.path().join(".typewriter/config.toml")),
            None
        );
    }
}
