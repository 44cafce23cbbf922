//! Project configuration for `docwatch.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [paths] [transpile] [inject] [watch] [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! The config file is optional. Without one, the fixed layout applies:
//! `docs/` → `dist/`, links injected into `index.html`.

pub mod section;
pub mod types;

pub use section::{InjectConfig, PathsConfig, ServeConfig, TranspileConfig, WatchConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    cli::{Cli, Commands, ServeArgs},
    log,
    transpiler::TranspileOptions,
    utils::glob::{Glob, GlobError},
    utils::path::{normalize_path, to_slash},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing docwatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file (may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub transpile: TranspileConfig,

    #[serde(default)]
    pub inject: InjectConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// The project root is `--root` or the current directory. A missing
    /// config file means defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let root = normalize_path(&cli.root.clone().unwrap_or(cwd));
        let config_path = if cli.config.is_absolute() {
            cli.config.clone()
        } else {
            root.join(&cli.config)
        };

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };

        config.config_path = config_path;
        config.set_root(&root);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored):", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply serve overrides from `serve`/`default` commands.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Some(Commands::Serve(args) | Commands::Default(args)) = &cli.command {
            self.apply_serve_args(args);
        }
    }

    fn apply_serve_args(&mut self, args: &ServeArgs) {
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        Self::update_option(&mut self.serve.reload_port, args.reload_port.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate all sections, collecting every error.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.paths.validate(&mut diag);
        self.transpile.validate(&mut diag);
        self.inject.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    // ========================================================================
    // resolved paths
    // ========================================================================

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Absolute source root (e.g. `<root>/docs`).
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.paths.source)
    }

    /// Absolute output root (e.g. `<root>/dist`).
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.paths.output)
    }

    /// Absolute index document path.
    pub fn entry_path(&self) -> PathBuf {
        self.root.join(&self.paths.entry)
    }

    /// Include root for transpiler directives (defaults to the source root).
    pub fn include_path(&self) -> PathBuf {
        match &self.transpile.include_path {
            Some(path) => self.root.join(path),
            None => self.source_dir(),
        }
    }

    /// `docs/**/*.{md,apib}`
    pub fn source_glob(&self) -> Result<Glob, GlobError> {
        let extensions = self.transpile.extensions.join(",");
        Glob::new(&format!(
            "{}/**/*.{{{}}}",
            to_slash(&self.paths.source),
            extensions
        ))
    }

    /// `dist/**/*.html`
    pub fn output_glob(&self) -> Result<Glob, GlobError> {
        Glob::new(&format!("{}/**/*.html", to_slash(&self.paths.output)))
    }

    /// `dist/**/*`: everything under the output root, not the root itself.
    pub fn clean_glob(&self) -> Result<Glob, GlobError> {
        Glob::new(&format!("{}/**/*", to_slash(&self.paths.output)))
    }

    pub fn transpile_options(&self) -> TranspileOptions {
        TranspileOptions {
            include_path: self.include_path(),
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config from TOML. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> ProjectConfig {
    let mut config = ProjectConfig::default();
    config.set_root(root);
    config.config_path = root.join("docwatch.toml");
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            ProjectConfig::parse_with_ignored("[paths]\nsrc = \"docs\"\n[extra]\nx = 1").unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f == "paths.src"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ProjectConfig::parse_with_ignored("[paths\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_globs_follow_paths() {
        let config = test_parse_config("[paths]\nsource = \"api\"\noutput = \"site\"");
        assert_eq!(config.source_glob().unwrap().as_str(), "api/**/*.{md,apib}");
        assert_eq!(config.output_glob().unwrap().as_str(), "site/**/*.html");
        assert_eq!(config.clean_glob().unwrap().as_str(), "site/**/*");
    }

    #[test]
    fn test_include_path_defaults_to_source() {
        let config = test_config_at(Path::new("/proj"));
        assert_eq!(config.include_path(), PathBuf::from("/proj/docs"));

        let mut config = config;
        config.transpile.include_path = Some("shared".into());
        assert_eq!(config.include_path(), PathBuf::from("/proj/shared"));
    }

    #[test]
    fn test_load_without_config_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["docwatch", "--root", root, "transpile"]);

        let config = ProjectConfig::load(&cli).unwrap();
        assert_eq!(config.root, normalize_path(dir.path()));
        assert_eq!(config.source_dir(), config.root.join("docs"));
    }

    #[test]
    fn test_load_applies_serve_flags() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("docwatch.toml"), "[serve]\nport = 4000\n").unwrap();
        let root = dir.path().to_str().unwrap();

        let cli = Cli::parse_from(["docwatch", "--root", root, "serve"]);
        assert_eq!(ProjectConfig::load(&cli).unwrap().serve.port, 4000);

        let cli = Cli::parse_from(["docwatch", "--root", root, "serve", "--port", "4100"]);
        assert_eq!(ProjectConfig::load(&cli).unwrap().serve.port, 4100);
    }

    #[test]
    fn test_load_rejects_invalid_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("docwatch.toml"), "[paths]\noutput = \"/tmp/out\"\n").unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["docwatch", "--root", root, "clean"]);
        assert!(ProjectConfig::load(&cli).is_err());
    }
}
