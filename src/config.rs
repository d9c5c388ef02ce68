//! Engine configuration, usually read from a toml file.
//!
//! ```toml
//! default_root = "templates"
//! default_theme = "midnight-blue"
//! max_include_depth = 32
//!
//! [themes]
//! midnight-blue = "themes/midnight-blue"
//! ```

use crate::engine::{Engine, DEFAULT_MAX_INCLUDE_DEPTH};
use crate::errors::{Error, Result};
use crate::resolver::DEFAULT_ROOT;
use crate::source::DirSource;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory of the default templates.
    pub default_root: PathBuf,
    /// Theme name to directory of overriding templates.
    #[serde(default)]
    pub themes: BTreeMap<String, PathBuf>,
    /// Theme to use when a render does not ask for one.
    #[serde(default)]
    pub default_theme: Option<String>,
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

impl EngineConfig {
    /// A config with only default templates, in `root`.
    pub fn new(default_root: impl Into<PathBuf>) -> Self {
        EngineConfig {
            default_root: default_root.into(),
            themes: BTreeMap::new(),
            default_theme: None,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Read a config file.
    ///
    /// Relative directories in the file are relative to the directory
    /// of the file itself.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = EngineConfig::from_toml(&text)?;
        let base = path.parent().unwrap_or(Path::new("."));
        debug!(config = %path.display(), "loaded engine config");
        Ok(config.relative_to(base))
    }

    /// Resolve relative directories against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.default_root = base.join(&self.default_root);
        for dir in self.themes.values_mut() {
            *dir = base.join(&*dir);
        }
        self
    }

    fn check(&self) -> Result<()> {
        if self.themes.contains_key(DEFAULT_ROOT) {
            return Err(Error::ReservedThemeName(DEFAULT_ROOT.into()));
        }
        if let Some(theme) = &self.default_theme {
            if !self.themes.contains_key(theme) {
                return Err(Error::Config(format!(
                    "default_theme {theme:?} is not among the themes"
                )));
            }
        }
        Ok(())
    }

    /// Create an engine reading templates from the configured
    /// directories.
    pub fn build(&self) -> Result<Engine> {
        self.check()?;
        let engine = self.themes.iter().try_fold(
            Engine::new(DirSource::new(&self.default_root)),
            |engine, (name, dir)| engine.with_theme(name, DirSource::new(dir)),
        )?;
        Ok(engine.with_max_include_depth(self.max_include_depth))
    }
}

#[cfg(test)]
mod test {
    use super::EngineConfig;
    use crate::errors::Error;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[test]
    fn full_config() {
        let config = EngineConfig::from_toml(
            r#"
            default_root = "templates"
            default_theme = "midnight-blue"
            max_include_depth = 4

            [themes]
            midnight-blue = "themes/midnight-blue"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_root, PathBuf::from("templates"));
        assert_eq!(config.default_theme.as_deref(), Some("midnight-blue"));
        assert_eq!(config.max_include_depth, 4);
        assert_eq!(
            config.themes["midnight-blue"],
            PathBuf::from("themes/midnight-blue")
        );
    }

    #[test]
    fn minimal_config() {
        let config = EngineConfig::from_toml("default_root = \"t\"").unwrap();
        assert_eq!(config, EngineConfig::new("t"));
    }

    #[test]
    fn unknown_default_theme() {
        assert!(matches!(
            EngineConfig::from_toml(
                "default_root = \"t\"\ndefault_theme = \"x\""
            ),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn theme_named_like_default_root() {
        assert!(matches!(
            EngineConfig::from_toml(
                "default_root = \"t\"\n[themes]\ndefault = \"u\""
            ),
            Err(Error::ReservedThemeName(_))
        ));
    }

    #[test]
    fn unknown_field() {
        assert!(matches!(
            EngineConfig::from_toml("default_root = \"t\"\nroot = \"u\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn load_resolves_relative_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("templayer.toml");
        fs::write(
            &file,
            "default_root = \"templates\"\n[themes]\ndark = \"themes/dark\"\n",
        )
        .unwrap();
        let config = EngineConfig::load(&file).unwrap();
        assert_eq!(config.default_root, dir.path().join("templates"));
        assert_eq!(config.themes["dark"], dir.path().join("themes/dark"));
    }

    #[test]
    fn absolute_dirs_are_kept() {
        let config =
            EngineConfig::new("/srv/templates").relative_to(Path::new("/etc"));
        assert_eq!(config.default_root, PathBuf::from("/srv/templates"));
    }

    #[test]
    fn build_engine_from_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("default")).unwrap();
        fs::create_dir_all(dir.path().join("dark")).unwrap();
        fs::write(dir.path().join("default/page.html"), "light").unwrap();
        fs::write(dir.path().join("dark/page.html"), "dark").unwrap();
        let mut config = EngineConfig::new(dir.path().join("default"));
        config.themes.insert("dark".into(), dir.path().join("dark"));
        let engine = config.build().unwrap();
        let ctx = crate::Context::new();
        let env = crate::RenderEnv::new();
        assert_eq!(engine.render("page.html", &ctx, &env).unwrap(), "light");
        let env = env.theme("dark");
        assert_eq!(engine.render("page.html", &ctx, &env).unwrap(), "dark");
    }
}
