use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid page size {width}x{height} in {config_path}")]
    InvalidPageSize {
        config_path: PathBuf,
        width: usize,
        height: usize,
    },
}

fn default_page_width() -> usize {
    80
}

fn default_page_height() -> usize {
    25
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for `.form` files.
    pub forms_path: PathBuf,
    /// Page grid used by forms that don't set their own size.
    #[serde(default = "default_page_width")]
    pub page_width: usize,
    #[serde(default = "default_page_height")]
    pub page_height: usize,
    /// Reject forms that place fields missing from `fields`.
    #[serde(default)]
    pub strict_fields: bool,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Config {
    pub fn new(forms_path: impl Into<PathBuf>) -> Self {
        Self {
            forms_path: forms_path.into(),
            page_width: default_page_width(),
            page_height: default_page_height(),
            strict_fields: false,
            fields: Vec::new(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if config.page_width == 0 || config.page_height == 0 {
            return Err(ConfigError::InvalidPageSize {
                config_path: config_path.to_path_buf(),
                width: config.page_width,
                height: config.page_height,
            });
        }

        // Expand shell variables and tilde in the forms directory
        config.forms_path = Self::expand_path(&config.forms_path).unwrap_or(config.forms_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/formlayout");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The field names every form must stick to, when `strict_fields` is on.
    pub fn field_catalogue(&self) -> Option<BTreeSet<String>> {
        self.strict_fields
            .then(|| self.fields.iter().cloned().collect())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        (temp_dir, config_file)
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/formlayout/config.toml"));
    }

    #[test]
    fn test_defaults_for_missing_keys() {
        let (_dir, config_file) = write_config(r#"forms_path = "/srv/forms""#);

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config, Config::new("/srv/forms"));
        assert_eq!(config.field_catalogue(), None);
    }

    #[test]
    fn test_full_config() {
        let (_dir, config_file) = write_config(
            r#"
forms_path = "/srv/forms"
page_width = 60
page_height = 20
strict_fields = true
fields = ["name", "email"]
"#,
        );

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!((config.page_width, config.page_height), (60, 20));
        assert_eq!(
            config.field_catalogue(),
            Some(BTreeSet::from(["email".to_string(), "name".to_string()]))
        );
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let (_dir, config_file) = write_config("forms_path = \"/srv/forms\"\npage_width = 0\n");

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidPageSize {
                width: 0,
                height: 25,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let (_dir, config_file) = write_config("forms_path = ");

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("FORMLAYOUT_TEST_ROOT", "/test/env/path");
        }

        let expanded = Config::expand_path(Path::new("$FORMLAYOUT_TEST_ROOT/forms")).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/forms"));

        unsafe {
            env::remove_var("FORMLAYOUT_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        assert_eq!(Config::expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut test_config = Config::new("/tmp/test-forms");
        test_config.strict_fields = true;
        test_config.fields = vec!["name".into()];

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
