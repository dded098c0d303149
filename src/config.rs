//! Configuration loaded from `predsql.toml`.
//!
//! ```toml
//! [compiler]
//! literals = "bound"
//! convert = "reject"
//! parameter_prefix = "p"
//!
//! [query]
//! recompile_hint = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PredsqlError, PredsqlResult};
use crate::query::QueryOptions;
use crate::transpiler::{CompileOptions, PredicateCompiler};

pub const CONFIG_FILE: &str = "predsql.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub compiler: CompileOptions,
    pub query: QueryOptions,
}

impl Config {
    pub fn from_toml(text: &str) -> PredsqlResult<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> PredsqlResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `./predsql.toml`, then the user config file, then defaults.
    pub fn discover() -> PredsqlResult<Self> {
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::load_from(local);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/predsql/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("predsql").join("config.toml"))
    }

    pub fn to_toml(&self) -> PredsqlResult<String> {
        toml::to_string_pretty(self).map_err(|e| PredsqlError::Config(e.to_string()))
    }

    pub fn compiler(&self) -> PredicateCompiler {
        PredicateCompiler::new(self.compiler.clone())
    }

    fn validate(&self) -> PredsqlResult<()> {
        let prefix = &self.compiler.parameter_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(PredsqlError::Config(format!(
                "parameter_prefix must be a non-empty word, got '{}'",
                prefix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::{ConvertPolicy, LiteralMode};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.query.recompile_hint);
        assert_eq!(config.compiler.literals, LiteralMode::Inline);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml("[compiler]\nliterals = \"bound\"\nconvert = \"drop\"\n").unwrap();
        assert_eq!(config.compiler.literals, LiteralMode::Bound);
        assert_eq!(config.compiler.convert, ConvertPolicy::Drop);
        assert_eq!(config.compiler.parameter_prefix, "p");
        assert!(config.query.recompile_hint);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\nrecompile_hint = false").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert!(!config.query.recompile_hint);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, PredsqlError::Io(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml("[compiler]\nliterals = \"sometimes\"\n"),
            Err(PredsqlError::Toml(_))
        ));
        assert!(matches!(
            Config::from_toml("[compiler]\nparameter_prefix = \"a b\"\n"),
            Err(PredsqlError::Config(_))
        ));
        assert!(Config::from_toml("[server]\nport = 1\n").is_err());
    }

    #[test]
    fn test_round_trip_text() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("literals = \"inline\""));
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }
}
