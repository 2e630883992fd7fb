//! Configuration loading from disk and environment.

use std::path::{Path, PathBuf};
use std::fs;
use crate::config::schema::WalletConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `rpc.url`.
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";

/// Environment variable overriding `keystore.path`.
pub const KEYSTORE_ENV_VAR: &str = "WALLET_KEYSTORE";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<WalletConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WalletConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from a variable lookup (normally `std::env::var`).
pub fn apply_overrides<F>(config: &mut WalletConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(RPC_URL_ENV_VAR).filter(|v| !v.is_empty()) {
        config.rpc.url = url;
    }
    if let Some(path) = lookup(KEYSTORE_ENV_VAR).filter(|v| !v.is_empty()) {
        config.keystore.path = PathBuf::from(path);
    }
}

/// Values given on the command line; they win over the file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub keystore: Option<PathBuf>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut WalletConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(path) = &self.keystore {
            config.keystore.path = path.clone();
        }
    }
}

/// Resolve the effective configuration: file (or defaults), then environment,
/// then `overrides`. Validation runs once, on the final result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<WalletConfig, ConfigError> {
    resolve_with(path, |key| std::env::var(key).ok(), overrides)
}

fn resolve_with<F>(
    path: Option<&Path>,
    lookup: F,
    overrides: &ConfigOverrides,
) -> Result<WalletConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => WalletConfig::default(),
    };
    apply_overrides(&mut config, lookup);
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rpc]\nurl = \"http://127.0.0.1:8899\"\ntimeout_secs = 5").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8899");
        assert_eq!(config.rpc.timeout_secs, 5);
    }

    #[test]
    fn test_load_config_reports_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rpc]\ntimeout_secs = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("rpc.timeout_secs"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rpc\nurl = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = WalletConfig::default();
        apply_overrides(&mut config, |key| match key {
            RPC_URL_ENV_VAR => Some("http://localhost:8899".to_string()),
            KEYSTORE_ENV_VAR => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.rpc.url, "http://localhost:8899");
        assert_eq!(config.keystore.path, PathBuf::from("wallets.json"));
    }

    #[test]
    fn test_flag_url_replaces_invalid_env_url() {
        let overrides = ConfigOverrides {
            rpc_url: Some("http://127.0.0.1:8899".to_string()),
            keystore: None,
        };
        let config = resolve_with(
            None,
            |key| (key == RPC_URL_ENV_VAR).then(|| "not a url".to_string()),
            &overrides,
        )
        .unwrap();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8899");
    }

    #[test]
    fn test_flag_url_replaces_invalid_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rpc]\nurl = \"not a url\"").unwrap();
        let overrides = ConfigOverrides {
            rpc_url: Some("http://127.0.0.1:8899".to_string()),
            keystore: Some(PathBuf::from("other.json")),
        };

        let config = resolve_with(Some(file.path()), |_| None, &overrides).unwrap();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8899");
        assert_eq!(config.keystore.path, PathBuf::from("other.json"));
    }

    #[test]
    fn test_invalid_env_url_without_flag_fails() {
        let err = resolve_with(
            None,
            |key| (key == RPC_URL_ENV_VAR).then(|| "not a url".to_string()),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
