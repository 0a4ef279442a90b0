mod file_config;

pub use file_config::FileConfig;

use anyhow::Result;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution. This struct
/// mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub pattern: String,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub pattern: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;

        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());
        let pattern = file.pattern.unwrap_or_else(|| cli.pattern.clone());

        Ok(Self {
            db_path,
            song_data,
            log_data,
            pattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliConfig {
        CliConfig {
            db_path: Some(PathBuf::from("/cli/analytics.db")),
            song_data: PathBuf::from("data/song_data"),
            log_data: PathBuf::from("data/log_data"),
            pattern: "*.json".to_string(),
        }
    }

    #[test]
    fn test_resolve_cli_only() {
        let config = AppConfig::resolve(&cli(), None).unwrap();

        assert_eq!(config.db_path, PathBuf::from("/cli/analytics.db"));
        assert_eq!(config.song_data, PathBuf::from("data/song_data"));
        assert_eq!(config.log_data, PathBuf::from("data/log_data"));
        assert_eq!(config.pattern, "*.json");
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let file_config = FileConfig {
            db_path: Some("/toml/analytics.db".to_string()),
            song_data: Some("/toml/songs".to_string()),
            log_data: None,
            pattern: None,
        };

        let config = AppConfig::resolve(&cli(), Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_path, PathBuf::from("/toml/analytics.db"));
        assert_eq!(config.song_data, PathBuf::from("/toml/songs"));
        // CLI value used when TOML doesn't specify
        assert_eq!(config.log_data, PathBuf::from("data/log_data"));
        assert_eq!(config.pattern, "*.json");
    }

    #[test]
    fn test_resolve_missing_db_path_error() {
        let cli = CliConfig {
            db_path: None,
            ..cli()
        };

        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_path must be specified"));
    }
}
