use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spinlog::batch::{run_activity_batch, run_catalog_batch};
use spinlog::config::{self, AppConfig};
use spinlog::store::SqliteAnalyticsStore;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path of the SQLite analytics database. Created on first run.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Root directory of the song catalog tree.
    #[clap(long, default_value = "data/song_data", value_parser = parse_path)]
    pub song_data: PathBuf,

    /// Root directory of the activity log tree.
    #[clap(long, default_value = "data/log_data", value_parser = parse_path)]
    pub log_data: PathBuf,

    /// Filename pattern of the source files within both trees.
    #[clap(long, default_value = "*.json")]
    pub pattern: String,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            song_data: args.song_data.clone(),
            log_data: args.log_data.clone(),
            pattern: args.pattern.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_path: {:?}", app_config.db_path);
    info!("  song_data: {:?}", app_config.song_data);
    info!("  log_data: {:?}", app_config.log_data);

    if !app_config.db_path.exists() {
        info!(
            "Creating new analytics database at {:?}",
            app_config.db_path
        );
    }
    let store = SqliteAnalyticsStore::new(&app_config.db_path)?;

    // Catalog first: songplay rows resolve against the songs and artists
    // loaded here.
    let catalog = run_catalog_batch(&store, &app_config.song_data, &app_config.pattern)?;
    info!(
        "Catalog batch done: {} files, {} songs, {} artists",
        catalog.files, catalog.songs, catalog.artists
    );

    let activity = run_activity_batch(&store, &app_config.log_data, &app_config.pattern)?;
    info!(
        "Activity batch done: {} files, {} time rows, {} user rows, {} songplays ({} matched, {} row failures)",
        activity.files,
        activity.time_rows,
        activity.user_rows,
        activity.songplays,
        activity.songplays_matched,
        activity.row_failures
    );

    Ok(())
}
