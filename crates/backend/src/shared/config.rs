use anyhow::Context;
use chrono::NaiveTime;
use contracts::dashboards::d401_station_view::ProductionWindow;
use contracts::domain::a003_line_assignment::DEFAULT_STATIONS;
use contracts::usecases::u501_upload_markup::IngestionMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub production: ProductionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/tracker.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_mb: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestionConfig {
    pub mode: IngestionMode,
    /// Archive every uploaded markup file in raw_file_storage
    pub keep_raw_files: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            mode: IngestionMode::Full,
            keep_raw_files: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProductionConfig {
    /// "HH:MM"
    pub shift_start: String,
    pub shift_end: String,
    pub daily_goal_feet: f64,
    pub stations: Vec<String>,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            shift_start: "06:00".to_string(),
            shift_end: "16:10".to_string(),
            daily_goal_feet: 3500.0,
            stations: DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ProductionConfig {
    pub fn window(&self) -> anyhow::Result<ProductionWindow> {
        let start = NaiveTime::parse_from_str(&self.shift_start, "%H:%M")
            .with_context(|| format!("invalid shift_start '{}'", self.shift_start))?;
        let end = NaiveTime::parse_from_str(&self.shift_end, "%H:%M")
            .with_context(|| format!("invalid shift_end '{}'", self.shift_end))?;
        ProductionWindow::new(start, end, self.daily_goal_feet).map_err(anyhow::Error::msg)
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.production.window()?;
        if self.production.stations.is_empty() {
            anyhow::bail!("production.stations must not be empty");
        }
        if self.server.max_upload_mb == 0 {
            anyhow::bail!("server.max_upload_mb must be positive");
        }
        Ok(())
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "data/tracker.db"

[server]
port = 3000
max_upload_mb = 20

[ingestion]
mode = "full"
keep_raw_files = true

[production]
shift_start = "06:00"
shift_end = "16:10"
daily_goal_feet = 3500.0
stations = ["99", "popup", "ventanas", "mesa"]
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. Next to the executable
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let config = load_config_from(&config_path)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Database file path; relative paths resolve against the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(db_path);
        }
    }

    PathBuf::from(&config.database.path)
}
