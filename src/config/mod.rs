use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::workflows::pipeline::PipelineSettings;
use crate::workflows::screening::Strictness;

/// Distinguishes runtime behavior for different stages of the scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Top-level configuration for a scouting run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let strict = read_bool("SCOUT_STRICT", true)?;
        let force_refresh = read_bool("SCOUT_FORCE_REFRESH", false)?;
        let progress_interval = read_count("SCOUT_PROGRESS_INTERVAL", 20)?;
        let cursor_depth = read_count("SCOUT_CURSOR_DEPTH", 5)?;

        let data_dir = env::var("SCOUT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let resume_path = env::var("SCOUT_RESUME_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            pipeline: PipelineConfig {
                strict,
                force_refresh,
                progress_interval,
                cursor_depth,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(data_dir),
                resume_path,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Knobs for the classification pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub strict: bool,
    pub force_refresh: bool,
    pub progress_interval: usize,
    pub cursor_depth: usize,
}

impl PipelineConfig {
    pub fn strictness(&self) -> Strictness {
        if self.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            strictness: self.strictness(),
            force_refresh: self.force_refresh,
            progress_interval: self.progress_interval,
            cursor_depth: self.cursor_depth,
        }
    }
}

/// Where the local record store, cursors and reports live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub resume_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn jobs_file(&self) -> PathBuf {
        self.data_dir.join("jobs.json")
    }

    pub fn cursor_dir(&self) -> PathBuf {
        self.data_dir.join("cursors")
    }

    pub fn report_file(&self, company: &str, date: chrono::NaiveDate) -> PathBuf {
        self.data_dir
            .join("reports")
            .join(format!("{company}-entry-level-{}.csv", date.format("%Y-%m-%d")))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFlag { key: &'static str, value: String },
    InvalidCount { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true/false, found '{value}'")
            }
            ConfigError::InvalidCount { key, value } => {
                write!(f, "{key} must be a positive integer, found '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn read_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}

fn read_count(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    if raw.trim().is_empty() {
        return Ok(default);
    }

    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidCount { key, value: raw }),
    }
}
