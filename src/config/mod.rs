//! Configuration module for imu-blocks
//!
//! Settings are stored as TOML. Every section has defaults, so a partial or
//! missing file is valid.
//!
//! # App Data Location
//!
//! The default config file lives in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.hxyulin.imu-blocks/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.imu-blocks/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.imu-blocks\`
//!
//! # Example
//!
//! ```toml
//! [graph]
//! sensors = ["accelerometer", "gyrometer"]
//! norm = true
//! moving_average_window = 5
//!
//! [collection]
//! sample_rate_hz = 100
//!
//! [logging]
//! filter = "imu_blocks=debug"
//! ```

use crate::error::{ImuError, Result};
use crate::types::{ImuChannel, ImuDevice, ImuPosition, SensorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hxyulin.imu-blocks";

/// Config filename inside the app data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Default device sample rate in Hz
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 50;

/// Default capacity of the sink message channel
pub const DEFAULT_CHANNEL_BUFFER_SIZE: usize = 1024;

/// Upper bound on the sample rate accepted by `validate`
pub const MAX_SAMPLE_RATE_HZ: u32 = 10_000;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir()
        .ok_or_else(|| ImuError::Config("Could not determine app data directory".to_string()))?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            ImuError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== App Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    #[serde(default)]
    pub recorder: RecorderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImuError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ImuError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A missing file gives defaults silently; an
    /// unreadable or invalid one gives defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ImuError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ImuError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ImuError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Reject values the graph or worker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.graph.sensors.is_empty() {
            return Err(ImuError::Config("at least one sensor must be enabled".to_string()));
        }
        let rate = self.collection.sample_rate_hz;
        if rate == 0 || rate > MAX_SAMPLE_RATE_HZ {
            return Err(ImuError::Config(format!(
                "sample_rate_hz must be between 1 and {}, got {}",
                MAX_SAMPLE_RATE_HZ, rate
            )));
        }
        if self.collection.channel_buffer_size == 0 {
            return Err(ImuError::Config(
                "channel_buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ImuError::Config("logging filter must not be empty".to_string()));
        }
        Ok(())
    }

    /// Input channels for the enabled sensors, in catalogue order
    pub fn enabled_channels(&self) -> Vec<ImuChannel> {
        SensorKind::ALL
            .iter()
            .filter(|s| self.graph.sensors.contains(*s))
            .flat_map(|s| s.channels())
            .collect()
    }

    /// Time between two device samples
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.collection.sample_rate_hz.max(1) as f64)
    }
}

// ==================== Graph Config ====================

/// Which nodes and processing blocks the IMU graph contains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Sensors whose channels become input nodes
    pub sensors: Vec<SensorKind>,

    /// Add a `<sensor>_norm` derived node per tri-axial sensor
    pub norm: bool,

    /// Window of the moving average applied to each norm (0 = disabled)
    pub moving_average_window: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            sensors: vec![
                SensorKind::Accelerometer,
                SensorKind::Gyrometer,
                SensorKind::Magnetometer,
            ],
            norm: true,
            moving_average_window: 0,
        }
    }
}

// ==================== Collection Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Device sample rate in Hz
    pub sample_rate_hz: u32,

    /// Buffer size for sink channel communication
    pub channel_buffer_size: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            channel_buffer_size: DEFAULT_CHANNEL_BUFFER_SIZE,
        }
    }
}

// ==================== Recorder Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RecorderConfig {
    /// Minimum spacing between two recorded values of one channel (0 = keep all)
    pub sample_interval_ms: u64,

    /// Maximum number of frames to record (0 = unlimited)
    pub max_frames: usize,

    /// Device recorded in session metadata
    pub device: ImuDevice,

    /// Body position recorded in session metadata
    pub position: ImuPosition,
}

impl RecorderConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

// ==================== Logging Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,

    /// Directory for daily log files. Console only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "imu_blocks=info".to_string(),
            log_dir: None,
        }
    }
}

// ==================== Tests ====================
