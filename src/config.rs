//! TOML configuration for a queue monitoring run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracker::{TrackerConfig, Zone};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Mask image per zone. A zone without a path is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub waiting: Option<PathBuf>,
    pub serving: Option<PathBuf>,
    pub staff: Option<PathBuf>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            waiting: Some(PathBuf::from("pic/waiting.jpg")),
            serving: Some(PathBuf::from("pic/service.jpg")),
            staff: Some(PathBuf::from("pic/staf.jpg")),
        }
    }
}

impl ZoneConfig {
    pub fn path(&self, zone: Zone) -> Option<&Path> {
        match zone {
            Zone::Waiting => self.waiting.as_deref(),
            Zone::Serving => self.serving.as_deref(),
            Zone::Staff => self.staff.as_deref(),
        }
    }
}

/// Top-level configuration.
///
/// ```toml
/// frame_width = 1280
/// frame_height = 720
/// database = "queue.db"
///
/// [tracker]
/// service_confirm_secs = 5.0
/// exclude_ids = [3]
///
/// [zones]
/// waiting = "pic/waiting.jpg"
/// serving = "pic/service.jpg"
/// staff = "pic/staf.jpg"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Width masks are resized to
    pub frame_width: u32,
    /// Height masks are resized to
    pub frame_height: u32,
    /// SQLite database file, used with the `sqlite` feature
    pub database: Option<PathBuf>,
    pub tracker: TrackerConfig,
    pub zones: ZoneConfig,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            frame_width: 1280,
            frame_height: 720,
            database: None,
            tracker: TrackerConfig::default(),
            zones: ZoneConfig::default(),
        }
    }
}

impl QueueConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: QueueConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame size must be positive, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        let secs = self.tracker.service_confirm_secs;
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "service_confirm_secs must be a non-negative number, got {secs}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::from_toml_str("").unwrap();
        assert_eq!(config, QueueConfig::default());
        assert_eq!(config.tracker.service_confirm_secs, 5.0);
        assert_eq!(
            config.zones.path(Zone::Staff),
            Some(Path::new("pic/staf.jpg"))
        );
    }

    #[test]
    fn test_partial_override() {
        let config = QueueConfig::from_toml_str(
            r#"
            frame_width = 640
            frame_height = 480

            [tracker]
            exclude_ids = [1, 2]

            [zones]
            waiting = "masks/queue.png"
            "#,
        )
        .unwrap();

        assert_eq!((config.frame_width, config.frame_height), (640, 480));
        assert_eq!(config.tracker.exclude_ids, vec![1, 2]);
        assert_eq!(config.tracker.service_confirm_secs, 5.0);
        assert_eq!(
            config.zones.path(Zone::Waiting),
            Some(Path::new("masks/queue.png"))
        );
        // table given, missing keys fall back to the table's defaults
        assert_eq!(
            config.zones.path(Zone::Serving),
            Some(Path::new("pic/service.jpg"))
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = QueueConfig::from_toml_str("frame_width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            QueueConfig::from_toml_str("[tracker]\nservice_confirm_secs = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = QueueConfig::from_toml_str("frame_width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database = \"queue.db\"").unwrap();

        let config = QueueConfig::load(file.path()).unwrap();
        assert_eq!(config.database, Some(PathBuf::from("queue.db")));

        let err = QueueConfig::load("/nonexistent/queue.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
