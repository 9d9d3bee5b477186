use blockyard_kernel::WorldGenConfig;
use blockyard_motion::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a session configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("block_size must be finite and positive, got {0}")]
    InvalidBlockSize(f32),
}

/// Everything a [`Session`](crate::Session) is built from.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub world: WorldGenConfig,
    pub physics: PhysicsConfig,
    /// Maximum pick distance for break and place.
    pub reach: f32,
    /// Edge length of one block in world units.
    pub block_size: f32,
    /// Radians of view rotation per unit of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world: WorldGenConfig::default(),
            physics: PhysicsConfig::default(),
            reach: 8.0,
            block_size: 1.0,
            mouse_sensitivity: 0.002,
        }
    }
}

impl SessionConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: SessionConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        tracing::info!(path = %path.as_ref().display(), "session config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.block_size.is_finite() || self.block_size <= 0.0 {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{ "reach": 5.0, "world": {{ "seed": 7 }} }}"#).unwrap();

        let cfg = SessionConfig::load(&path).unwrap();
        assert_eq!(cfg.reach, 5.0);
        assert_eq!(cfg.world.seed, 7);
        assert_eq!(cfg.world.size, WorldGenConfig::default().size);
        assert_eq!(cfg.physics, PhysicsConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SessionConfig::load(tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_file_is_json_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ reach: ").unwrap();
        assert!(matches!(
            SessionConfig::load(&path).unwrap_err(),
            ConfigError::Json(_)
        ));
    }

    #[test]
    fn non_positive_block_size_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("zero.json");
        std::fs::write(&path, r#"{ "block_size": 0.0 }"#).unwrap();
        assert!(matches!(
            SessionConfig::load(&path).unwrap_err(),
            ConfigError::InvalidBlockSize(_)
        ));
    }

    #[test]
    fn infinite_block_size_rejected() {
        let cfg = SessionConfig {
            block_size: f32::INFINITY,
            ..SessionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidBlockSize(_))));
    }
}
