//! Engine configuration

use crate::replay::{DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
use crate::{Error, Result};

/// Configuration for an [`crate::EspEngine`]
///
/// ```
/// use esp_core::EngineConfig;
///
/// let config = EngineConfig::new().with_replay_window_size(32);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Anti-replay window width applied to newly provisioned SAs
    pub replay_window_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            replay_window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the anti-replay window width
    pub fn with_replay_window_size(mut self, size: u32) -> Self {
        self.replay_window_size = size;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the window width is outside the supported
    ///   range
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&self.replay_window_size) {
            return Err(Error::InvalidParameter(format!(
                "replay window size {} not in {}..={}",
                self.replay_window_size, MIN_WINDOW_SIZE, MAX_WINDOW_SIZE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.replay_window_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_size_bounds() {
        assert!(EngineConfig::new()
            .with_replay_window_size(32)
            .validate()
            .is_ok());
        assert!(EngineConfig::new()
            .with_replay_window_size(64)
            .validate()
            .is_ok());

        assert!(matches!(
            EngineConfig::new().with_replay_window_size(31).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            EngineConfig::new().with_replay_window_size(65).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            EngineConfig::new().with_replay_window_size(0).validate(),
            Err(Error::InvalidParameter(_))
        ));
    }
}
