//! Room configuration.

use thiserror::Error;

/// Delivery buffer size used when none is configured.
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;

/// Room configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Messages each participant's delivery buffer holds before new ones are
    /// dropped for that participant
    pub buffer_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self { buffer_capacity: DEFAULT_BUFFER_CAPACITY }
    }
}

impl RoomConfig {
    /// Check the configuration before a room is started with it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroBufferCapacity);
        }
        Ok(())
    }
}

/// Invalid room configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Delivery buffers must hold at least one message
    #[error("delivery buffer capacity must be at least 1")]
    ZeroBufferCapacity,
}
