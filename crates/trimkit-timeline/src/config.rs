//! Session configuration.

use serde::{Deserialize, Serialize};
use trimkit_core::{Result, TrimError, DEFAULT_TIMESCALE};

/// Tunables for a [`crate::PlayerSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ticks per second used to quantize seek targets and trim bounds.
    pub seek_timescale: i64,
    /// Ignore playback clock ticks while a seek is outstanding.
    pub drop_ticks_while_seeking: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seek_timescale: DEFAULT_TIMESCALE,
            drop_ticks_while_seeking: true,
        }
    }
}

impl SessionConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| TrimError::Serialization(format!("Invalid session config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> Result<()> {
        if self.seek_timescale <= 0 {
            return Err(TrimError::InvalidParameter(format!(
                "seek_timescale must be positive, got {}",
                self.seek_timescale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = SessionConfig::from_json(br#"{ "seek_timescale": 600 }"#).unwrap();
        assert_eq!(config.seek_timescale, 600);
        assert!(config.drop_ticks_while_seeking);
    }

    #[test]
    fn test_rejects_zero_timescale() {
        let result = SessionConfig::from_json(br#"{ "seek_timescale": 0 }"#);
        assert!(matches!(result, Err(TrimError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = SessionConfig::from_json(b"{ seek_timescale");
        assert!(matches!(result, Err(TrimError::Serialization(_))));
    }
}
