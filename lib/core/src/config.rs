use crate::vector::FEATURE_DIM;
use crate::{Error, Result};
use std::time::Duration;

/// Runtime configuration shared by the extraction and search pipeline
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Feature vector length
    pub dimension: usize,
    /// Upper bound on a single image fetch
    pub fetch_timeout: Duration,
    /// Candidates resolved concurrently during one search
    pub max_concurrency: usize,
    /// Items per backfill batch
    pub batch_size: usize,
    /// Pause between backfill batches
    pub batch_pause: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimension: FEATURE_DIM,
            fetch_timeout: Duration::from_secs(15),
            max_concurrency: 5,
            batch_size: 5,
            batch_pause: Duration::from_millis(100),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidConfig("dimension must be positive".into()));
        }
        if self.max_concurrency == 0 {
            return Err(Error::InvalidConfig("max_concurrency must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.dimension, 64);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.batch_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = EngineConfig {
            max_concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
