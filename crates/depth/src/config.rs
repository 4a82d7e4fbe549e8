use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the depth buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthConfig {
    /// Delay before the first snapshot fetch of each epoch, letting deltas
    /// accumulate so fewer fetch/replay cycles are wasted
    #[serde(default)]
    pub buffering_period_ms: u64,
    /// Force a resync when no update arrives within this window
    /// (0 disables the watchdog)
    #[serde(default)]
    pub update_timeout_ms: u64,
    /// Delay between failed snapshot fetch attempts
    #[serde(default = "default_fetch_retry_delay")]
    pub fetch_retry_delay_ms: u64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        DepthConfig {
            buffering_period_ms: 0,
            update_timeout_ms: 0,
            fetch_retry_delay_ms: default_fetch_retry_delay(),
        }
    }
}

impl DepthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffering_period(mut self, period: Duration) -> Self {
        self.buffering_period_ms = period.as_millis() as u64;
        self
    }

    pub fn with_update_timeout(mut self, timeout: Duration) -> Self {
        self.update_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_fetch_retry_delay(mut self, delay: Duration) -> Self {
        self.fetch_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn buffering_period(&self) -> Duration {
        Duration::from_millis(self.buffering_period_ms)
    }

    /// Watchdog window, `None` when disabled
    pub fn update_timeout(&self) -> Option<Duration> {
        (self.update_timeout_ms > 0).then(|| Duration::from_millis(self.update_timeout_ms))
    }

    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_delay_ms)
    }
}

// Default value functions for serde

fn default_fetch_retry_delay() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: DepthConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.buffering_period_ms, 0);
        assert_eq!(config.update_timeout_ms, 0);
        assert_eq!(config.fetch_retry_delay_ms, 1000);
        assert!(config.update_timeout().is_none());
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "buffering_period_ms": 500,
            "update_timeout_ms": 30000
        }"#;

        let config: DepthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.buffering_period(), Duration::from_millis(500));
        assert_eq!(config.update_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.fetch_retry_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_builders() {
        let config = DepthConfig::new()
            .with_buffering_period(Duration::from_millis(250))
            .with_update_timeout(Duration::from_secs(10))
            .with_fetch_retry_delay(Duration::from_millis(100));

        assert_eq!(config.buffering_period_ms, 250);
        assert_eq!(config.update_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.fetch_retry_delay_ms, 100);
    }
}
