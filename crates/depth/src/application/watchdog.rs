use tokio::task::JoinHandle;

use super::buffer::DepthBuffer;

impl DepthBuffer {
    /// Start the silence watchdog
    ///
    /// Probes once per configured `update_timeout` window and forces a
    /// [`reset`] when no update arrived within it, so a stalled feed
    /// resynchronizes as soon as deltas start flowing again. Returns `None`
    /// when no timeout is configured. Abort the handle to stop the watchdog.
    ///
    /// [`reset`]: DepthBuffer::reset
    pub fn spawn_watchdog(&self) -> Option<JoinHandle<()>> {
        let timeout = self.config().update_timeout()?;
        let buffer = self.clone();
        Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(timeout).await;
                let idle = buffer.last_update_elapsed();
                if idle >= timeout {
                    tracing::warn!("no depth update for {:?}, forcing resync", idle);
                    buffer.reset();
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DepthConfig;
    use crate::testing::ScriptedFetcher;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_watchdog_disabled_without_timeout() {
        let (fetcher, _script) = ScriptedFetcher::pair();
        let buffer = DepthBuffer::new(fetcher, DepthConfig::new());
        assert!(buffer.spawn_watchdog().is_none());
    }
}
