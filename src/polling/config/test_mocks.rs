// テスト用の設定モック実装

use super::traits::PollConfig;
use std::time::Duration;

pub struct MockPollConfig {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
    pub max_failures: u32,
    pub max_backoff: Duration,
}

impl MockPollConfig {
    /// 指定間隔・無制限のポーリング設定
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
            max_failures: 0,
            max_backoff: interval,
        }
    }
}

impl PollConfig for MockPollConfig {
    fn poll_interval(&self) -> Duration {
        self.interval
    }

    fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn max_consecutive_failures(&self) -> u32 {
        self.max_failures
    }

    fn max_backoff(&self) -> Duration {
        self.max_backoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_config_trait() {
        let config = MockPollConfig {
            interval: Duration::from_millis(200),
            max_attempts: Some(5),
            timeout: Some(Duration::from_secs(30)),
            max_failures: 3,
            max_backoff: Duration::from_secs(1),
        };

        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.max_attempts(), Some(5));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.max_consecutive_failures(), 3);
    }

    #[test]
    fn test_backoff_delay_doubles_until_cap() {
        let config = MockPollConfig {
            interval: Duration::from_millis(200),
            max_attempts: None,
            timeout: None,
            max_failures: 3,
            max_backoff: Duration::from_secs(1),
        };

        assert_eq!(config.backoff_delay(1), Duration::from_millis(400));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(800));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(40), Duration::from_secs(1));
    }

    #[test]
    fn test_poll_config_as_trait_object() {
        let config = MockPollConfig::with_interval(Duration::from_millis(50));

        let config_ref: &dyn PollConfig = &config;
        assert_eq!(config_ref.poll_interval(), Duration::from_millis(50));
        assert_eq!(config_ref.max_attempts(), None);
        assert_eq!(config_ref.timeout(), None);
    }
}
