// クライアント全体の設定
// CLI引数・環境変数から組み立て、ポーリング設定とHTTPバックエンドへ変換する

use crate::backend::http::{HttpBackend, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::{ConvertError, ConvertResult};
use crate::polling::{DefaultPollConfig, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_POLL_INTERVAL};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://playlistor.io";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub max_attempts: Option<u32>,
    pub poll_timeout: Option<Duration>,
    pub max_consecutive_failures: u32,
    pub max_backoff: Duration,
    pub music_user_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            poll_timeout: None,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            max_backoff: DEFAULT_MAX_BACKOFF,
            music_user_token: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ConvertError::configuration(
                "request_timeout は0より大きい必要があります",
            ));
        }
        self.poll_config()?;
        Ok(())
    }

    /// 検証済みのポーリング設定
    pub fn poll_config(&self) -> ConvertResult<DefaultPollConfig> {
        let config = DefaultPollConfig::new()
            .with_poll_interval(self.poll_interval)
            .with_max_attempts(self.max_attempts)
            .with_timeout(self.poll_timeout)
            .with_max_consecutive_failures(self.max_consecutive_failures)
            .with_max_backoff(self.max_backoff.max(self.poll_interval));
        config.validate()?;
        Ok(config)
    }

    /// HTTPバックエンドを作成
    pub fn build_backend(&self) -> ConvertResult<HttpBackend> {
        let backend = HttpBackend::with_timeout(&self.base_url, self.request_timeout)?;
        Ok(match &self.music_user_token {
            Some(token) if !token.trim().is_empty() => backend.with_music_user_token(token.trim()),
            _ => backend,
        })
    }
}
