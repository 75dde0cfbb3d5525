// ポーリングの基本具象実装

use super::{PollConfig, PollEvent, PollObserver};
use crate::domain::{ConvertError, ConvertResult, ProgressSnapshot, TaskResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// デフォルト設定実装
///
/// 回数・時間の上限は既定で無制限。完了するかキャンセルされるまでポーリングを続ける。
#[derive(Debug, Clone)]
pub struct DefaultPollConfig {
    interval: Duration,
    max_attempts: Option<u32>,
    timeout: Option<Duration>,
    max_failures: u32,
    max_backoff: Duration,
}

impl DefaultPollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// ゼロを指定した場合はデフォルト間隔を使う
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_consecutive_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// 設定値の整合性チェック
    pub fn validate(&self) -> ConvertResult<()> {
        if self.max_attempts == Some(0) {
            return Err(ConvertError::configuration(
                "max_attempts は1以上である必要があります",
            ));
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConvertError::configuration(
                "timeout は0より大きい必要があります",
            ));
        }
        if self.max_backoff < self.interval {
            return Err(ConvertError::configuration(format!(
                "max_backoff ({:?}) はポーリング間隔 ({:?}) 以上である必要があります",
                self.max_backoff, self.interval
            )));
        }
        Ok(())
    }
}

impl Default for DefaultPollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
            max_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl PollConfig for DefaultPollConfig {
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

/// コンソール出力による進捗表示
#[derive(Debug, Default, Clone)]
pub struct ConsolePollObserver {
    quiet: bool,
}

impl ConsolePollObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl PollObserver for ConsolePollObserver {
    async fn on_progress(&self, progress: &ProgressSnapshot) {
        debug!(current = progress.current, total = progress.total, "progress update");
        if !self.quiet {
            println!(
                "📊 {} of {} songs processed. ({:.1}%)",
                progress.current, progress.total, progress.percent
            );
        }
    }

    async fn on_success(&self, result: &TaskResult) {
        info!("conversion completed");
        if !self.quiet {
            match result.result_url() {
                Some(url) => println!("✅ Done! {url}"),
                None => println!("✅ Done!"),
            }
        }
    }

    async fn on_error(&self, error: &ConvertError) {
        warn!(%error, severity = error.severity().as_str(), "conversion failed");
        if !self.quiet {
            eprintln!("❌ {}", error.user_message());
        }
    }

    async fn on_retry(&self, message: &str, retry_at: DateTime<Utc>) {
        warn!(%message, %retry_at, "retry scheduled");
        if !self.quiet {
            println!("🔁 Retrying at {}: {message}", retry_at.format("%H:%M:%S"));
        }
    }

    async fn on_task_error(&self, message: &str) {
        warn!(%message, "task reported an error");
    }
}

/// 何もしない通知実装（テスト・バックグラウンド用）
#[derive(Debug, Default, Clone)]
pub struct NoOpPollObserver;

impl NoOpPollObserver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PollObserver for NoOpPollObserver {
    async fn on_progress(&self, _progress: &ProgressSnapshot) {
        // 何もしない
    }

    async fn on_success(&self, _result: &TaskResult) {
        // 何もしない
    }

    async fn on_error(&self, _error: &ConvertError) {
        // 何もしない
    }

    async fn on_retry(&self, _message: &str, _retry_at: DateTime<Utc>) {
        // 何もしない
    }

    async fn on_task_error(&self, _message: &str) {
        // 何もしない
    }
}

/// 通知をチャンネルへ流すストリーム実装
#[derive(Debug, Clone)]
pub struct ChannelPollObserver {
    sender: mpsc::UnboundedSender<PollEvent>,
}

impl ChannelPollObserver {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: PollEvent) {
        // 受信側が閉じていてもポーリングは続ける
        if self.sender.send(event).is_err() {
            debug!("poll event receiver dropped");
        }
    }
}

#[async_trait]
impl PollObserver for ChannelPollObserver {
    async fn on_progress(&self, progress: &ProgressSnapshot) {
        self.send(PollEvent::Progress(progress.clone()));
    }

    async fn on_success(&self, result: &TaskResult) {
        self.send(PollEvent::Success(result.clone()));
    }

    async fn on_error(&self, error: &ConvertError) {
        self.send(PollEvent::from_error(error));
    }

    async fn on_retry(&self, message: &str, retry_at: DateTime<Utc>) {
        self.send(PollEvent::Retry {
            message: message.to_string(),
            retry_at,
        });
    }

    async fn on_task_error(&self, message: &str) {
        self.send(PollEvent::TaskError(message.to_string()));
    }
}
