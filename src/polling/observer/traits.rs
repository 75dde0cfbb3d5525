// ポーリング通知のトレイト定義

use crate::domain::{ConvertError, ProgressSnapshot, TaskResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use std::sync::Arc;

/// ポーリング中の状態変化を受け取るトレイト
#[automock]
#[async_trait]
pub trait PollObserver: Send + Sync {
    /// 進捗を含むレスポンスを受け取るたびに呼ばれる
    async fn on_progress(&self, progress: &ProgressSnapshot);

    /// タスクが成功で完了した時に一度だけ呼ばれる
    async fn on_success(&self, result: &TaskResult);

    /// 終端の失敗で一度だけ呼ばれる
    async fn on_error(&self, error: &ConvertError);

    /// 再試行が予定された時に呼ばれる
    async fn on_retry(&self, message: &str, retry_at: DateTime<Utc>);

    /// サーバーがタスクの失敗メッセージを返した時に呼ばれる
    async fn on_task_error(&self, message: &str);
}

#[async_trait]
impl<O: PollObserver + ?Sized> PollObserver for Arc<O> {
    async fn on_progress(&self, progress: &ProgressSnapshot) {
        self.as_ref().on_progress(progress).await
    }

    async fn on_success(&self, result: &TaskResult) {
        self.as_ref().on_success(result).await
    }

    async fn on_error(&self, error: &ConvertError) {
        self.as_ref().on_error(error).await
    }

    async fn on_retry(&self, message: &str, retry_at: DateTime<Utc>) {
        self.as_ref().on_retry(message, retry_at).await
    }

    async fn on_task_error(&self, message: &str) {
        self.as_ref().on_task_error(message).await
    }
}

/// 通知をデータとして扱うためのイベント
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Progress(ProgressSnapshot),
    Success(TaskResult),
    Error {
        message: String,
        status: Option<u16>,
    },
    Retry {
        message: String,
        retry_at: DateTime<Utc>,
    },
    TaskError(String),
}

impl PollEvent {
    pub fn from_error(error: &ConvertError) -> Self {
        Self::Error {
            message: error.to_string(),
            status: error.status(),
        }
    }

    /// 終端イベントかどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error { .. })
    }
}
