// タスク進捗のポーリングエンジン
//
// Polling → (進捗更新, Polling のまま) → Complete(Success | Failure)
// キャンセル・回数上限・タイムアウトでも終了する。

use super::{ChannelPollObserver, PollConfig, PollEvent, PollObserver};
use crate::backend::ConversionBackend;
use crate::domain::{ConvertError, ConvertResult, TaskHandle, TaskResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// `delay` 後の時刻
fn retry_timestamp(delay: Duration) -> DateTime<Utc> {
    let delay = chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    Utc::now() + delay
}

/// 期限まで待つ（期限なしなら完了しない）
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// 依存性注入によるポーリングエンジン
pub struct ProgressPoller<B, C> {
    backend: Arc<B>,
    config: Arc<C>,
}

impl<B, C> Clone for ProgressPoller<B, C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B, C> ProgressPoller<B, C>
where
    B: ConversionBackend + 'static,
    C: PollConfig + 'static,
{
    /// コンストラクタインジェクション
    pub fn new(backend: B, config: C) -> Self {
        Self {
            backend: Arc::new(backend),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// タスクが終端状態になるまでポーリングする
    ///
    /// 成功なら `Ok(TaskResult)`、失敗・上限到達なら `Err` を返す。
    /// `on_error` は終端の失敗ごとに一度だけ呼ばれる。キャンセル時は呼ばれない。
    pub async fn poll<O>(
        &self,
        handle: &TaskHandle,
        observer: &O,
        cancel: &CancellationToken,
    ) -> ConvertResult<TaskResult>
    where
        O: PollObserver + ?Sized,
    {
        let started = Instant::now();
        let deadline = self.config.timeout().map(|timeout| started + timeout);
        let interval = self.config.poll_interval();
        let mut attempts: u32 = 0;
        let mut consecutive_failures: u32 = 0;

        info!(task = %handle, interval_ms = interval.as_millis() as u64, "polling task progress");

        loop {
            if let Some(max_attempts) = self.config.max_attempts() {
                if attempts >= max_attempts {
                    return Self::fail(observer, ConvertError::PollAttemptsExhausted { attempts })
                        .await;
                }
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Self::timed_out(observer, started).await;
            }

            // タイムアウトは応答待ち・待機中も含めた期限として扱う
            attempts += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Self::cancelled(handle),
                _ = deadline_reached(deadline) => return Self::timed_out(observer, started).await,
                fetched = self.backend.fetch_task_status(handle) => fetched,
            };

            let delay = match fetched {
                Ok(status) => {
                    consecutive_failures = 0;

                    if let Some(progress) = &status.progress {
                        observer.on_progress(progress).await;
                    }
                    if status.complete {
                        return Self::finish(handle, status, observer).await;
                    }
                    if let Some(retry) = status.retry_info() {
                        let retry_at = retry.next_retry.unwrap_or_else(|| retry_timestamp(interval));
                        observer.on_retry(&retry.message, retry_at).await;
                    }
                    interval
                }
                Err(error)
                    if error.is_recoverable()
                        && consecutive_failures < self.config.max_consecutive_failures() =>
                {
                    consecutive_failures += 1;
                    let delay = self.config.backoff_delay(consecutive_failures);
                    warn!(
                        task = %handle,
                        %error,
                        consecutive_failures,
                        delay_ms = delay.as_millis() as u64,
                        "status request failed, backing off"
                    );
                    observer.on_retry(&error.to_string(), retry_timestamp(delay)).await;
                    delay
                }
                Err(error) => return Self::fail(observer, error).await,
            };

            debug!(task = %handle, attempts, "task still running");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Self::cancelled(handle),
                _ = deadline_reached(deadline) => return Self::timed_out(observer, started).await,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// バックグラウンドでポーリングを開始し、キャンセル可能なハンドルを返す
    ///
    /// 返したハンドルを破棄するとポーリングも停止する。
    pub fn spawn<O>(&self, handle: TaskHandle, observer: O) -> PollTask
    where
        O: PollObserver + 'static,
    {
        let cancel = CancellationToken::new();
        let poller = self.clone();
        let token = cancel.clone();

        let join = tokio::spawn(async move { poller.poll(&handle, &observer, &token).await });

        PollTask {
            cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            join,
        }
    }

    /// 通知をイベントストリームとして受け取る形で開始する
    pub fn watch(&self, handle: TaskHandle) -> (PollTask, mpsc::UnboundedReceiver<PollEvent>) {
        let (observer, events) = ChannelPollObserver::channel();
        (self.spawn(handle, observer), events)
    }

    async fn finish<O>(handle: &TaskHandle, status: TaskResult, observer: &O) -> ConvertResult<TaskResult>
    where
        O: PollObserver + ?Sized,
    {
        if status.is_success() {
            info!(task = %handle, "task succeeded");
            observer.on_success(&status).await;
            return Ok(status);
        }

        let failure = status.failure();
        if let Some(message) = &failure.message {
            observer.on_task_error(message).await;
        }
        Self::fail(observer, ConvertError::task_failed(failure)).await
    }

    async fn fail<O>(observer: &O, error: ConvertError) -> ConvertResult<TaskResult>
    where
        O: PollObserver + ?Sized,
    {
        warn!(%error, "polling finished with an error");
        observer.on_error(&error).await;
        Err(error)
    }

    async fn timed_out<O>(observer: &O, started: Instant) -> ConvertResult<TaskResult>
    where
        O: PollObserver + ?Sized,
    {
        let elapsed = started.elapsed();
        Self::fail(observer, ConvertError::PollTimeout { elapsed }).await
    }

    fn cancelled(handle: &TaskHandle) -> ConvertResult<TaskResult> {
        info!(task = %handle, "polling cancelled");
        Err(ConvertError::Cancelled)
    }
}

/// バックグラウンドで実行中のポーリング
///
/// 破棄時にポーリングをキャンセルする。
pub struct PollTask {
    cancel: CancellationToken,
    cancel_on_drop: DropGuard,
    join: JoinHandle<ConvertResult<TaskResult>>,
}

impl PollTask {
    /// ポーリングを停止する（次の待機点で終了）
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// 終了を待って結果を受け取る
    pub async fn join(self) -> ConvertResult<TaskResult> {
        let PollTask {
            cancel_on_drop,
            join,
            ..
        } = self;
        let result = join.await;
        drop(cancel_on_drop);
        result?
    }
}
