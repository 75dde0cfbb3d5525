pub mod backend;
pub mod cli;
pub mod config;
pub mod domain;
pub mod link;
pub mod polling;

use backend::ConversionBackend;
use crate::domain::{ConversionRequest, ConvertError, ConvertResult, Platform, TaskHandle, TaskResult};
use polling::{PollConfig, PollObserver, ProgressPoller};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 変換前に検証・展開済みのプレイリスト
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPlaylist {
    pub url: String,
    /// 変換元のサービス
    pub source: Platform,
}

impl PreparedPlaylist {
    /// 変換先のサービス
    pub fn target(&self) -> Platform {
        self.source.target()
    }
}

/// 変換リクエストのオプション
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub playlist: String,
    pub invert_order: bool,
}

impl ConvertOptions {
    pub fn new(playlist: impl Into<String>) -> Self {
        Self {
            playlist: playlist.into(),
            invert_order: false,
        }
    }

    pub fn with_invert_order(mut self, invert_order: bool) -> Self {
        self.invert_order = invert_order;
        self
    }
}

// DIコンテナの役割を果たすジェネリックなApp構造体
// バックエンドとポーリング設定を明示的に受け取る（グローバル状態は持たない）
pub struct App<B, C>
where
    B: ConversionBackend,
    C: PollConfig,
{
    backend: Arc<B>,
    poll_config: C,
}

impl<B, C> App<B, C>
where
    B: ConversionBackend + 'static,
    C: PollConfig + Clone + 'static,
{
    /// 新しいAppインスタンスを作成（コンストラクタインジェクション）
    pub fn new(backend: B, poll_config: C) -> Self {
        Self {
            backend: Arc::new(backend),
            poll_config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn poll_config(&self) -> &C {
        &self.poll_config
    }

    /// バックエンドを共有するポーリングエンジンを作成
    pub fn create_poller(&self) -> ProgressPoller<Arc<B>, C> {
        ProgressPoller::new(Arc::clone(&self.backend), self.poll_config.clone())
    }

    /// URLの検証・短縮URL展開・サービス判定
    ///
    /// 形式が不正な場合はネットワークにアクセスせずに失敗する。
    pub async fn prepare(&self, raw: &str) -> ConvertResult<PreparedPlaylist> {
        let candidate = raw.trim();
        if !link::is_valid_url(candidate) {
            return Err(ConvertError::invalid_url(candidate));
        }

        let url = if link::is_shortened(candidate) {
            let expanded = self.backend.expand_url(candidate).await?;
            debug!(from = %candidate, to = %expanded, "expanded shortened url");
            if !link::is_valid_url(&expanded) {
                return Err(ConvertError::invalid_url(expanded));
            }
            expanded
        } else {
            candidate.to_string()
        };

        let source = link::detect_platform(&url)?;
        Ok(PreparedPlaylist { url, source })
    }

    /// 変換ジョブを登録
    pub async fn submit(
        &self,
        prepared: &PreparedPlaylist,
        invert_order: bool,
    ) -> ConvertResult<TaskHandle> {
        let request = ConversionRequest {
            playlist: prepared.url.clone(),
            platform: prepared.target(),
            invert_order: invert_order.then_some(true),
        };

        let handle = self.backend.submit_conversion(&request).await?;
        info!(
            task = %handle,
            from = prepared.source.display_name(),
            to = prepared.target().display_name(),
            "conversion submitted"
        );
        Ok(handle)
    }

    /// 変換の一連の流れ（検証 → 展開 → 判定 → 登録 → ポーリング）
    ///
    /// ポーリング開始前の失敗でも `on_error` が一度だけ呼ばれる。
    pub async fn convert<O>(
        &self,
        options: &ConvertOptions,
        observer: &O,
        cancel: &CancellationToken,
    ) -> ConvertResult<TaskResult>
    where
        O: PollObserver + ?Sized,
    {
        let handle = match self.start(options, cancel).await {
            Ok(handle) => handle,
            Err(ConvertError::Cancelled) => return Err(ConvertError::Cancelled),
            Err(error) => {
                observer.on_error(&error).await;
                return Err(error);
            }
        };

        self.create_poller().poll(&handle, observer, cancel).await
    }

    async fn start(
        &self,
        options: &ConvertOptions,
        cancel: &CancellationToken,
    ) -> ConvertResult<TaskHandle> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ConvertError::Cancelled),
            handle = async {
                let prepared = self.prepare(&options.playlist).await?;
                self.submit(&prepared, options.invert_order).await
            } => handle,
        }
    }

    /// タスク状態を一度だけ取得
    pub async fn status(&self, handle: &TaskHandle) -> ConvertResult<TaskResult> {
        self.backend.fetch_task_status(handle).await
    }

    /// ニュースレター購読
    pub async fn subscribe(&self, email: &str) -> ConvertResult<()> {
        let email = email.trim();
        if !link::is_valid_email(email) {
            return Err(ConvertError::invalid_email(email));
        }
        self.backend.subscribe(email).await
    }
}
