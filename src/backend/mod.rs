use crate::domain::{ConversionRequest, ConvertResult, TaskHandle, TaskResult};
use async_trait::async_trait;
use mockall::automock;

pub mod http;

pub use http::HttpBackend;

/// 変換サービスのバックエンドを表すトレイト
#[automock]
#[async_trait]
pub trait ConversionBackend: Send + Sync {
    /// 変換ジョブを登録し、タスク識別子を受け取る
    async fn submit_conversion(&self, request: &ConversionRequest) -> ConvertResult<TaskHandle>;

    /// 短縮URLをリダイレクト先のURLへ展開する
    async fn expand_url(&self, url: &str) -> ConvertResult<String>;

    /// タスクの現在の状態を取得する
    async fn fetch_task_status(&self, handle: &TaskHandle) -> ConvertResult<TaskResult>;

    /// ニュースレターの購読を登録する
    async fn subscribe(&self, email: &str) -> ConvertResult<()>;
}

// ConversionBackend for Box<dyn ConversionBackend>
#[async_trait]
impl ConversionBackend for Box<dyn ConversionBackend> {
    async fn submit_conversion(&self, request: &ConversionRequest) -> ConvertResult<TaskHandle> {
        self.as_ref().submit_conversion(request).await
    }

    async fn expand_url(&self, url: &str) -> ConvertResult<String> {
        self.as_ref().expand_url(url).await
    }

    async fn fetch_task_status(&self, handle: &TaskHandle) -> ConvertResult<TaskResult> {
        self.as_ref().fetch_task_status(handle).await
    }

    async fn subscribe(&self, email: &str) -> ConvertResult<()> {
        self.as_ref().subscribe(email).await
    }
}

// 共有所有でも使えるように
#[async_trait]
impl<B: ConversionBackend + ?Sized> ConversionBackend for std::sync::Arc<B> {
    async fn submit_conversion(&self, request: &ConversionRequest) -> ConvertResult<TaskHandle> {
        self.as_ref().submit_conversion(request).await
    }

    async fn expand_url(&self, url: &str) -> ConvertResult<String> {
        self.as_ref().expand_url(url).await
    }

    async fn fetch_task_status(&self, handle: &TaskHandle) -> ConvertResult<TaskResult> {
        self.as_ref().fetch_task_status(handle).await
    }

    async fn subscribe(&self, email: &str) -> ConvertResult<()> {
        self.as_ref().subscribe(email).await
    }
}
