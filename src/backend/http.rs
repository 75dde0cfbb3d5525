// reqwest による変換サービスのHTTP実装

use super::ConversionBackend;
use crate::domain::{
    ConversionAccepted, ConversionRequest, ConvertError, ConvertResult, ExpandRequest,
    ExpandResponse, Platform, ServerMessage, SubscribeRequest, TaskHandle, TaskResult,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const PLAYLIST_PATH: &str = "/playlist";
const EXPAND_PATH: &str = "/expand";
const SUBSCRIBERS_PATH: &str = "/subscribers";
const PROGRESS_SEGMENT: &str = "celery-progress";
const MUSIC_USER_TOKEN_HEADER: &str = "Music-User-Token";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP経由で変換サービスに接続するバックエンド
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    music_user_token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> ConvertResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// リクエスト単位のタイムアウトを指定して作成
    pub fn with_timeout(base_url: &str, request_timeout: Duration) -> ConvertResult<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ConvertError::configuration(format!("base_url が不正です: {base_url} ({e})")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConvertError::configuration(format!(
                "base_url は http または https である必要があります: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| ConvertError::configuration(format!("HTTPクライアントの作成に失敗: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            music_user_token: None,
        })
    }

    /// Apple Music 向け変換で転送するユーザートークン
    pub fn with_music_user_token(mut self, token: impl Into<String>) -> Self {
        self.music_user_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 進捗エンドポイントのURL（タスクIDは1セグメントとしてエンコード、末尾スラッシュ必須）
    fn progress_url(&self, handle: &TaskHandle) -> ConvertResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConvertError::configuration(format!("base_url が不正です: {} ({e})", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ConvertError::configuration(format!("base_url にパスを追加できません: {}", self.base_url)))?
            .pop_if_empty()
            .extend([PROGRESS_SEGMENT, handle.as_str(), ""]);
        Ok(url)
    }

    /// 2xx以外のレスポンスをエラーへ変換
    async fn ensure_success(
        path: &str,
        response: reqwest::Response,
    ) -> ConvertResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServerMessage>(&body)
            .ok()
            .and_then(|parsed| parsed.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

        warn!(endpoint = path, status = status.as_u16(), %message, "request rejected");
        Err(ConvertError::http(status.as_u16(), path, message))
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> ConvertResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| ConvertError::transport(path, e))?;
        serde_json::from_str(&body).map_err(|e| ConvertError::decode(path, e.to_string()))
    }
}

#[async_trait]
impl ConversionBackend for HttpBackend {
    async fn submit_conversion(&self, request: &ConversionRequest) -> ConvertResult<TaskHandle> {
        debug!(playlist = %request.playlist, platform = %request.platform, "submitting conversion");

        let mut builder = self.client.post(self.endpoint(PLAYLIST_PATH)).json(request);
        if request.platform == Platform::AppleMusic {
            if let Some(token) = &self.music_user_token {
                builder = builder.header(MUSIC_USER_TOKEN_HEADER, token);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ConvertError::transport(PLAYLIST_PATH, e))?;
        let response = Self::ensure_success(PLAYLIST_PATH, response).await?;
        let accepted: ConversionAccepted = Self::decode(PLAYLIST_PATH, response).await?;

        let task_id = accepted.task_id.ok_or(ConvertError::MissingTaskId)?;
        debug!(%task_id, "conversion accepted");
        Ok(TaskHandle::new(task_id))
    }

    async fn expand_url(&self, url: &str) -> ConvertResult<String> {
        debug!(%url, "expanding shortened url");

        let response = self
            .client
            .post(self.endpoint(EXPAND_PATH))
            .json(&ExpandRequest { url })
            .send()
            .await
            .map_err(|e| ConvertError::transport(EXPAND_PATH, e))?;
        let response = Self::ensure_success(EXPAND_PATH, response).await?;
        let expanded: ExpandResponse = Self::decode(EXPAND_PATH, response).await?;

        Ok(expanded.url)
    }

    async fn fetch_task_status(&self, handle: &TaskHandle) -> ConvertResult<TaskResult> {
        let url = self.progress_url(handle)?;
        let path = url.path().to_string();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConvertError::transport(path.clone(), e))?;
        let response = Self::ensure_success(&path, response).await?;

        Self::decode(&path, response).await
    }

    async fn subscribe(&self, email: &str) -> ConvertResult<()> {
        let response = self
            .client
            .post(self.endpoint(SUBSCRIBERS_PATH))
            .json(&SubscribeRequest { email })
            .send()
            .await
            .map_err(|e| ConvertError::transport(SUBSCRIBERS_PATH, e))?;
        Self::ensure_success(SUBSCRIBERS_PATH, response).await?;

        Ok(())
    }
}
