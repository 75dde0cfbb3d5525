// 変換タスクに関連するデータ型定義

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// バックエンドが変換ジョブを登録した時に発行するタスク識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ある時点での処理済み件数
///
/// `current` はサーバー側の契約で単調非減少だが、クライアントでは検証しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub percent: f64,
}

/// タスク状態エンドポイントのレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub complete: bool,
    /// 実行中は `null` が返る
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub progress: Option<ProgressSnapshot>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TaskResult {
    /// 実行中（未完了）のレスポンスを作成
    pub fn in_progress(progress: Option<ProgressSnapshot>) -> Self {
        Self {
            complete: false,
            success: None,
            progress,
            result: None,
            state: None,
        }
    }

    /// 成功で完了したレスポンスを作成
    pub fn succeeded(result: serde_json::Value) -> Self {
        Self {
            complete: true,
            success: Some(true),
            progress: None,
            result: Some(result),
            state: None,
        }
    }

    /// 失敗で完了したレスポンスを作成
    pub fn failed(result: serde_json::Value) -> Self {
        Self {
            complete: true,
            success: Some(false),
            progress: None,
            result: Some(result),
            state: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressSnapshot) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn is_success(&self) -> bool {
        self.complete && self.success == Some(true)
    }

    pub fn is_retrying(&self) -> bool {
        !self.complete
            && self
                .state
                .as_deref()
                .is_some_and(|state| state.eq_ignore_ascii_case("RETRY"))
    }

    /// 成功時の結果（変換後プレイリストのURL）
    pub fn result_url(&self) -> Option<&str> {
        self.result.as_ref()?.as_str()
    }

    /// `RETRY` 状態の詳細を取得
    pub fn retry_info(&self) -> Option<RetryInfo> {
        if !self.is_retrying() {
            return None;
        }

        let result = self.result.as_ref();
        let message = result
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("task is retrying")
            .to_string();
        let next_retry = result
            .and_then(|value| value.get("next_retry"))
            .and_then(|value| value.as_str())
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc));

        Some(RetryInfo { message, next_retry })
    }

    /// 失敗したタスクの詳細を抽出
    pub fn failure(&self) -> TaskFailure {
        TaskFailure::from_result_value(self.result.as_ref())
    }
}

/// サーバーが報告した再試行予定
#[derive(Debug, Clone, PartialEq)]
pub struct RetryInfo {
    pub message: String,
    pub next_retry: Option<DateTime<Utc>>,
}

/// 失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// プレイリストが見つからない
    NotFound,
    /// 非公開などでアクセスできない
    Forbidden,
    Other,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            403 => Self::Forbidden,
            _ => Self::Other,
        }
    }
}

/// 失敗で完了したタスクの情報
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub message: Option<String>,
    /// 構造化されたステータスコード（取得できた場合のみ）
    pub status: Option<u16>,
}

fn upstream_status_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // requests の HTTPError 形式: "404 Client Error: Not Found for url: ..."
        Regex::new(r"\b([1-5][0-9]{2}) (?:Client|Server) Error\b").expect("valid status regex")
    })
}

impl TaskFailure {
    pub fn new(message: Option<String>, status: Option<u16>) -> Self {
        Self { message, status }
    }

    /// `result` フィールドから失敗情報を抽出
    ///
    /// 文字列なら例外メッセージ、オブジェクトなら `message` / `exc_message` と
    /// `status_code` / `status` を読む。
    pub fn from_result_value(value: Option<&serde_json::Value>) -> Self {
        let (message, explicit_status) = match value {
            Some(serde_json::Value::String(message)) => (Some(message.clone()), None),
            Some(serde_json::Value::Object(map)) => {
                let message = ["message", "exc_message"]
                    .iter()
                    .filter_map(|key| map.get(*key))
                    .find_map(|value| match value {
                        serde_json::Value::String(s) => Some(s.clone()),
                        serde_json::Value::Array(items) => {
                            items.first().and_then(|item| item.as_str()).map(str::to_string)
                        }
                        _ => None,
                    });
                let status = ["status_code", "status"]
                    .iter()
                    .filter_map(|key| map.get(*key))
                    .find_map(|value| value.as_u64())
                    .and_then(|status| u16::try_from(status).ok());
                (message, status)
            }
            _ => (None, None),
        };

        let status = explicit_status.or_else(|| {
            message
                .as_deref()
                .and_then(|message| upstream_status_pattern().captures(message))
                .and_then(|captures| captures.get(1))
                .and_then(|code| code.as_str().parse().ok())
        });

        Self { message, status }
    }

    pub fn kind(&self) -> FailureKind {
        self.status.map(FailureKind::from_status).unwrap_or(FailureKind::Other)
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.status) {
            (Some(message), _) => f.write_str(message),
            (None, Some(status)) => write!(f, "status {status}"),
            (None, None) => f.write_str("unknown task failure"),
        }
    }
}

/// 対応している音楽サービス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Spotify,
    AppleMusic,
}

impl Platform {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::AppleMusic => "apple-music",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Spotify => "Spotify",
            Self::AppleMusic => "Apple Music",
        }
    }

    /// 変換先のサービス（このサービスのプレイリストはもう一方へ変換される）
    pub const fn target(&self) -> Platform {
        match self {
            Self::Spotify => Self::AppleMusic,
            Self::AppleMusic => Self::Spotify,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(Self::Spotify),
            "apple-music" | "applemusic" | "apple_music" => Ok(Self::AppleMusic),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// 変換リクエスト（`POST /playlist`）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRequest {
    pub playlist: String,
    /// 変換先のサービス
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert_order: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionAccepted {
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpandResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest<'a> {
    pub email: &'a str,
}

/// エラーレスポンスの本文 `{ "message": ... }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: Option<String>,
}
