// 変換クライアント専用のカスタムエラー型定義

use super::types::{FailureKind, TaskFailure};
use std::time::Duration;
use thiserror::Error;

/// 変換クライアント固有のエラー型
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("無効なURL: {url}")]
    InvalidUrl { url: String },

    #[error("未対応のサービス: {url}")]
    UnsupportedPlatform { url: String },

    #[error("HTTPエラー: {status} ({endpoint}) - {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("通信エラー: {endpoint} - {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("レスポンス解析エラー: {endpoint} - {message}")]
    Decode { endpoint: String, message: String },

    #[error("タスクIDがレスポンスに含まれていません")]
    MissingTaskId,

    #[error("タスク失敗: {failure}")]
    TaskFailed { failure: TaskFailure },

    #[error("ポーリングがタイムアウトしました: {elapsed:?}")]
    PollTimeout { elapsed: Duration },

    #[error("ポーリング回数の上限に達しました: {attempts}回")]
    PollAttemptsExhausted { attempts: u32 },

    #[error("ポーリングがキャンセルされました")]
    Cancelled,

    #[error("ポーリングタスクエラー: {source}")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("無効なメールアドレス: {email}")]
    InvalidEmail { email: String },
}

impl ConvertError {
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn unsupported_platform(url: impl Into<String>) -> Self {
        Self::UnsupportedPlatform { url: url.into() }
    }

    /// HTTPステータスエラーの作成
    pub fn http(status: u16, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn task_failed(failure: TaskFailure) -> Self {
        Self::TaskFailed { failure }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    /// 構造化されたステータスコード（HTTP応答または失敗タスクから）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::TaskFailed { failure } => failure.status,
            _ => None,
        }
    }

    /// 失敗の分類
    pub fn failure_kind(&self) -> FailureKind {
        self.status()
            .map(FailureKind::from_status)
            .unwrap_or(FailureKind::Other)
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidUrl { .. } | Self::UnsupportedPlatform { .. } | Self::InvalidEmail { .. } => {
                ErrorSeverity::Low
            }
            Self::Cancelled => ErrorSeverity::Low,
            Self::Transport { .. } | Self::Decode { .. } => ErrorSeverity::Medium,
            Self::Http { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            Self::Http { .. } | Self::TaskFailed { .. } => ErrorSeverity::High,
            Self::MissingTaskId => ErrorSeverity::High,
            Self::PollTimeout { .. } | Self::PollAttemptsExhausted { .. } => ErrorSeverity::High,
            Self::Configuration { .. } | Self::TaskJoin { .. } => ErrorSeverity::Critical,
        }
    }

    /// 同じリクエストを再送すれば回復し得るかどうか
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Decode { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// 利用者向けのメッセージ
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl { .. } => {
                "Invalid URL. Enter a valid playlist url e.g https://music.apple.com/us/playlist/pl.be45d23328f642cc91cf7086c7126daf".to_string()
            }
            Self::UnsupportedPlatform { .. } => {
                "Only Spotify and Apple Music playlist links are supported.".to_string()
            }
            Self::InvalidEmail { email } => format!("Enter a valid email address: {email}"),
            Self::Configuration { message } => format!("Invalid configuration: {message}"),
            Self::MissingTaskId => {
                "The server accepted the request but returned no task id. Please try again.".to_string()
            }
            Self::Cancelled => "Conversion cancelled.".to_string(),
            Self::PollTimeout { .. } | Self::PollAttemptsExhausted { .. } => {
                "The conversion is taking too long. Please try again later.".to_string()
            }
            Self::Http { message, .. } if !message.is_empty() && self.failure_kind() == FailureKind::Other => {
                format!("Uh-Oh, something went wrong! {message}")
            }
            _ => match self.failure_kind() {
                FailureKind::NotFound => {
                    "Playlist not found. Make sure the link is correct.".to_string()
                }
                FailureKind::Forbidden => {
                    "The playlist is private. Make it public and try again.".to_string()
                }
                FailureKind::Other => "Uh-Oh, something went wrong!".to_string(),
            },
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - 利用者の入力ミスなど
    Low,
    /// 中重要度 - 一時的な障害
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - 起動不可
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl From<tokio::task::JoinError> for ConvertError {
    fn from(error: tokio::task::JoinError) -> Self {
        ConvertError::TaskJoin { source: error }
    }
}

/// 変換クライアントの結果型
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
