// コマンドの中断と失敗時の表示・終了コード

use super::commands::ReportedError;
use crate::domain::ConvertError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub const EXIT_FAILURE: u8 = 1;
// Ctrl-C で中断した場合
pub const EXIT_CANCELLED: u8 = 130;

/// キャンセルされるまでコマンドを実行する
pub async fn until_cancelled<F>(command: F, cancel: &CancellationToken) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    tokio::select! {
        result = command => result,
        _ = cancel.cancelled() => Err(ConvertError::Cancelled.into()),
    }
}

/// 失敗時に標準エラーへ出す内容と終了コード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// 表示済みの場合は `None`
    pub message: Option<String>,
    pub exit_code: u8,
}

impl FailureReport {
    pub fn from_error(error: &anyhow::Error) -> Self {
        if error.downcast_ref::<ReportedError>().is_some() {
            return Self {
                message: None,
                exit_code: EXIT_FAILURE,
            };
        }

        match error.downcast_ref::<ConvertError>() {
            Some(ConvertError::Cancelled) => Self {
                message: Some(format!("⏹️  {}", ConvertError::Cancelled.user_message())),
                exit_code: EXIT_CANCELLED,
            },
            Some(convert_error) => Self {
                message: Some(format!("❌ {}", convert_error.user_message())),
                exit_code: EXIT_FAILURE,
            },
            None => Self {
                message: Some(format!("❌ Error: {error:#}")),
                exit_code: EXIT_FAILURE,
            },
        }
    }
}
