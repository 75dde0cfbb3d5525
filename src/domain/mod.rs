// ドメイン層 - 型とエラー定義
// 他のレイヤーから参照される基本的なデータ構造を提供

pub mod error;
pub mod types;

// 公開API
pub use error::{ConvertError, ConvertResult, ErrorSeverity};
pub use types::{
    ConversionAccepted, ConversionRequest, ExpandRequest, ExpandResponse, FailureKind, Platform,
    ProgressSnapshot, RetryInfo, ServerMessage, SubscribeRequest, TaskFailure, TaskHandle,
    TaskResult,
};
