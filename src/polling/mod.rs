// タスク進捗ポーリングのモジュール
//
// - config/          - ポーリング設定（間隔・上限・バックオフ）
// - observer/        - 呼び出し側へのコールバック
// - implementations  - 既定の設定と通知の実装
// - engine           - ポーリングループ本体

pub mod config;
pub mod engine;
pub mod implementations;
pub mod observer;

// 公開API - 各機能から再エクスポート
pub use config::PollConfig;
pub use engine::{PollTask, ProgressPoller};
pub use implementations::{
    ChannelPollObserver, ConsolePollObserver, DefaultPollConfig, NoOpPollObserver,
    DEFAULT_MAX_BACKOFF, DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_POLL_INTERVAL,
};
pub use observer::{MockPollObserver, PollEvent, PollObserver};

#[cfg(test)]
pub use config::MockPollConfig;
#[cfg(test)]
pub use observer::RecordingObserver;
