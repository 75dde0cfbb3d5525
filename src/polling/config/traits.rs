// ポーリング設定のトレイト定義

use std::time::Duration;

/// ポーリングの設定を抽象化するトレイト
pub trait PollConfig: Send + Sync {
    /// ポーリング間隔
    fn poll_interval(&self) -> Duration;

    /// 最大リクエスト回数（`None` なら無制限）
    fn max_attempts(&self) -> Option<u32>;

    /// ポーリング全体のタイムアウト（`None` なら無制限）
    fn timeout(&self) -> Option<Duration>;

    /// 連続して許容する一時的な失敗の回数
    fn max_consecutive_failures(&self) -> u32;

    /// バックオフ待機時間の上限
    fn max_backoff(&self) -> Duration;

    /// `consecutive_failures` 回連続で失敗した後の待機時間
    fn backoff_delay(&self, consecutive_failures: u32) -> Duration {
        let factor = 1u32 << consecutive_failures.min(16);
        self.poll_interval()
            .saturating_mul(factor)
            .min(self.max_backoff())
    }
}
