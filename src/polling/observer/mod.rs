// ポーリング通知
//
// 呼び出し側が渡すコールバック群をトレイトとして表現する。

pub mod traits;

#[cfg(test)]
pub mod test_mocks;

// 公開API
pub use traits::*;

// テストモック（テスト時のみ）
#[cfg(test)]
pub use test_mocks::*;
