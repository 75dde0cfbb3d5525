// ポーリング設定の管理
//
// - traits.rs      - 設定トレイト
// - test_mocks.rs  - テスト用の固定値設定

pub mod traits;

#[cfg(test)]
pub mod test_mocks;

// 公開API
pub use traits::*;

// テストモック（テスト時のみ）
#[cfg(test)]
pub use test_mocks::*;
