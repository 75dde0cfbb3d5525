// CLI層 - コマンドライン引数の定義と処理
// ユーザーインターフェースとアプリケーションロジックの橋渡し

pub mod args;
pub mod commands;
pub mod outcome;

// 公開API
pub use args::*;
pub use commands::*;
pub use outcome::*;
