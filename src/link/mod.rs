// プレイリストURLの取り扱い
//
// - validation.rs  - 形式チェック
// - platform.rs    - サービス判定・短縮URL検出

pub mod platform;
pub mod validation;

// 公開API
pub use platform::{detect_platform, host_of, is_shortened, SHORTENER_HOSTS};
pub use validation::{is_valid_email, is_valid_url};
