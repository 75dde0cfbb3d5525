// URLからのサービス判定と短縮URLの検出

use crate::domain::{ConvertError, ConvertResult, Platform};

/// リダイレクトで展開が必要な短縮URLのホスト
pub const SHORTENER_HOSTS: &[&str] = &["spotify.link", "spoti.fi", "apple.co"];

const SPOTIFY_HOST_SUFFIX: &str = "spotify.com";
const APPLE_MUSIC_HOSTS: &[&str] = &["music.apple.com", "itunes.apple.com", "geo.music.apple.com"];

/// URLからホスト部分を小文字で取り出す（スキーム省略可）
pub fn host_of(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    let host = without_scheme
        .split(['/', '?', '#'])
        .next()?
        .split(':')
        .next()?
        .trim_end_matches('.')
        .to_ascii_lowercase();

    (!host.is_empty()).then_some(host)
}

fn host_matches(host: &str, expected: &str) -> bool {
    host == expected
        || host
            .strip_suffix(expected)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// 短縮URLかどうか
pub fn is_shortened(url: &str) -> bool {
    host_of(url).is_some_and(|host| {
        SHORTENER_HOSTS
            .iter()
            .any(|shortener| host_matches(&host, shortener))
    })
}

/// 変換元のサービスを判定
pub fn detect_platform(url: &str) -> ConvertResult<Platform> {
    let host = host_of(url).ok_or_else(|| ConvertError::invalid_url(url))?;

    if host_matches(&host, SPOTIFY_HOST_SUFFIX) {
        return Ok(Platform::Spotify);
    }
    if APPLE_MUSIC_HOSTS.iter().any(|apple| host == *apple) {
        return Ok(Platform::AppleMusic);
    }

    Err(ConvertError::unsupported_platform(url))
}
