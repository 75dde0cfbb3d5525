// 貼り付けられたURLの形式チェック

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?P<host>[^\s/:?#]+)(?::(?P<port>[0-9]{2,5}))?(?P<path>/\S*)?$")
            .expect("valid url regex")
    })
}

fn domain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:(?:[a-z\x{00a1}-\x{ffff}0-9]-*)*[a-z\x{00a1}-\x{ffff}0-9]+)(?:\.(?:[a-z\x{00a1}-\x{ffff}0-9]-*)*[a-z\x{00a1}-\x{ffff}0-9]+)*\.[a-z\x{00a1}-\x{ffff}]{2,}$",
        )
        .expect("valid domain regex")
    })
}

/// 公開アドレスとして受け付けるIPv4かどうか
fn is_public_ipv4(addr: Ipv4Addr) -> bool {
    let [first, second, _, last] = addr.octets();

    if addr.is_private() || addr.is_loopback() || addr.is_link_local() {
        return false;
    }
    // 127/8 は is_loopback で除外済み、10/8 は is_private で除外済み
    if !(1..=223).contains(&first) {
        return false;
    }
    if first == 172 && (16..=31).contains(&second) {
        return false;
    }
    last != 0 && last != 255
}

fn is_valid_host(host: &str) -> bool {
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return host.parse::<Ipv4Addr>().is_ok_and(is_public_ipv4);
    }
    domain_pattern().is_match(&host.to_lowercase())
}

/// プレイリストURLとして妥当な形式かどうか
///
/// スキームは省略可能（http/httpsのみ）。ホストは公開IPv4か、2文字以上の
/// TLDを持つドメイン名。
pub fn is_valid_url(input: &str) -> bool {
    let candidate = input.trim();
    if candidate.is_empty() {
        return false;
    }

    let Some(captures) = url_pattern().captures(candidate) else {
        return false;
    };

    captures
        .name("host")
        .is_some_and(|host| is_valid_host(host.as_str()))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]{2,}$").expect("valid email regex"))
}

/// ニュースレター購読用のメールアドレスの簡易チェック
pub fn is_valid_email(input: &str) -> bool {
    email_pattern().is_match(input.trim())
}
