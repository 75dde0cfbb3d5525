use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::domain::ConvertResult;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "playlist-convert")]
#[command(about = "Convert playlists between Spotify and Apple Music")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// 全サブコマンド共通の接続・ポーリング設定
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the conversion service
    #[arg(long, global = true, env = "PLAYLIST_CONVERT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Interval between progress requests in milliseconds (0 falls back to 500)
    #[arg(long, global = true, env = "PLAYLIST_CONVERT_POLL_INTERVAL_MS", default_value = "500")]
    pub poll_interval_ms: u64,

    /// Give up after this many progress requests
    #[arg(long, global = true, env = "PLAYLIST_CONVERT_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Give up after this many seconds of polling
    #[arg(long, global = true, env = "PLAYLIST_CONVERT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Timeout for a single HTTP request in seconds
    #[arg(long, global = true, env = "PLAYLIST_CONVERT_REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Apple Music user token forwarded when converting to Apple Music
    #[arg(long, global = true, env = "MUSIC_USER_TOKEN", hide_env_values = true)]
    pub music_user_token: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

impl GlobalArgs {
    /// 引数から検証済みのクライアント設定を組み立てる
    pub fn client_config(&self) -> ConvertResult<ClientConfig> {
        let config = ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_attempts,
            poll_timeout: self.timeout_secs.map(Duration::from_secs),
            music_user_token: self.music_user_token.clone(),
            ..ClientConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a playlist and wait for the result
    Convert {
        /// Spotify or Apple Music playlist URL (short links are expanded)
        playlist: String,

        /// Reverse the track order of the converted playlist
        #[arg(long)]
        invert_order: bool,

        /// Print only the resulting playlist URL
        #[arg(short, long)]
        quiet: bool,
    },

    /// Expand a shortened playlist link
    Expand { url: String },

    /// Fetch the current state of a conversion task once
    Status { task_id: String },

    /// Show which service a playlist URL belongs to (no network access)
    Detect { url: String },

    /// Subscribe an email address to the newsletter
    Subscribe { email: String },
}
