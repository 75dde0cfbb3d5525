// テストユーティリティ
// 統合テストで共有する設定・レスポンス・通知の記録

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use playlist_convert::backend::HttpBackend;
use playlist_convert::config::ClientConfig;
use playlist_convert::domain::{ConvertError, ProgressSnapshot, TaskResult};
use playlist_convert::polling::{DefaultPollConfig, PollEvent, PollObserver};
use playlist_convert::App;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub const SPOTIFY_PLAYLIST: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";
pub const APPLE_MUSIC_PLAYLIST: &str =
    "https://music.apple.com/us/playlist/pl.be45d23328f642cc91cf7086c7126daf";

/// テスト用の短い間隔のクライアント設定
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        poll_interval: TEST_POLL_INTERVAL,
        max_backoff: Duration::from_millis(100),
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    }
    .with_base_url(base_url)
}

pub fn test_app(config: &ClientConfig) -> App<HttpBackend, DefaultPollConfig> {
    App::new(
        config.build_backend().expect("backend"),
        config.poll_config().expect("poll config"),
    )
}

pub fn in_progress_body(current: u64, total: u64) -> Value {
    json!({
        "complete": false,
        "success": null,
        "progress": {
            "pending": false,
            "current": current,
            "total": total,
            "percent": current as f64 * 100.0 / total as f64
        }
    })
}

pub fn success_body(url: &str) -> Value {
    json!({
        "complete": true,
        "success": true,
        "progress": {"current": 10, "total": 10, "percent": 100.0},
        "result": url
    })
}

pub fn failure_body(message: &str) -> Value {
    json!({
        "complete": true,
        "success": false,
        "progress": {"current": 0, "total": 100, "percent": 0.0},
        "result": message
    })
}

/// 呼び出し回数に応じて順番にボディを返す（最後のボディは繰り返す）
pub fn sequenced(bodies: Vec<String>) -> impl Fn(&mockito::Request) -> Vec<u8> + Send + Sync + 'static {
    let hits = Arc::new(AtomicUsize::new(0));
    move |_| {
        let index = hits.fetch_add(1, Ordering::SeqCst).min(bodies.len() - 1);
        bodies[index].clone().into_bytes()
    }
}

/// 受け取った通知を順番に記録する
#[derive(Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<PollEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&PollEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    fn push(&self, event: PollEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl PollObserver for CollectingObserver {
    async fn on_progress(&self, progress: &ProgressSnapshot) {
        self.push(PollEvent::Progress(progress.clone()));
    }

    async fn on_success(&self, result: &TaskResult) {
        self.push(PollEvent::Success(result.clone()));
    }

    async fn on_error(&self, error: &ConvertError) {
        self.push(PollEvent::from_error(error));
    }

    async fn on_retry(&self, message: &str, retry_at: DateTime<Utc>) {
        self.push(PollEvent::Retry {
            message: message.to_string(),
            retry_at,
        });
    }

    async fn on_task_error(&self, message: &str) {
        self.push(PollEvent::TaskError(message.to_string()));
    }
}
