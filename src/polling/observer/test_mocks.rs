// テスト用の通知記録モック実装

use super::traits::{PollEvent, PollObserver};
use crate::domain::{ConvertError, ProgressSnapshot, TaskResult};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// 受け取った通知を順番に記録する
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<PollEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&PollEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

#[async_trait::async_trait]
impl PollObserver for RecordingObserver {
    async fn on_progress(&self, progress: &ProgressSnapshot) {
        self.events
            .lock()
            .unwrap()
            .push(PollEvent::Progress(progress.clone()));
    }

    async fn on_success(&self, result: &TaskResult) {
        self.events
            .lock()
            .unwrap()
            .push(PollEvent::Success(result.clone()));
    }

    async fn on_error(&self, error: &ConvertError) {
        self.events.lock().unwrap().push(PollEvent::from_error(error));
    }

    async fn on_retry(&self, message: &str, retry_at: DateTime<Utc>) {
        self.events.lock().unwrap().push(PollEvent::Retry {
            message: message.to_string(),
            retry_at,
        });
    }

    async fn on_task_error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(PollEvent::TaskError(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        let snapshot = ProgressSnapshot {
            current: 1,
            total: 2,
            percent: 50.0,
        };

        observer.on_progress(&snapshot).await;
        observer.on_task_error("boom").await;
        observer
            .on_error(&ConvertError::http(500, "/celery-progress/x/", "boom"))
            .await;

        let events = observer.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], PollEvent::Progress(snapshot));
        assert_eq!(events[1], PollEvent::TaskError("boom".to_string()));
        assert!(matches!(events[2], PollEvent::Error { status: Some(500), .. }));
        assert!(events[2].is_terminal());
    }

    #[tokio::test]
    async fn test_observer_through_arc() {
        let observer = Arc::new(RecordingObserver::new());
        let observer_ref: &dyn PollObserver = &observer;

        observer_ref
            .on_success(&TaskResult::succeeded(serde_json::json!("https://x")))
            .await;

        assert_eq!(observer.count(|e| matches!(e, PollEvent::Success(_))), 1);
    }
}
