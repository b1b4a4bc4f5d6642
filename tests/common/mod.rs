//! Shared fakes for integration tests.

#![allow(dead_code)]

use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tbs::fetch::{BoardSource, FetchError};
use tbs::media::{MediaError, RemoteFiles, StoredFile};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// The board fixture: 2 lists, 3 cards, 1 checklist with 2 items, 1 attachment.
pub fn fixture() -> Value {
    serde_json::from_str(include_str!("../fixtures/board.json")).unwrap()
}

/// Board source returning a canned document or a canned failure.
pub struct FakeSource {
    doc: Option<Value>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(doc: Value) -> Self {
        Self {
            doc: Some(doc),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            doc: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BoardSource for FakeSource {
    async fn fetch_board(&self, _board_id: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.doc.clone().ok_or(FetchError::Status {
            status: 500,
            body: "boom".into(),
        })
    }
}

/// Remote file fake that counts downloads and can fail selected URLs.
///
/// Each download yields to the scheduler a few times before finishing so
/// that concurrent resolutions actually overlap.
#[derive(Default)]
pub struct FakeFiles {
    downloads: AtomicUsize,
    fail_urls: Vec<String>,
    requested: Mutex<Vec<(String, String)>>,
}

impl FakeFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            fail_urls: urls.iter().map(|u| (*u).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// `(url, extension)` pairs in request order.
    pub fn requested(&self) -> Vec<(String, String)> {
        self.requested.lock().unwrap().clone()
    }
}

impl RemoteFiles for FakeFiles {
    async fn download(&self, url: &str, extension: &str) -> Result<StoredFile, MediaError> {
        self.requested
            .lock()
            .unwrap()
            .push((url.to_string(), extension.to_string()));

        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        if self.fail_urls.iter().any(|u| u == url) {
            return Err(MediaError::Status {
                status: 404,
                url: url.to_string(),
            });
        }

        let n = self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(StoredFile {
            path: PathBuf::from(format!("/fake/files/{n}.{extension}")),
            size: 4,
            digest: format!("bytes-{n}"),
        })
    }
}

/// Tracing layer that records the level and message of every event.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<(Level, String)> {
        self.events.lock().unwrap().clone()
    }

    /// Events at info, warn or error.
    pub fn status_events(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(level, _)| [Level::INFO, Level::WARN, Level::ERROR].contains(level))
            .map(|(_, message)| message)
            .collect()
    }
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}
