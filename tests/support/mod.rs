//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::sync::Mutex;
use std::time::Duration;

use segstitch_core::ProgressReporter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves `body` at `route`, expecting exactly one request.
pub async fn mount_segment(server: &MockServer, route: &str, body: &[u8], delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Serves `status` with an empty body at `route`.
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serves a playlist document at `route`.
pub async fn mount_playlist(server: &MockServer, route: &str, document: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/vnd.apple.mpegurl")
                .set_body_string(document),
        )
        .mount(server)
        .await;
}

/// Records every progress notification.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<(usize, usize, u64)>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<(usize, usize, u64)> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn on_segment_committed(&self, done: usize, total: usize, bytes_written: u64) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((done, total, bytes_written));
    }
}
