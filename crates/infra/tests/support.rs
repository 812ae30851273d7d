//! Shared fixtures for client integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier_domain::{ClientConfig, NormalizedError};
use courier_infra::api::{ApiClient, ApiClientBuilder, Notifier};
use wiremock::MockServer;

/// Captures every toast instead of displaying it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    /// `(code, message)` pairs
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn notify_error(&self, error: &NormalizedError) {
        self.errors.lock().unwrap().push((error.code().to_string(), error.message().to_string()));
    }
}

/// Short backoff (10, 20, 40 ms) so retry tests stay fast.
pub fn fast_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        timeout: Duration::from_secs(2),
        retry_initial_delay: Duration::from_millis(10),
        retry_max_delay: Duration::from_millis(40),
        ..ClientConfig::with_base_url(base_url)
    }
}

pub fn builder(server: &MockServer) -> (ApiClientBuilder, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let builder =
        ApiClient::builder().config(fast_config(&server.uri())).notifier(notifier.clone());
    (builder, notifier)
}

pub fn client(server: &MockServer) -> (ApiClient, Arc<RecordingNotifier>) {
    let (builder, notifier) = builder(server);
    (builder.build().expect("client should build"), notifier)
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|requests| requests.len()).unwrap_or(0)
}
