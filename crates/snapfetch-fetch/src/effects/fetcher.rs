use std::path::Path;

use futures_util::StreamExt;

use crate::core::{AttemptEvent, AttemptState, StatusClass, classify_status};
use crate::data::{FetchReport, RetryPolicy};
use crate::effects::http::HttpClient;
use crate::effects::pause::Pause;
use crate::effects::staging::StagedFile;

/// Drives one URL through the attempt state machine.
pub struct Fetcher<C: HttpClient, P: Pause> {
    client: C,
    pause:  P,
    policy: RetryPolicy,
}

impl<C: HttpClient, P: Pause> Fetcher<C, P> {
    pub fn new(client: C, pause: P) -> Self {
        Self {
            client,
            pause,
            policy: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch `url` into `destination`, retrying transient failures.
    ///
    /// Always returns a terminal report; failures are values, not errors.
    pub async fn fetch(&self, url: &str, destination: &Path) -> FetchReport {
        let mut state = AttemptState::Pending;

        loop {
            state = match state.into_report() {
                Ok(report) => return report,
                Err(in_flight) => {
                    let event = self.next_event(&in_flight, url, destination).await;
                    in_flight.advance(event, &self.policy)
                }
            };
        }
    }

    /// Perform whatever the in-flight `state` is waiting on.
    async fn next_event(&self, state: &AttemptState, url: &str, destination: &Path) -> AttemptEvent {
        match state {
            AttemptState::Requesting { attempt } => {
                tracing::debug!(url, attempt, "requesting");
                self.attempt(url, destination).await
            }
            AttemptState::RetryWait { attempt, last } => {
                tracing::debug!(
                    url,
                    attempt,
                    failure = %last,
                    wait_ms = self.policy.get_wait().as_millis() as u64,
                    "retrying after transient failure"
                );
                self.pause.pause(self.policy.get_wait()).await;
                AttemptEvent::WaitElapsed
            }
            _ => AttemptEvent::Start,
        }
    }

    /// One request: classify the status and, on 2xx, stream the body into place.
    async fn attempt(&self, url: &str, destination: &Path) -> AttemptEvent {
        let response = match self.client.get(url).await {
            Ok(response) => response,
            Err(e) => return AttemptEvent::Transport(e.to_string()),
        };

        let status = response.status;
        if classify_status(status) != StatusClass::Success {
            return AttemptEvent::Status(status);
        }

        let mut staged = match StagedFile::create(destination).await {
            Ok(staged) => staged,
            Err(e) => return AttemptEvent::WriteFailed(e.to_string()),
        };

        let mut body = response.body;
        let mut bytes = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    staged.discard().await;
                    return AttemptEvent::Transport(e.to_string());
                }
            };
            if let Err(e) = staged.write(&chunk).await {
                staged.discard().await;
                return AttemptEvent::WriteFailed(e.to_string());
            }
            bytes += chunk.len() as u64;
        }

        match staged.commit().await {
            Ok(()) => AttemptEvent::Delivered { status, bytes },
            Err(e) => AttemptEvent::WriteFailed(e.to_string()),
        }
    }
}
