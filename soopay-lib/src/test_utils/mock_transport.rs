//! Recording mock transport.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::{Result, SoopayError};

enum Outcome {
    Respond(HttpResponse),
    Fail(String),
}

/// Transport returning a canned outcome and recording every request.
pub struct MockTransport {
    outcome: Outcome,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Respond 200 with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    /// Respond with the given status and body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Respond(HttpResponse {
            status,
            headers: vec![(
                "content-type".to_string(),
                "text/html;charset=UTF-8".to_string(),
            )],
            body: body.into().into_bytes(),
        }))
    }

    /// Fail with a transport error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail(message.into()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().expect("requests lock").push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            Outcome::Respond(resp) => Ok(resp.clone()),
            Outcome::Fail(msg) => Err(SoopayError::Transport(msg.clone())),
        }
    }
}
