//! Per-call request logging hook.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Callback receiving one [`RequestLog`] per gateway call.
///
/// Runs inline on the calling task, so it should hand off anything slow.
pub type LogHook = Arc<dyn Fn(&RequestLog) + Send + Sync>;

/// What happened during one gateway call.
#[derive(Clone, Debug)]
pub struct RequestLog {
    pub method: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub request_body: Option<String>,
    pub response_headers: Vec<(String, String)>,
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
}

impl RequestLog {
    /// Start a log for a call, stamping the start time.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            started_at: Utc::now(),
            request_body: None,
            response_headers: Vec::new(),
            status_code: None,
            response_body: None,
            error: None,
            duration_ms: None,
        }
    }

    /// Record the encoded request form.
    pub fn set_request_body(&mut self, body: impl Into<String>) {
        self.request_body = Some(body.into());
    }

    /// Record the response headers in arrival order.
    pub fn set_response_headers(&mut self, headers: &[(String, String)]) {
        self.response_headers = headers.to_vec();
    }

    /// Record the HTTP status.
    pub fn set_status_code(&mut self, status: u16) {
        self.status_code = Some(status);
    }

    /// Record the raw response body.
    pub fn set_response_body(&mut self, body: impl Into<String>) {
        self.response_body = Some(body.into());
    }

    /// Record why the call failed.
    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
    }

    /// Record the elapsed time since creation.
    pub fn finish(&mut self) {
        self.duration_ms = Some((Utc::now() - self.started_at).num_milliseconds());
    }

    /// Flatten into string fields.
    ///
    /// Response headers are rendered as a JSON object of name to value list.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("method".to_string(), self.method.clone());
        map.insert("url".to_string(), self.url.clone());

        if let Some(body) = &self.request_body {
            map.insert("request_body".to_string(), body.clone());
        }
        if !self.response_headers.is_empty() {
            let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
            for (k, v) in &self.response_headers {
                grouped.entry(k.as_str()).or_default().push(v.as_str());
            }
            map.insert(
                "response_header".to_string(),
                serde_json::to_string(&grouped).unwrap_or_default(),
            );
        }
        if let Some(status) = self.status_code {
            map.insert("status_code".to_string(), status.to_string());
        }
        if let Some(body) = &self.response_body {
            map.insert("response_body".to_string(), body.clone());
        }
        if let Some(err) = &self.error {
            map.insert("error".to_string(), err.clone());
        }
        if let Some(ms) = self.duration_ms {
            map.insert("duration".to_string(), format!("{}ms", ms));
        }

        map
    }
}

/// Error recorded when the call future is dropped before it completes.
pub(crate) const DROPPED_ERROR: &str = "request dropped before completion";

/// Delivers a [`RequestLog`] to its hook exactly once, when dropped.
///
/// A call whose future is dropped mid-flight still reaches the hook, with
/// [`DROPPED_ERROR`] recorded.
pub(crate) struct LogGuard {
    log: RequestLog,
    hook: Option<LogHook>,
    completed: bool,
}

impl LogGuard {
    pub(crate) fn new(log: RequestLog, hook: Option<LogHook>) -> Self {
        Self {
            log,
            hook,
            completed: false,
        }
    }

    pub(crate) fn log_mut(&mut self) -> &mut RequestLog {
        &mut self.log
    }

    /// Mark the call finished, recording `error` if it failed.
    pub(crate) fn complete<T, E: ToString>(&mut self, result: &Result<T, E>) {
        if let Err(e) = result {
            self.log.set_error(e.to_string());
        }
        self.completed = true;
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if !self.completed && self.log.error.is_none() {
            self.log.set_error(DROPPED_ERROR);
        }
        self.log.finish();
        if let Some(hook) = &self.hook {
            hook(&self.log);
        }
    }
}
