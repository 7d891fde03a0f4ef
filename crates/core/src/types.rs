use std::fmt;

use serde::Serialize;

/// Portal credentials. Debug output is redacted so these never end up in logs.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-attempt classification of the login response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Ambiguous,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure => write!(f, "failure"),
            Outcome::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// What a single GET against a candidate URL looked like. Only used for the
/// diagnostic email body.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub status: Option<u16>,
    pub final_url: Option<String>,
    pub body_len: usize,
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn ok(url: &str, status: u16, final_url: &str, body_len: usize) -> Self {
        Self {
            url: url.to_string(),
            status: Some(status),
            final_url: Some(final_url.to_string()),
            body_len,
            error: None,
        }
    }

    pub fn failed(url: &str, error: &str) -> Self {
        Self {
            url: url.to_string(),
            status: None,
            final_url: None,
            body_len: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Everything the report composer needs about one run. Built up as the
/// orchestrator walks its states and discarded after the mail is sent.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    pub probes: Vec<ProbeResult>,
    pub outcome: Option<Outcome>,
    /// URL whose submission decided the outcome.
    pub decided_at: Option<String>,
    pub order_probe: Option<ProbeResult>,
}

impl ReportContext {
    pub fn new(started_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            started_at,
            duration_secs: 0.0,
            probes: Vec::new(),
            outcome: None,
            decided_at: None,
            order_probe: None,
        }
    }
}
