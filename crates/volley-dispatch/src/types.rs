use serde::{Deserialize, Serialize};

/// Immutable snapshot of one broadcast job, captured at start.
///
/// Validation (non-empty message/channels, interval bounds) happens at the
/// HTTP boundary before a `JobParams` is ever constructed; the dispatch
/// layer trusts its input.
#[derive(Debug, Clone)]
pub struct JobParams {
    /// Authorization header value for outbound delivery. Never logged.
    pub token: String,
    /// Message body sent to every channel.
    pub message: String,
    /// Ordered target channel ids. Duplicates are dispatched independently.
    pub channel_ids: Vec<String>,
    /// Seconds between cycle starts. Must be >= 1.
    pub delay_secs: u64,
    /// Opaque upload references (`/uploads/...`) attached to each send.
    pub image_refs: Vec<String>,
}

/// Severity tag of a log entry. Closed set — the dashboard styles each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogKind::Info => "info",
            LogKind::Success => "success",
            LogKind::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// One timestamped outcome record in the rolling log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Short random token, unique within current log contents.
    pub id: String,
    /// RFC-3339 creation instant.
    pub timestamp: String,
    /// Serialised as `type` — the field name the dashboard client expects.
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub message: String,
}

/// Read-only snapshot returned by `DispatchController::status`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchStatus {
    pub running: bool,
    pub logs: Vec<LogEntry>,
}
