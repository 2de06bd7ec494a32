//! Wire types exchanged between the HiveMind host backend and its controllers.
//!
//! Every mutating endpoint answers with a small JSON object carrying a boolean
//! success flag (`started`, `stopped` or `ok` depending on the endpoint) and an
//! optional human-readable `reason`. Missing flags decode as `false`.

use serde::{Deserialize, Serialize};

/// Endpoint paths served by the host backend.
pub mod paths {
    pub const STATUS: &str = "/api/status";
    pub const START: &str = "/api/start";
    pub const STOP: &str = "/api/stop";
    pub const SESSION_CREATE: &str = "/api/session/create";
    pub const UPLOAD: &str = "/api/upload";
    pub const SCHEDULE: &str = "/api/schedule";
}

/// Multipart field name the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

/// Reason shown when a failed response carries none.
pub const UNKNOWN_REASON: &str = "unknown";

/// Common view over the per-endpoint result payloads.
pub trait ActionResult {
    /// Value of the endpoint's success flag.
    fn succeeded(&self) -> bool;

    /// Backend-provided failure reason, if any.
    fn reason(&self) -> Option<&str>;

    /// Failure reason with the `"unknown"` fallback applied.
    ///
    /// An empty reason is treated the same as a missing one.
    fn failure_reason(&self) -> &str {
        self.reason()
            .filter(|reason| !reason.is_empty())
            .unwrap_or(UNKNOWN_REASON)
    }
}

/// Host status reported by `GET /api/status`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostStatus {
    /// `true` while the host process is running.
    #[serde(default)]
    pub running: bool,
    /// Code of the active session, if one exists.
    #[serde(default)]
    pub session_code: Option<String>,
    /// Number of nodes joined to the session.
    #[serde(default)]
    pub node_count: u64,
}

/// Response of `POST /api/start`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartResponse {
    #[serde(default)]
    pub started: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Response of `POST /api/stop`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StopResponse {
    #[serde(default)]
    pub stopped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Response of `POST /api/session/create`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCreateResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Response of `POST /api/upload`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    #[serde(default)]
    pub ok: bool,
    /// URL the uploaded track can be fetched from by the nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Body of `POST /api/schedule`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleRequest {
    pub track_url: String,
    /// Seconds from now until synchronized playback starts.
    pub delay: f64,
}

/// Response of `POST /api/schedule`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub ok: bool,
    /// Playback start as unix seconds (may carry a fractional part).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

macro_rules! impl_action_result {
    ($ty:ty, $flag:ident) => {
        impl ActionResult for $ty {
            fn succeeded(&self) -> bool {
                self.$flag
            }

            fn reason(&self) -> Option<&str> {
                self.reason.as_deref()
            }
        }
    };
}

impl_action_result!(StartResponse, started);
impl_action_result!(StopResponse, stopped);
impl_action_result!(SessionCreateResponse, ok);
impl_action_result!(UploadResponse, ok);
impl_action_result!(ScheduleResponse, ok);
