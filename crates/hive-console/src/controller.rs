//! Controller state and command handlers, independent of any UI toolkit.
//!
//! The controller never performs I/O itself: `request` turns an `Intent` into
//! an `Action` (or rejects it with a log line) and `apply` folds the `Outcome`
//! back into `UiState`.

use std::collections::HashSet;
use std::time::Duration;

use hive_types::{ActionResult, HostStatus, ScheduleRequest};

use crate::actions::{Action, ActionKind, FollowUp, Intent, Outcome};
use crate::config::Settings;
use crate::log_panel::{LogPanel, local_time_of_millis};

/// State the operator sees and the handlers read from.
#[derive(Debug)]
pub(crate) struct UiState {
    pub(crate) session_code: Option<String>,
    pub(crate) uploaded_url: Option<String>,
    pub(crate) last_status: Option<HostStatus>,
    pub(crate) status_text: String,
    pub(crate) log: LogPanel,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ControllerSettings {
    pub(crate) refresh_delay: Duration,
    pub(crate) default_delay_secs: f64,
    pub(crate) log_capacity: usize,
}

impl From<&Settings> for ControllerSettings {
    fn from(s: &Settings) -> Self {
        Self {
            refresh_delay: s.refresh_delay,
            default_delay_secs: s.default_delay_secs,
            log_capacity: s.log_capacity,
        }
    }
}

pub(crate) struct Controller {
    state: UiState,
    settings: ControllerSettings,
    in_flight: HashSet<ActionKind>,
    failures: u64,
}

/// Status region text for a status response.
pub(crate) fn render_status(status: &HostStatus) -> String {
    format!(
        "Running: {}\nSession: {}\nNodes: {}",
        status.running,
        status
            .session_code
            .as_deref()
            .filter(|code| !code.is_empty())
            .unwrap_or("-"),
        status.node_count
    )
}

/// Parse the delay input, falling back to `default` when empty or invalid.
pub(crate) fn parse_delay(input: &str, default: f64) -> f64 {
    let input = input.trim();
    if input.is_empty() {
        return default;
    }
    match input.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => default,
    }
}

impl Controller {
    pub(crate) fn new(settings: ControllerSettings) -> Self {
        Self {
            state: UiState {
                session_code: None,
                uploaded_url: None,
                last_status: None,
                status_text: "Running: -\nSession: -\nNodes: -".to_string(),
                log: LogPanel::new(settings.log_capacity),
            },
            settings,
            in_flight: HashSet::new(),
            failures: 0,
        }
    }

    pub(crate) fn state(&self) -> &UiState {
        &self.state
    }

    /// Number of failed or rejected operations so far.
    pub(crate) fn failures(&self) -> u64 {
        self.failures
    }

    pub(crate) fn is_in_flight(&self, kind: ActionKind) -> bool {
        self.in_flight.contains(&kind)
    }

    pub(crate) fn append_log(&mut self, message: impl Into<String>) {
        self.state.log.append(message);
    }

    pub(crate) fn set_uploaded_url(&mut self, url: impl Into<String>) {
        self.state.uploaded_url = Some(url.into()).filter(|u| !u.is_empty());
    }

    /// Validate an intent; returns the action to execute, if any.
    pub(crate) fn request(&mut self, intent: Intent) -> Option<Action> {
        let action = match intent {
            Intent::RefreshStatus => Action::RefreshStatus,
            Intent::StartHost => Action::StartHost,
            Intent::StopHost => Action::StopHost,
            Intent::CreateSession => Action::CreateSession,
            Intent::UploadFile { path } => {
                let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
                    self.reject("No file selected");
                    return None;
                };
                Action::UploadFile { path }
            }
            Intent::ScheduleTrack { delay_input } => {
                let delay = parse_delay(&delay_input, self.settings.default_delay_secs);
                let Some(track_url) = self.state.uploaded_url.clone() else {
                    self.reject("No uploaded track URL");
                    return None;
                };
                Action::ScheduleTrack(ScheduleRequest { track_url, delay })
            }
        };

        let kind = action.kind();
        if kind.single_flight() && !self.in_flight.insert(kind) {
            self.reject(format!("{} already in progress", kind.label()));
            return None;
        }
        tracing::debug!(action = kind.label(), "dispatching");
        Some(action)
    }

    /// Fold an outcome into the UI state.
    pub(crate) fn apply(&mut self, outcome: Outcome) -> Option<FollowUp> {
        match outcome {
            Outcome::Status(Ok(status)) => {
                self.state.status_text = render_status(&status);
                self.state.last_status = Some(status);
                None
            }
            Outcome::Status(Err(e)) => {
                self.fail(ActionKind::Status, &e);
                None
            }
            Outcome::Started(result) => {
                if self.settle(ActionKind::Start, result).is_some() {
                    self.append_log("Host started");
                }
                Some(FollowUp::RefreshAfter(self.settings.refresh_delay))
            }
            Outcome::Stopped(result) => {
                if self.settle(ActionKind::Stop, result).is_some() {
                    self.append_log("Host stopped");
                }
                Some(FollowUp::RefreshAfter(self.settings.refresh_delay))
            }
            Outcome::SessionCreated(result) => {
                if let Some(resp) = self.settle(ActionKind::CreateSession, result) {
                    let code = resp.session_code.unwrap_or_default();
                    self.append_log(format!("Session created: {code}"));
                    self.state.session_code = Some(code).filter(|c| !c.is_empty());
                }
                None
            }
            Outcome::Uploaded(result) => {
                if let Some(resp) = self.settle(ActionKind::Upload, result) {
                    let url = resp.url.unwrap_or_default();
                    self.append_log(format!("Uploaded: {url}"));
                    self.set_uploaded_url(url);
                }
                None
            }
            Outcome::Scheduled(result) => {
                if let Some(resp) = self.settle(ActionKind::Schedule, result) {
                    let when = resp
                        .start_at
                        .filter(|secs| secs.is_finite())
                        .and_then(|secs| local_time_of_millis((secs * 1000.0).round() as i64))
                        .unwrap_or_else(|| "unknown time".to_string());
                    self.append_log(format!("Scheduled to start at {when}"));
                }
                None
            }
        }
    }

    /// Clear the in-flight mark and log failures; yields successful responses.
    fn settle<R: ActionResult>(&mut self, kind: ActionKind, result: Result<R, String>) -> Option<R> {
        self.in_flight.remove(&kind);
        match result {
            Ok(resp) if resp.succeeded() => Some(resp),
            Ok(resp) => {
                let reason = resp.failure_reason().to_string();
                self.fail(kind, &reason);
                None
            }
            Err(e) => {
                tracing::warn!(action = kind.label(), error = %e, "request failed");
                self.fail(kind, &e);
                None
            }
        }
    }

    fn fail(&mut self, kind: ActionKind, reason: &str) {
        self.failures += 1;
        self.append_log(format!("{} failed: {reason}", kind.label()));
    }

    fn reject(&mut self, message: impl Into<String>) {
        self.failures += 1;
        self.append_log(message);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{Local, TimeZone};
    use hive_types::{
        ScheduleResponse, SessionCreateResponse, StartResponse, StopResponse, UploadResponse,
    };

    use super::*;
    use crate::log_panel::local_time;

    fn controller() -> Controller {
        Controller::new(ControllerSettings {
            refresh_delay: Duration::from_millis(500),
            default_delay_secs: 3.0,
            log_capacity: 100,
        })
    }

    fn latest(c: &Controller) -> String {
        c.state().log.entries().next().map(|e| e.message.clone()).unwrap_or_default()
    }

    #[test]
    fn status_renders_fixed_template() {
        let mut c = controller();
        c.apply(Outcome::Status(Ok(HostStatus {
            running: true,
            session_code: Some("ABCD".into()),
            node_count: 3,
        })));
        assert_eq!(c.state().status_text, "Running: true\nSession: ABCD\nNodes: 3");

        c.apply(Outcome::Status(Ok(HostStatus::default())));
        assert_eq!(c.state().status_text, "Running: false\nSession: -\nNodes: 0");

        c.apply(Outcome::Status(Ok(HostStatus {
            running: true,
            session_code: Some(String::new()),
            node_count: 1,
        })));
        assert_eq!(c.state().status_text, "Running: true\nSession: -\nNodes: 1");
    }

    #[test]
    fn failed_refresh_keeps_previous_status_text() {
        let mut c = controller();
        c.apply(Outcome::Status(Ok(HostStatus::default())));
        c.apply(Outcome::Status(Err("timed out".into())));
        assert_eq!(c.state().status_text, "Running: false\nSession: -\nNodes: 0");
        assert_eq!(latest(&c), "Status refresh failed: timed out");
    }

    #[test]
    fn start_and_stop_always_refresh_once_after_delay() {
        let refresh = Some(FollowUp::RefreshAfter(Duration::from_millis(500)));
        let outcomes = [
            Outcome::Started(Ok(StartResponse { started: true, reason: None })),
            Outcome::Started(Ok(StartResponse { started: false, reason: Some("already running".into()) })),
            Outcome::Started(Err("connection refused".into())),
            Outcome::Stopped(Ok(StopResponse { stopped: true, reason: None })),
            Outcome::Stopped(Ok(StopResponse { stopped: false, reason: None })),
        ];
        for outcome in outcomes {
            let mut c = controller();
            assert_eq!(c.apply(outcome), refresh);
        }
    }

    #[test]
    fn start_messages_follow_outcome() {
        let mut c = controller();
        c.apply(Outcome::Started(Ok(StartResponse { started: true, reason: None })));
        assert_eq!(latest(&c), "Host started");
        c.apply(Outcome::Started(Ok(StartResponse {
            started: false,
            reason: Some("already running".into()),
        })));
        assert_eq!(latest(&c), "Start failed: already running");
        c.apply(Outcome::Stopped(Ok(StopResponse { stopped: true, reason: None })));
        assert_eq!(latest(&c), "Host stopped");
    }

    #[test]
    fn failures_without_reason_say_unknown() {
        let mut c = controller();
        c.apply(Outcome::Stopped(Ok(StopResponse::default())));
        assert_eq!(latest(&c), "Stop failed: unknown");
        c.apply(Outcome::SessionCreated(Ok(SessionCreateResponse::default())));
        assert_eq!(latest(&c), "Create session failed: unknown");
        c.apply(Outcome::Uploaded(Ok(UploadResponse::default())));
        assert_eq!(latest(&c), "Upload failed: unknown");
        c.apply(Outcome::Scheduled(Ok(ScheduleResponse::default())));
        assert_eq!(latest(&c), "Schedule failed: unknown");
        assert_eq!(c.failures(), 4);
    }

    #[test]
    fn session_code_is_stored_and_logged() {
        let mut c = controller();
        c.apply(Outcome::SessionCreated(Ok(SessionCreateResponse {
            ok: true,
            session_code: Some("XK42".into()),
            reason: None,
        })));
        assert_eq!(c.state().session_code.as_deref(), Some("XK42"));
        assert_eq!(latest(&c), "Session created: XK42");
    }

    #[test]
    fn upload_without_file_is_rejected_locally() {
        let mut c = controller();
        assert_eq!(c.request(Intent::UploadFile { path: None }), None);
        assert_eq!(latest(&c), "No file selected");
        assert_eq!(c.request(Intent::UploadFile { path: Some(PathBuf::new()) }), None);
        assert!(!c.is_in_flight(ActionKind::Upload));
    }

    #[test]
    fn successful_upload_feeds_schedule() {
        let mut c = controller();
        let action = c.request(Intent::UploadFile {
            path: Some(PathBuf::from("/tmp/song.mp3")),
        });
        assert_eq!(action, Some(Action::UploadFile { path: PathBuf::from("/tmp/song.mp3") }));
        c.apply(Outcome::Uploaded(Ok(UploadResponse {
            ok: true,
            url: Some("http://host/uploads/song.mp3".into()),
            reason: None,
        })));
        assert_eq!(latest(&c), "Uploaded: http://host/uploads/song.mp3");

        let action = c.request(Intent::ScheduleTrack { delay_input: "1.5".into() });
        assert_eq!(
            action,
            Some(Action::ScheduleTrack(ScheduleRequest {
                track_url: "http://host/uploads/song.mp3".into(),
                delay: 1.5,
            }))
        );
    }

    #[test]
    fn schedule_without_upload_is_rejected_locally() {
        let mut c = controller();
        assert_eq!(c.request(Intent::ScheduleTrack { delay_input: "5".into() }), None);
        assert_eq!(latest(&c), "No uploaded track URL");
    }

    #[test]
    fn empty_or_invalid_delay_defaults_to_three_seconds() {
        assert_eq!(parse_delay("", 3.0), 3.0);
        assert_eq!(parse_delay("   ", 3.0), 3.0);
        assert_eq!(parse_delay("soon", 3.0), 3.0);
        assert_eq!(parse_delay("NaN", 3.0), 3.0);
        assert_eq!(parse_delay("-2", 3.0), 3.0);
        assert_eq!(parse_delay(" 0.25 ", 3.0), 0.25);

        let mut c = controller();
        c.set_uploaded_url("http://host/t.mp3");
        let action = c.request(Intent::ScheduleTrack { delay_input: String::new() });
        assert!(matches!(action, Some(Action::ScheduleTrack(ref r)) if r.delay == 3.0));
    }

    #[test]
    fn schedule_logs_local_start_time() {
        let mut c = controller();
        c.apply(Outcome::Scheduled(Ok(ScheduleResponse {
            ok: true,
            start_at: Some(1_700_000_000.0),
            reason: None,
        })));
        let expected = local_time(&Local.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert_eq!(latest(&c), format!("Scheduled to start at {expected}"));
    }

    #[test]
    fn second_trigger_while_in_flight_is_rejected() {
        let mut c = controller();
        assert_eq!(c.request(Intent::StartHost), Some(Action::StartHost));
        assert_eq!(c.request(Intent::StartHost), None);
        assert_eq!(latest(&c), "Start already in progress");

        c.apply(Outcome::Started(Err("timed out".into())));
        assert_eq!(c.request(Intent::StartHost), Some(Action::StartHost));
    }

    #[test]
    fn status_refreshes_may_overlap() {
        let mut c = controller();
        assert_eq!(c.request(Intent::RefreshStatus), Some(Action::RefreshStatus));
        assert_eq!(c.request(Intent::RefreshStatus), Some(Action::RefreshStatus));
    }
}
