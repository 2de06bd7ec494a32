//! Typed messages flowing between the UI, the controller and the dispatcher.
//!
//! - `Intent`: what the operator asked for (button/key/subcommand).
//! - `Action`: a validated request the dispatcher executes against `HostApi`.
//! - `Outcome`: the result of an `Action`, applied back on the UI thread.
//! - `FollowUp`: extra work the controller schedules after applying an outcome.

use std::path::PathBuf;
use std::time::Duration;

use hive_types::{
    HostStatus, ScheduleRequest, ScheduleResponse, SessionCreateResponse, StartResponse,
    StopResponse, UploadResponse,
};

use crate::server_api::{HostApi, TrackUpload};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Intent {
    RefreshStatus,
    StartHost,
    StopHost,
    CreateSession,
    /// `None` (or an empty path) means nothing was selected.
    UploadFile { path: Option<PathBuf> },
    /// Raw text of the delay input.
    ScheduleTrack { delay_input: String },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Action {
    RefreshStatus,
    StartHost,
    StopHost,
    CreateSession,
    UploadFile { path: PathBuf },
    ScheduleTrack(ScheduleRequest),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ActionKind {
    Status,
    Start,
    Stop,
    CreateSession,
    Upload,
    Schedule,
}

impl ActionKind {
    /// Prefix used in operator-facing log lines.
    pub(crate) fn label(self) -> &'static str {
        match self {
            ActionKind::Status => "Status refresh",
            ActionKind::Start => "Start",
            ActionKind::Stop => "Stop",
            ActionKind::CreateSession => "Create session",
            ActionKind::Upload => "Upload",
            ActionKind::Schedule => "Schedule",
        }
    }

    /// Whether a second trigger is rejected while one is in flight.
    pub(crate) fn single_flight(self) -> bool {
        !matches!(self, ActionKind::Status)
    }
}

impl Action {
    pub(crate) fn kind(&self) -> ActionKind {
        match self {
            Action::RefreshStatus => ActionKind::Status,
            Action::StartHost => ActionKind::Start,
            Action::StopHost => ActionKind::Stop,
            Action::CreateSession => ActionKind::CreateSession,
            Action::UploadFile { .. } => ActionKind::Upload,
            Action::ScheduleTrack(_) => ActionKind::Schedule,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Outcome {
    Status(Result<HostStatus, String>),
    Started(Result<StartResponse, String>),
    Stopped(Result<StopResponse, String>),
    SessionCreated(Result<SessionCreateResponse, String>),
    Uploaded(Result<UploadResponse, String>),
    Scheduled(Result<ScheduleResponse, String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FollowUp {
    RefreshAfter(Duration),
}

/// Execute one action, blocking until the backend answers.
pub(crate) fn perform(api: &dyn HostApi, action: Action) -> Outcome {
    fn flat<T>(r: anyhow::Result<T>) -> Result<T, String> {
        r.map_err(|e| format!("{e:#}"))
    }

    match action {
        Action::RefreshStatus => Outcome::Status(flat(api.status())),
        Action::StartHost => Outcome::Started(flat(api.start())),
        Action::StopHost => Outcome::Stopped(flat(api.stop())),
        Action::CreateSession => Outcome::SessionCreated(flat(api.create_session())),
        Action::UploadFile { path } => {
            let result = TrackUpload::from_path(&path).and_then(|upload| {
                tracing::info!(file = %upload.file_name, bytes = upload.bytes.len(), "uploading track");
                api.upload(&upload)
            });
            Outcome::Uploaded(flat(result))
        }
        Action::ScheduleTrack(request) => {
            tracing::info!(track_url = %request.track_url, delay = request.delay, "scheduling track");
            Outcome::Scheduled(flat(api.schedule(&request)))
        }
    }
}
