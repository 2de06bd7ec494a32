//! Ratatui front end.
//!
//! Keys:
//! - s: start host
//! - x: stop host
//! - c: create session
//! - f: edit file path (Enter uploads)
//! - d: edit delay (Enter keeps it)
//! - p: schedule uploaded track
//! - r: refresh status
//! - Up/Down: scroll log
//! - l: diagnostics
//! - q: quit

mod app;
mod render;
mod view_model;
mod widgets;

pub(crate) use app::run_tui;

/// Named regions and controls of the console screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ElementId {
    Status,
    Log,
    Start,
    Stop,
    CreateSession,
    SessionCode,
    UploadForm,
    File,
    UploadedUrl,
    Schedule,
    Delay,
}

impl ElementId {
    /// Controls reachable from the keyboard, in key-hint order.
    pub(crate) const CONTROLS: [ElementId; 7] = [
        ElementId::Start,
        ElementId::Stop,
        ElementId::CreateSession,
        ElementId::File,
        ElementId::Delay,
        ElementId::Schedule,
        ElementId::Status,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ElementId::Status => "Status",
            ElementId::Log => "Log",
            ElementId::Start => "start",
            ElementId::Stop => "stop",
            ElementId::CreateSession => "create session",
            ElementId::SessionCode => "session",
            ElementId::UploadForm => "Upload",
            ElementId::File => "file",
            ElementId::UploadedUrl => "track",
            ElementId::Schedule => "schedule",
            ElementId::Delay => "delay (s)",
        }
    }

    pub(crate) fn key(self) -> Option<char> {
        match self {
            ElementId::Start => Some('s'),
            ElementId::Stop => Some('x'),
            ElementId::CreateSession => Some('c'),
            ElementId::File => Some('f'),
            ElementId::Delay => Some('d'),
            ElementId::Schedule => Some('p'),
            ElementId::Status => Some('r'),
            _ => None,
        }
    }

    pub(crate) fn from_key(c: char) -> Option<Self> {
        Self::CONTROLS.into_iter().find(|el| el.key() == Some(c))
    }
}
