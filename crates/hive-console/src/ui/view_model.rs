//! Converts `App` state into render-ready strings so `render.rs` stays
//! layout-focused.

use crate::actions::ActionKind;

use super::ElementId;
use super::app::{App, InputField};

pub(crate) struct UiView {
    pub(crate) header: String,
    pub(crate) status_title: String,
    pub(crate) status_body: String,
    pub(crate) session_body: String,
    pub(crate) file_title: String,
    pub(crate) file_line: String,
    pub(crate) delay_title: String,
    pub(crate) delay_line: String,
    pub(crate) log_title: String,
    pub(crate) log_lines: Vec<String>,
    pub(crate) keys_line: String,
    pub(crate) diagnostics: Option<Vec<String>>,
}

impl UiView {
    pub(crate) fn from_app(app: &App) -> Self {
        let state = app.controller.state();
        let session_body = format!(
            "{}: {}\n{}: {}",
            ElementId::SessionCode.label(),
            state.session_code.as_deref().unwrap_or("-"),
            ElementId::UploadedUrl.label(),
            state.uploaded_url.as_deref().unwrap_or("-"),
        );

        Self {
            header: format!("hive-console  →  {}", app.server),
            status_title: ElementId::Status.label().to_string(),
            status_body: state.status_text.clone(),
            session_body,
            file_title: title_with_busy(
                &format!("{} {}", ElementId::UploadForm.label(), ElementId::File.label()),
                app,
                ActionKind::Upload,
            ),
            file_line: input_line(&app.file_input, app.editing == Some(InputField::File)),
            delay_title: title_with_busy(ElementId::Delay.label(), app, ActionKind::Schedule),
            delay_line: input_line(&app.delay_input, app.editing == Some(InputField::Delay)),
            log_title: build_log_title(app),
            log_lines: state
                .log
                .text()
                .lines()
                .skip(app.log_scroll)
                .map(str::to_string)
                .collect(),
            keys_line: build_keys_line(app),
            diagnostics: app
                .diagnostics_open
                .then(|| app.diagnostics.iter().rev().cloned().collect()),
        }
    }
}

fn title_with_busy(title: &str, app: &App, kind: ActionKind) -> String {
    if app.controller.is_in_flight(kind) {
        format!("{title} (working…)")
    } else {
        title.to_string()
    }
}

fn input_line(value: &str, editing: bool) -> String {
    if editing {
        format!("{value}▏")
    } else if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn build_log_title(app: &App) -> String {
    let label = ElementId::Log.label();
    if app.log_scroll == 0 {
        label.to_string()
    } else {
        format!("{label} (scrolled {} back, ↓ for newer)", app.log_scroll)
    }
}

fn build_keys_line(app: &App) -> String {
    if app.editing.is_some() {
        return "keys: type to edit | Enter confirm | Esc cancel".to_string();
    }
    let mut parts: Vec<String> = ElementId::CONTROLS
        .iter()
        .filter_map(|el| {
            let key = el.key()?;
            let label = match el {
                ElementId::Status => "refresh",
                other => other.label(),
            };
            Some(format!("{key} {label}"))
        })
        .collect();
    parts.push("↑/↓ scroll log".into());
    parts.push("l diagnostics".into());
    parts.push("q quit".into());
    format!("keys: {}", parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::unbounded;
    use hive_types::HostStatus;

    use super::*;
    use crate::actions::{Intent, Outcome};
    use crate::controller::{Controller, ControllerSettings};

    fn app() -> App {
        let (_tx, rx) = unbounded::<String>();
        App::new(
            "http://hive:5000".into(),
            Controller::new(ControllerSettings {
                refresh_delay: Duration::from_millis(500),
                default_delay_secs: 3.0,
                log_capacity: 100,
            }),
            rx,
        )
    }

    #[test]
    fn status_body_is_controller_text() {
        let mut app = app();
        app.controller.apply(Outcome::Status(Ok(HostStatus {
            running: true,
            session_code: None,
            node_count: 4,
        })));
        let view = UiView::from_app(&app);
        assert_eq!(view.status_body, "Running: true\nSession: -\nNodes: 4");
        assert_eq!(view.session_body, "session: -\ntrack: -");
    }

    #[test]
    fn keys_line_lists_every_control() {
        let view = UiView::from_app(&app());
        assert_eq!(
            view.keys_line,
            "keys: s start | x stop | c create session | f file | d delay (s) | p schedule | r refresh | ↑/↓ scroll log | l diagnostics | q quit"
        );
    }

    #[test]
    fn in_flight_action_marks_panel() {
        let mut app = app();
        app.controller.set_uploaded_url("http://hive/t.mp3");
        app.controller.request(Intent::ScheduleTrack { delay_input: String::new() });
        let view = UiView::from_app(&app);
        assert_eq!(view.delay_title, "delay (s) (working…)");
    }

    #[test]
    fn scrolled_log_skips_newest_lines() {
        let mut app = app();
        app.controller.append_log("first");
        app.controller.append_log("second");
        app.log_scroll = 1;
        let view = UiView::from_app(&app);
        assert_eq!(view.log_lines.len(), 1);
        assert!(view.log_lines[0].ends_with(": first"));
        assert!(view.log_title.contains("scrolled 1 back"));
    }
}
