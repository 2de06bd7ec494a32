//! Non-interactive subcommands: run one intent, print the log, exit.

use std::io::Write;

use anyhow::{Context, Result};

use crate::actions::{FollowUp, Intent, perform};
use crate::cli::Command;
use crate::controller::Controller;
use crate::server_api::HostApi;

/// Run one intent synchronously, following up exactly like the TUI would.
pub(crate) fn run_intent(controller: &mut Controller, api: &dyn HostApi, intent: Intent) {
    let mut next = controller.request(intent);
    while let Some(action) = next.take() {
        let outcome = perform(api, action);
        if let Some(FollowUp::RefreshAfter(delay)) = controller.apply(outcome) {
            std::thread::sleep(delay);
            next = controller.request(Intent::RefreshStatus);
        }
    }
}

fn intent_for(controller: &mut Controller, cmd: &Command) -> Option<Intent> {
    let intent = match cmd {
        Command::Tui => return None,
        Command::Status => Intent::RefreshStatus,
        Command::Start => Intent::StartHost,
        Command::Stop => Intent::StopHost,
        Command::Session => Intent::CreateSession,
        Command::Upload { path } => Intent::UploadFile {
            path: Some(path.clone()),
        },
        Command::Schedule { track_url, delay } => {
            if let Some(url) = track_url {
                controller.set_uploaded_url(url.clone());
            }
            Intent::ScheduleTrack {
                delay_input: delay.clone().unwrap_or_default(),
            }
        }
    };
    Some(intent)
}

/// Execute a subcommand and write its report to `out`; returns `true` on success.
pub(crate) fn run(
    controller: &mut Controller,
    api: &dyn HostApi,
    cmd: &Command,
    out: &mut dyn Write,
) -> Result<bool> {
    let Some(intent) = intent_for(controller, cmd) else {
        return Ok(true);
    };
    let failures_before = controller.failures();
    run_intent(controller, api, intent);

    let state = controller.state();
    for entry in state.log.entries().rev() {
        writeln!(out, "{}", entry.line()).context("write output")?;
    }
    if matches!(cmd, Command::Status | Command::Start | Command::Stop) && state.last_status.is_some() {
        writeln!(out, "{}", state.status_text).context("write output")?;
    }
    Ok(controller.failures() == failures_before)
}
