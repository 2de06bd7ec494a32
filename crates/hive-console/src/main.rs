//! `hive-console` — operator console for a HiveMind host backend.
//!
//! Starts/stops the host, creates sessions, uploads tracks and schedules
//! synchronized playback over the host's HTTP API. Runs as a TUI by default;
//! each operation is also available as a one-shot subcommand.

mod actions;
mod cli;
mod config;
mod controller;
mod diagnostics;
mod dispatch;
mod log_panel;
mod oneshot;
mod server_api;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use crate::cli::Command;
use crate::controller::{Controller, ControllerSettings};
use crate::server_api::{HostApi, HttpHostApi};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    let cmd = args.cmd.clone().unwrap_or(Command::Tui);

    let diag_rx = if cmd == Command::Tui {
        Some(diagnostics::init_channel())
    } else {
        diagnostics::init_stderr();
        None
    };

    let settings = config::load_settings(&args)?;
    tracing::info!(
        server = %settings.server,
        timeout_ms = settings.timeout.as_millis() as u64,
        refresh_delay_ms = settings.refresh_delay.as_millis() as u64,
        "starting hive-console"
    );
    let api: Arc<dyn HostApi> = Arc::new(HttpHostApi::new(&settings.server, settings.timeout));

    match diag_rx {
        Some(diag_rx) => ui::run_tui(&settings, api, diag_rx),
        None => {
            let mut controller = Controller::new(ControllerSettings::from(&settings));
            let mut stdout = std::io::stdout().lock();
            let ok = oneshot::run(&mut controller, api.as_ref(), &cmd, &mut stdout)?;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
