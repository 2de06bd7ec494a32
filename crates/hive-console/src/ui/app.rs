use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::actions::{Intent, Outcome};
use crate::config::Settings;
use crate::controller::{Controller, ControllerSettings};
use crate::dispatch::Dispatcher;
use crate::server_api::HostApi;

use super::ElementId;
use super::render;

const DIAGNOSTICS_CAP: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputField {
    File,
    Delay,
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
pub(crate) enum KeyAction {
    Quit,
    Dispatch(Intent),
}

/// Launch the TUI and drive the event loop until the operator quits.
pub(crate) fn run_tui(
    settings: &Settings,
    api: Arc<dyn HostApi>,
    diag_rx: Receiver<String>,
) -> Result<()> {
    let (dispatcher, outcome_rx) = Dispatcher::new(api);
    let mut app = App::new(
        settings.server.clone(),
        Controller::new(ControllerSettings::from(settings)),
        diag_rx,
    );

    dispatcher.dispatch(&mut app.controller, Intent::RefreshStatus);
    if let Some(interval) = settings.poll_interval {
        tracing::info!(interval_ms = interval.as_millis() as u64, "status polling enabled");
        dispatcher.spawn_status_poller(interval);
    }

    let mut term = init_terminal()?;
    let result = ui_loop(&mut term, &mut app, &dispatcher, &outcome_rx);

    restore_terminal(&mut term)?;
    result
}

/// In-memory UI state for rendering + interaction.
pub(crate) struct App {
    pub(crate) server: String,
    pub(crate) controller: Controller,
    pub(crate) file_input: String,
    pub(crate) delay_input: String,
    pub(crate) editing: Option<InputField>,
    pub(crate) log_scroll: usize,
    pub(crate) diagnostics_open: bool,
    pub(crate) diagnostics: VecDeque<String>,
    diag_rx: Receiver<String>,
}

impl App {
    pub(crate) fn new(server: String, controller: Controller, diag_rx: Receiver<String>) -> Self {
        Self {
            server,
            controller,
            file_input: String::new(),
            delay_input: String::new(),
            editing: None,
            log_scroll: 0,
            diagnostics_open: false,
            diagnostics: VecDeque::new(),
            diag_rx,
        }
    }

    fn drain_diagnostics(&mut self) {
        while let Ok(line) = self.diag_rx.try_recv() {
            if self.diagnostics.len() >= DIAGNOSTICS_CAP {
                self.diagnostics.pop_front();
            }
            self.diagnostics.push_back(line);
        }
    }

    fn scroll_log_older(&mut self) {
        let max = self.controller.state().log.len().saturating_sub(1);
        self.log_scroll = (self.log_scroll + 1).min(max);
    }

    fn scroll_log_newer(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    fn input_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::File => &mut self.file_input,
            InputField::Delay => &mut self.delay_input,
        }
    }

    fn upload_intent(&self) -> Intent {
        let path = self.file_input.trim();
        Intent::UploadFile {
            path: (!path.is_empty()).then(|| PathBuf::from(path)),
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Option<KeyAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(KeyAction::Quit);
        }

        if let Some(field) = self.editing {
            match key.code {
                KeyCode::Esc => self.editing = None,
                KeyCode::Enter => {
                    self.editing = None;
                    if field == InputField::File {
                        return Some(KeyAction::Dispatch(self.upload_intent()));
                    }
                }
                KeyCode::Backspace => {
                    self.input_mut(field).pop();
                }
                KeyCode::Char(c) => self.input_mut(field).push(c),
                _ => {}
            }
            return None;
        }

        if self.diagnostics_open {
            match key.code {
                KeyCode::Char('q') => return Some(KeyAction::Quit),
                KeyCode::Esc | KeyCode::Char('l') => self.diagnostics_open = false,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(KeyAction::Quit),
            KeyCode::Char('l') => self.diagnostics_open = true,
            KeyCode::Up => self.scroll_log_older(),
            KeyCode::Down => self.scroll_log_newer(),
            KeyCode::Char(c) => {
                let intent = match ElementId::from_key(c)? {
                    ElementId::Start => Intent::StartHost,
                    ElementId::Stop => Intent::StopHost,
                    ElementId::CreateSession => Intent::CreateSession,
                    ElementId::Schedule => Intent::ScheduleTrack {
                        delay_input: self.delay_input.clone(),
                    },
                    ElementId::Status => Intent::RefreshStatus,
                    ElementId::File => {
                        self.editing = Some(InputField::File);
                        return None;
                    }
                    ElementId::Delay => {
                        self.editing = Some(InputField::Delay);
                        return None;
                    }
                    _ => return None,
                };
                return Some(KeyAction::Dispatch(intent));
            }
            _ => {}
        }
        None
    }
}

fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    outcome_rx: &Receiver<Outcome>,
) -> Result<()> {
    let tick = Duration::from_millis(33);

    loop {
        dispatcher.drain(&mut app.controller, outcome_rx);
        app.drain_diagnostics();
        terminal.draw(|f| render::draw(f, app))?;

        if !event::poll(tick).context("poll terminal events")? {
            continue;
        }
        let CEvent::Key(key) = event::read().context("read terminal event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.handle_key(key) {
            Some(KeyAction::Quit) => return Ok(()),
            Some(KeyAction::Dispatch(intent)) => {
                let before = app.controller.state().log.len();
                dispatcher.dispatch(&mut app.controller, intent);
                if app.controller.state().log.len() != before {
                    app.log_scroll = 0;
                }
            }
            None => {}
        }
    }
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    Ok(())
}
