//! Runs controller actions off the UI thread.
//!
//! Each action gets its own short-lived thread so a slow request never blocks
//! another one; results come back over a channel and are applied by whoever
//! owns the `Controller`.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::actions::{Action, FollowUp, Intent, Outcome, perform};
use crate::controller::Controller;
use crate::server_api::HostApi;

const POLL_BACKOFF_MAX: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub(crate) struct Dispatcher {
    api: Arc<dyn HostApi>,
    outcome_tx: Sender<Outcome>,
}

impl Dispatcher {
    pub(crate) fn new(api: Arc<dyn HostApi>) -> (Self, Receiver<Outcome>) {
        let (outcome_tx, outcome_rx) = unbounded();
        (Self { api, outcome_tx }, outcome_rx)
    }

    /// Validate an intent against the controller and run the resulting action.
    pub(crate) fn dispatch(&self, controller: &mut Controller, intent: Intent) {
        if let Some(action) = controller.request(intent) {
            self.submit(action);
        }
    }

    /// Apply every outcome that has arrived so far, scheduling follow-ups.
    pub(crate) fn drain(&self, controller: &mut Controller, outcome_rx: &Receiver<Outcome>) {
        while let Ok(outcome) = outcome_rx.try_recv() {
            if let Some(follow_up) = controller.apply(outcome) {
                self.follow_up(follow_up);
            }
        }
    }

    pub(crate) fn submit(&self, action: Action) {
        self.spawn(action, None);
    }

    pub(crate) fn follow_up(&self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::RefreshAfter(delay) => self.spawn(Action::RefreshStatus, Some(delay)),
        }
    }

    fn spawn(&self, action: Action, delay: Option<Duration>) {
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        std::thread::spawn(move || {
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
            let _ = tx.send(perform(api.as_ref(), action));
        });
    }

    /// Poll status every `interval`, backing off while the backend is unreachable.
    ///
    /// Failed polls are not reported as outcomes; the log would fill up with
    /// identical lines while the backend is down.
    pub(crate) fn spawn_status_poller(&self, interval: Duration) {
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        std::thread::spawn(move || {
            let mut delay = interval;
            loop {
                std::thread::sleep(delay);
                match api.status() {
                    Ok(status) => {
                        delay = interval;
                        if tx.send(Outcome::Status(Ok(status))).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %format!("{e:#}"), "status poll failed");
                        delay = next_backoff(delay, interval);
                    }
                }
            }
        });
    }
}

fn next_backoff(current: Duration, interval: Duration) -> Duration {
    (current * 2).min(POLL_BACKOFF_MAX.max(interval))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use hive_types::{HostStatus, StartResponse};

    use super::*;
    use crate::controller::ControllerSettings;
    use crate::server_api::testing::FakeHostApi;

    fn controller(refresh_ms: u64) -> Controller {
        Controller::new(ControllerSettings {
            refresh_delay: Duration::from_millis(refresh_ms),
            default_delay_secs: 3.0,
            log_capacity: 50,
        })
    }

    fn wait_for(
        dispatcher: &Dispatcher,
        c: &mut Controller,
        rx: &Receiver<Outcome>,
        done: impl Fn(&Controller) -> bool,
    ) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(c) {
            assert!(Instant::now() < deadline, "timed out waiting for outcome");
            dispatcher.drain(c, rx);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn start_triggers_one_delayed_status_refresh() {
        let api = Arc::new(FakeHostApi::default());
        *api.start.lock().unwrap() = Some(StartResponse { started: true, reason: None });
        *api.status.lock().unwrap() = Some(HostStatus {
            running: true,
            session_code: None,
            node_count: 0,
        });
        let (dispatcher, rx) = Dispatcher::new(api.clone());
        let mut c = controller(40);

        let started = Instant::now();
        dispatcher.dispatch(&mut c, Intent::StartHost);
        wait_for(&dispatcher, &mut c, &rx, |c| c.state().last_status.is_some());

        assert!(started.elapsed() >= Duration::from_millis(40));
        assert_eq!(api.status_requests(), 1);
        assert_eq!(c.state().status_text, "Running: true\nSession: -\nNodes: 0");
        let messages: Vec<_> = c.state().log.entries().map(|e| e.message.clone()).collect();
        assert_eq!(messages, ["Host started"]);
    }

    #[test]
    fn failed_start_still_refreshes() {
        let api = Arc::new(FakeHostApi::default());
        let (dispatcher, rx) = Dispatcher::new(api.clone());
        let mut c = controller(10);

        dispatcher.dispatch(&mut c, Intent::StartHost);
        wait_for(&dispatcher, &mut c, &rx, |c| c.state().log.len() >= 2);

        assert_eq!(api.status_requests(), 1);
        let messages: Vec<_> = c.state().log.entries().map(|e| e.message.clone()).collect();
        assert_eq!(
            messages,
            ["Status refresh failed: connection refused", "Start failed: connection refused"]
        );
    }

    #[test]
    fn rejected_intent_issues_no_request() {
        let api = Arc::new(FakeHostApi::default());
        let (dispatcher, rx) = Dispatcher::new(api.clone());
        let mut c = controller(10);

        dispatcher.dispatch(&mut c, Intent::UploadFile { path: None });
        dispatcher.dispatch(&mut c, Intent::ScheduleTrack { delay_input: String::new() });
        std::thread::sleep(Duration::from_millis(50));
        dispatcher.drain(&mut c, &rx);

        assert_eq!(api.requests(), 0);
        assert_eq!(c.state().log.len(), 2);
    }

    #[test]
    fn poller_reports_status_updates() {
        let api = Arc::new(FakeHostApi::default());
        *api.status.lock().unwrap() = Some(HostStatus {
            running: false,
            session_code: Some("Q1".into()),
            node_count: 2,
        });
        let (dispatcher, rx) = Dispatcher::new(api.clone());
        let mut c = controller(10);

        dispatcher.spawn_status_poller(Duration::from_millis(10));
        wait_for(&dispatcher, &mut c, &rx, |c| c.state().last_status.is_some());
        assert_eq!(c.state().status_text, "Running: false\nSession: Q1\nNodes: 2");
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let interval = Duration::from_millis(250);
        assert_eq!(next_backoff(interval, interval), Duration::from_millis(500));
        assert_eq!(next_backoff(Duration::from_millis(1500), interval), POLL_BACKOFF_MAX);
        let slow = Duration::from_secs(5);
        assert_eq!(next_backoff(slow, slow), slow);
    }
}
