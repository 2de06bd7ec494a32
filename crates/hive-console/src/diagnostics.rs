//! Tracing setup.
//!
//! One-shot commands log to stderr. The TUI owns the terminal, so there tracing
//! events are formatted into lines and forwarded over a channel instead.

use std::fmt;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hive_console=info"))
}

pub(crate) fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Install a subscriber that forwards events as text lines.
pub(crate) fn init_channel() -> Receiver<String> {
    let (tx, rx) = unbounded();
    tracing_subscriber::registry()
        .with(env_filter())
        .with(ChannelLayer::new(tx))
        .init();
    rx
}

pub(crate) struct ChannelLayer {
    tx: Sender<String>,
}

impl ChannelLayer {
    pub(crate) fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for ChannelLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let meta = event.metadata();
        let mut line = format!(
            "{} {}: {}",
            meta.level(),
            meta.target(),
            visitor.message.unwrap_or_default()
        );
        for field in visitor.fields {
            line.push(' ');
            line.push_str(&field);
        }
        let _ = self.tx.send(line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let formatted = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(formatted);
        } else {
            self.fields.push(format!("{}={}", field.name(), formatted));
        }
    }
}
