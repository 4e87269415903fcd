use std::{fs::OpenOptions, path::Path};

use serde::Serialize;
use thiserror::Error;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{FormatFields, format::Writer},
    layer::{Context, SubscriberExt},
    util::SubscriberInitExt,
};

pub const DEFAULT_LOG_FILTER: &str = "info,lightning_tools=debug";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to install logger: {0}")]
    Init(String),
}

/// Receives every INFO-and-above log line.
pub trait Logger: Send + Sync {
    fn log(&self, l: LogEntry);
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub line: String,
    pub level: String,
}

pub(crate) struct ForwardingLogger {
    pub(crate) log_listener: Option<Box<dyn Logger>>,
}

impl<S> Layer<S> for ForwardingLogger
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().level() > &Level::INFO {
            return;
        }
        let Some(listener) = self.log_listener.as_ref() else {
            return;
        };
        let mut buf = String::new();
        let writer = Writer::new(&mut buf);
        if tracing_subscriber::fmt::format::DefaultFields::new()
            .format_fields(writer, event)
            .is_ok()
        {
            listener.log(LogEntry {
                line: buf,
                level: event.metadata().level().to_string(),
            });
        }
    }
}

/// Installs the global subscriber. Logs go to `log_file` when given, stdout
/// otherwise.
pub fn init_logging(
    log_file: Option<&Path>,
    app_logger: Option<Box<dyn Logger>>,
    log_filter: Option<String>,
) -> Result<(), LoggingError> {
    let filter = EnvFilter::new(log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER));
    let forwarder = ForwardingLogger {
        log_listener: app_logger,
    };

    let registry = tracing_subscriber::registry().with(filter).with(forwarder);
    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_line_number(true)
                        .with_writer(file),
                )
                .try_init()
        }
        None => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))
}
