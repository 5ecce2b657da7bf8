use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::{DateTime, Local};
use std::fmt;
use std::io::Write;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Context as LayerContext, Layer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One diagnostic entry, with the optional error sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub message: String,
    pub exception: Option<String>,
    pub stack_trace: Option<String>,
    pub inner_exception: Option<String>,
}

/// Render a record as written to the log file, trailing blank line included.
///
/// ```text
/// [2024-05-01 13:45:00] Export failed
/// Exception: Failed to write out.json
/// Stack Trace: Failed to write out.json ...
/// Inner Exception: Permission denied (os error 13)
/// ```
pub fn format_record(timestamp: &DateTime<Local>, record: &DiagnosticRecord) -> String {
    let mut out = format!("[{}] {}\n", timestamp.format(TIMESTAMP_FORMAT), record.message);

    if let Some(exception) = &record.exception {
        out.push_str(&format!("Exception: {}\n", exception));
        out.push_str(&format!(
            "Stack Trace: {}\n",
            record.stack_trace.as_deref().unwrap_or_default()
        ));
        if let Some(inner) = &record.inner_exception {
            out.push_str(&format!("Inner Exception: {}\n", inner));
        }
    }

    out.push('\n');
    out
}

#[derive(Default)]
struct RecordVisitor {
    record: DiagnosticRecord,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{:?}", value));
    }
}

impl RecordVisitor {
    fn store(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.record.message = value,
            "exception" => self.record.exception = Some(value),
            "stack_trace" => self.record.stack_trace = Some(value),
            "inner_exception" => self.record.inner_exception = Some(value),
            other => {
                if !self.record.message.is_empty() {
                    self.record.message.push(' ');
                }
                self.record.message.push_str(&format!("{}={}", other, value));
            }
        }
    }
}

/// Layer appending every event to the diagnostics log and echoing it to stdout.
///
/// Write failures are ignored. Without a log file the layer only echoes.
pub struct DiagnosticsLayer {
    file: Option<Mutex<RollingFileAppender>>,
    echo: bool,
}

impl DiagnosticsLayer {
    /// Open `log_file` for appending. Missing parent folders are created.
    pub fn open(log_file: &Utf8Path, echo: bool) -> Result<Self> {
        let file_name = log_file
            .file_name()
            .with_context(|| format!("Log path has no file name: {}", log_file))?;
        let folder = match log_file.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(folder)
            .with_context(|| format!("Failed to open log file: {}", log_file))?;

        Ok(Self {
            file: Some(Mutex::new(appender)),
            echo,
        })
    }

    pub fn stdout_only() -> Self {
        Self {
            file: None,
            echo: true,
        }
    }

    fn emit(&self, text: &str) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(text.as_bytes());
                let _ = file.flush();
            }
        }

        if self.echo {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);
        self.emit(&format_record(&Local::now(), &visitor.record));
    }
}

/// Setup the diagnostics log for the process.
///
/// `RUST_LOG` wins when set; otherwise `debug_mode` selects debug or info.
/// An unusable log file falls back to stdout only.
pub fn setup_logging(log_file: &Utf8Path, debug_mode: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let (layer, open_error) = match DiagnosticsLayer::open(log_file, true) {
        Ok(layer) => (layer, None),
        Err(e) => (DiagnosticsLayer::stdout_only(), Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .context("Failed to install the diagnostics subscriber")?;

    if let Some(e) = open_error {
        tracing::warn!("Logging to stdout only: {:#}", e);
    }
    tracing::debug!("Logging initialized: file={}, debug={}", log_file, debug_mode);

    Ok(())
}

/// Record `message` with `error` attached as the exception sections.
pub fn log_failure(message: &str, error: &anyhow::Error) {
    match error.chain().nth(1) {
        Some(cause) => tracing::error!(
            exception = %error,
            stack_trace = ?error,
            inner_exception = %cause,
            "{}",
            message
        ),
        None => tracing::error!(exception = %error, stack_trace = ?error, "{}", message),
    }
}
