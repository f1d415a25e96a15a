use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Initialize logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers = Vec::new();

    // Console layer
    if config.console_enabled {
        let console_layer = fmt::layer()
            .with_target(config.include_targets)
            .with_writer(std::io::stdout)
            .boxed();

        layers.push(console_layer);
    }

    // File layer
    if config.file_enabled {
        std::fs::create_dir_all(&config.log_directory)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("kijiji-autos")
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(&config.log_directory)?;

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(config.include_targets)
            .with_writer(file_appender)
            .boxed();

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    debug!("Log level: {}", config.level);
    if config.file_enabled {
        info!("Log directory: {}", config.log_directory.display());
    }

    Ok(())
}

/// Structured logging context
#[derive(Debug, Clone, Serialize)]
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub run_id: Option<String>,
    pub url: Option<String>,
    pub duration_ms: Option<u64>,
    pub status: Option<String>,
    pub error_category: Option<String>,
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl LogContext {
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            run_id: None,
            url: None,
            duration_ms: None,
            status: None,
            error_category: None,
            additional_fields: HashMap::new(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, duration: std::time::Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_error_category(mut self, category: impl Into<String>) -> Self {
        self.error_category = Some(category.into());
        self
    }

    pub fn with_string_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_fields.insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    pub fn with_number_field(mut self, key: impl Into<String>, value: impl Into<i64>) -> Self {
        self.additional_fields.insert(key.into(), serde_json::Value::Number(serde_json::Number::from(value.into())));
        self
    }
}

/// Structured logging macros
#[macro_export]
macro_rules! log_info {
    ($context:expr, $($arg:tt)+) => {
        tracing::info!(
            component = %$context.component,
            operation = %$context.operation,
            run_id = ?$context.run_id,
            url = ?$context.url,
            duration_ms = ?$context.duration_ms,
            status = ?$context.status,
            additional_fields = ?$context.additional_fields,
            $($arg)+
        );
    };
}

#[macro_export]
macro_rules! log_warn {
    ($context:expr, $($arg:tt)+) => {
        tracing::warn!(
            component = %$context.component,
            operation = %$context.operation,
            run_id = ?$context.run_id,
            url = ?$context.url,
            error_category = ?$context.error_category,
            additional_fields = ?$context.additional_fields,
            $($arg)+
        );
    };
}

#[macro_export]
macro_rules! log_error {
    ($context:expr, $($arg:tt)+) => {
        tracing::error!(
            component = %$context.component,
            operation = %$context.operation,
            run_id = ?$context.run_id,
            url = ?$context.url,
            error_category = ?$context.error_category,
            additional_fields = ?$context.additional_fields,
            $($arg)+
        );
    };
}

/// Measures a phase of the run and logs its duration when finished
pub struct PerformanceLogger {
    context: LogContext,
    start_time: std::time::Instant,
}

impl PerformanceLogger {
    pub fn new(context: LogContext) -> Self {
        Self {
            context,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn finish(self, message: &str) {
        self.finish_with_status(message, true)
    }

    pub fn finish_with_status(self, message: &str, success: bool) {
        let duration = self.start_time.elapsed();
        let context = self
            .context
            .with_duration(duration)
            .with_status(if success { "success" } else { "failed" });

        if success {
            crate::log_info!(context, "{}", message);
        } else {
            crate::log_warn!(context, "{}", message);
        }
    }
}

/// Identifier attached to every log line of one scraping run
pub struct RunIdGenerator;

impl RunIdGenerator {
    pub fn generate() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = chrono::Utc::now().timestamp_millis();
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        format!("run-{}-{:04}", timestamp, counter % 10000)
    }
}


/// In-memory log sink for asserting on console output in tests
#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::subscriber::DefaultGuard;

    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        /// Route this thread's events here until the guard drops
        pub(crate) fn start() -> (Self, DefaultGuard) {
            let logs = Self::default();
            let writer = logs.clone();

            let subscriber = tracing_subscriber::fmt()
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_max_level(tracing::Level::DEBUG)
                .with_writer(move || writer.clone())
                .finish();

            (logs, tracing::subscriber::set_default(subscriber))
        }

        /// Messages logged at `level` ("INFO", "ERROR", ...), in order,
        /// including any structured fields that follow the message
        pub(crate) fn messages(&self, level: &str) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes)
                .lines()
                .filter_map(|line| line.trim_start().split_once(' '))
                .filter(|(line_level, _)| *line_level == level)
                .map(|(_, message)| message.to_string())
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
