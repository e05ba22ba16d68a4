//! 进程诊断日志（tracing）初始化，与日志存储写入的记录无关。

mod config;

pub use config::{LogConfig, LogFormat, LogLevel, LogOutput, LogRotation};

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const DEFAULT_FILE_NAME: &str = "meow.log";

pub struct Logger {
    config: LogConfig,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// 安装全局 subscriber。`RUST_LOG` 优先于配置中的级别。
    pub fn init(self) -> Result<LoggerGuard, LogError> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guards = Vec::new();

        match &self.config.output {
            LogOutput::Stdout => layers.push(stdout_layer(self.config.format)),
            LogOutput::File { path, rotation } => {
                let (writer, guard) = non_blocking_file(path, *rotation)?;
                layers.push(file_layer(self.config.format, writer));
                guards.push(guard);
            }
            LogOutput::Both { path, rotation } => {
                let (writer, guard) = non_blocking_file(path, *rotation)?;
                layers.push(stdout_layer(self.config.format));
                layers.push(file_layer(self.config.format, writer));
                guards.push(guard);
            }
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(self.build_filter())
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)?;

        Ok(LoggerGuard { _guards: guards })
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.config.level.as_str()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn stdout_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_ansi(false)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .boxed(),
    }
}

fn non_blocking_file(
    path: &Path,
    rotation: LogRotation,
) -> Result<(NonBlocking, WorkerGuard), LogError> {
    let appender = create_file_appender(path, rotation)?;
    Ok(tracing_appender::non_blocking(appender))
}

fn create_file_appender(path: &Path, rotation: LogRotation) -> Result<RollingFileAppender, LogError> {
    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => {
            return Err(LogError::InvalidPath(format!(
                "Invalid log path: {}",
                path.display()
            )));
        }
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_FILE_NAME);

    std::fs::create_dir_all(dir)?;

    let rotation = match rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name)
        .build(dir)?;
    Ok(appender)
}

/// 持有非阻塞写入线程的 guard，drop 时刷新剩余日志。
pub struct LoggerGuard {
    _guards: Vec<WorkerGuard>,
}

#[derive(Default)]
pub struct LoggerBuilder {
    level: Option<LogLevel>,
    format: Option<LogFormat>,
    output: Option<LogOutput>,
}

impl LoggerBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = Some(output);
        self
    }

    pub fn stdout(self) -> Self {
        self.output(LogOutput::Stdout)
    }

    pub fn file(self, path: impl Into<std::path::PathBuf>, rotation: LogRotation) -> Self {
        self.output(LogOutput::File {
            path: path.into(),
            rotation,
        })
    }

    pub fn both(self, path: impl Into<std::path::PathBuf>, rotation: LogRotation) -> Self {
        self.output(LogOutput::Both {
            path: path.into(),
            rotation,
        })
    }

    pub fn build(self) -> Logger {
        Logger::new(LogConfig {
            level: self.level.unwrap_or(LogLevel::Info),
            format: self.format.unwrap_or(LogFormat::Compact),
            output: self.output.unwrap_or(LogOutput::Stdout),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log path: {0}")]
    InvalidPath(String),

    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] InitError),

    #[error("Logger already initialized")]
    AlreadyInitialized,
}
