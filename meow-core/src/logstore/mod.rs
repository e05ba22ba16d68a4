//! 本地追加式日志存储：按行数轮转写入，并可在写入进行中读取。

mod codec;
mod config;
mod error;
mod reader;
mod record;
mod rotation;
mod writer;

pub use codec::{TIMESTAMP_FORMAT, decode, encode};
pub use config::{DEFAULT_FOLDER, DEFAULT_MAX_LINES_PER_FILE, StoreConfig};
pub use error::{LogStoreError, Result};
pub use reader::{LogReader, count_lines, list_log_files, read_log_file, sort_chronologically};
pub use record::{LogRecord, Severity, UnknownSeverity};
pub use rotation::{FILE_STAMP_FORMAT, FileStamp, LOG_EXTENSION, LineBasedRotation, MAX_NAME_ATTEMPTS, file_name};
pub use writer::LogWriter;
