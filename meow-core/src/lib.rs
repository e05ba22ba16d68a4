pub mod logger;
pub mod logstore;

pub use logstore::{
    LogReader, LogRecord, LogStoreError, LogWriter, Severity, StoreConfig, list_log_files,
    read_log_file,
};
