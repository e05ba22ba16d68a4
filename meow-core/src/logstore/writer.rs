use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::codec::encode;
use super::config::{DEFAULT_MAX_LINES_PER_FILE, StoreConfig};
use super::error::{LogStoreError, Result};
use super::reader::list_log_files;
use super::record::{LogRecord, Severity};
use super::rotation::LineBasedRotation;

type Observer = Box<dyn FnMut(&LogRecord) + Send>;

/// 追加写入日志记录的入口。
///
/// 每次 `add_log` 都会重新打开文件、写入一行并刷新，调用返回前记录已经落盘。
/// 同一文件夹只应存在一个活动的 `LogWriter`，这一约束不在进程内强制。
pub struct LogWriter {
    rotation: LineBasedRotation,
    observer: Option<Observer>,
}

impl LogWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self> {
        Self::with_max_lines(folder, DEFAULT_MAX_LINES_PER_FILE)
    }

    pub fn with_max_lines(folder: impl Into<PathBuf>, max_lines_per_file: usize) -> Result<Self> {
        Ok(Self {
            rotation: LineBasedRotation::new(folder, max_lines_per_file)?,
            observer: None,
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Self::with_max_lines(config.folder.clone(), config.max_lines_per_file)
    }

    /// 注册回调，替换已有的回调。回调在记录落盘后同步执行。
    pub fn on_record<F>(&mut self, callback: F)
    where
        F: FnMut(&LogRecord) + Send + 'static,
    {
        self.observer = Some(Box::new(callback));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn add_log(
        &mut self,
        severity: Severity,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let record = LogRecord::now(severity, name, content);
        self.append(&record)?;
        if let Some(observer) = self.observer.as_mut() {
            observer(&record);
        }
        Ok(())
    }

    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let path = self.rotation.ensure_active_file()?.to_path_buf();
        let mut line = encode(record);
        line.push('\n');

        if let Err(err) = append_line(&path, &line) {
            // 失败后的文件可能残留半行，不再向其追加
            self.rotation.abandon();
            return Err(LogStoreError::io(&path)(err));
        }

        self.rotation.notify_write();
        Ok(())
    }

    pub fn folder(&self) -> &Path {
        self.rotation.folder()
    }

    /// 当前活动文件；首次写入前或刚发生轮转后为 `None`。
    pub fn active_file(&self) -> Option<&Path> {
        self.rotation.active_file()
    }

    pub fn max_lines_per_file(&self) -> usize {
        self.rotation.max_lines_per_file()
    }

    pub fn file_paths(&self) -> Result<Vec<PathBuf>> {
        list_log_files(self.folder())
    }
}

/// 追加一行；文件末尾若是未以换行结束的残留片段，先补一个换行把它隔离开。
fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().read(true).append(true).open(path)?;
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }
    file.write_all(line.as_bytes())?;
    file.flush()
}

impl fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWriter")
            .field("rotation", &self.rotation)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logstore::reader::read_log_file;
    use std::sync::{Arc, Mutex};

    #[test]
    fn observer_sees_the_written_record() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut writer = LogWriter::new(temp_dir.path())?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        writer.on_record(move |record| sink.lock().unwrap().push(record.clone()));

        writer.add_log(Severity::Tip, "提示", "内容\n第二行")?;

        let path = writer.active_file().expect("active file").to_path_buf();
        let on_disk = read_log_file(&path)?;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(on_disk, *seen);
        assert_eq!(seen[0].content(), "内容\n第二行");
        Ok(())
    }

    #[test]
    fn observer_can_be_replaced_and_cleared() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut writer = LogWriter::new(temp_dir.path())?;
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));

        let counter = first.clone();
        writer.on_record(move |_| *counter.lock().unwrap() += 1);
        writer.add_log(Severity::Message, "a", "1")?;

        let counter = second.clone();
        writer.on_record(move |_| *counter.lock().unwrap() += 1);
        writer.add_log(Severity::Message, "b", "2")?;

        writer.clear_observer();
        writer.add_log(Severity::Message, "c", "3")?;

        assert_eq!(*first.lock().unwrap(), 1);
        assert_eq!(*second.lock().unwrap(), 1);
        Ok(())
    }

    #[test]
    fn recreates_folder_removed_after_construction() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path().join("logs");
        let mut writer = LogWriter::new(&folder)?;
        std::fs::remove_dir_all(&folder).unwrap();

        writer.add_log(Severity::Warning, "w", "again")?;
        assert_eq!(writer.file_paths()?.len(), 1);
        Ok(())
    }

    #[test]
    fn append_failure_is_reported_with_path() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut writer = LogWriter::new(temp_dir.path())?;
        writer.add_log(Severity::Message, "a", "1")?;
        let active = writer.active_file().expect("active file").to_path_buf();

        // 活动文件被替换成目录后追加必然失败
        std::fs::remove_file(&active).unwrap();
        std::fs::create_dir(&active).unwrap();

        match writer.add_log(Severity::Message, "b", "2") {
            Err(LogStoreError::Io { path, .. }) => assert_eq!(path, active),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn deleted_active_file_fails_one_call_then_recovers() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut writer = LogWriter::new(temp_dir.path())?;
        writer.add_log(Severity::Message, "a", "1")?;
        let deleted = writer.active_file().expect("active file").to_path_buf();
        std::fs::remove_file(&deleted).unwrap();

        assert!(writer.add_log(Severity::Message, "b", "2").is_err());
        assert!(writer.active_file().is_none());

        writer.add_log(Severity::Message, "c", "3")?;
        writer.add_log(Severity::Message, "d", "4")?;
        let active = writer.active_file().expect("active file").to_path_buf();
        assert_ne!(active, deleted);
        assert!(!deleted.exists());

        let names: Vec<_> = read_log_file(&active)?
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "d"]);
        Ok(())
    }

    #[test]
    fn record_after_torn_tail_stays_readable() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut writer = LogWriter::new(temp_dir.path())?;
        writer.add_log(Severity::Message, "a", "1")?;
        let active = writer.active_file().expect("active file").to_path_buf();

        let mut file = OpenOptions::new().append(true).open(&active).unwrap();
        file.write_all(b"[2024-01-01 00:0").unwrap();
        drop(file);

        writer.add_log(Severity::Error, "b", "2")?;
        let records = read_log_file(&active)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name(), "b");
        assert_eq!(records[1].severity(), Severity::Error);
        Ok(())
    }

    #[test]
    fn from_config_validates_threshold() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(temp_dir.path()).with_max_lines(0);
        assert!(matches!(
            LogWriter::from_config(&config),
            Err(LogStoreError::InvalidThreshold(0))
        ));
    }
}
