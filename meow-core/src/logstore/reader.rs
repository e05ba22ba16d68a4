use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::codec::decode;
use super::error::{LogStoreError, Result};
use super::record::LogRecord;
use super::rotation::{FileStamp, LOG_EXTENSION};

/// 列出文件夹中扩展名为 `.log` 的文件，顺序为文件系统枚举顺序。
pub fn list_log_files(folder: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let folder = folder.as_ref();
    let mut files = Vec::new();

    for entry in fs::read_dir(folder).map_err(LogStoreError::io(folder))? {
        let entry = entry.map_err(LogStoreError::io(folder))?;
        let path = entry.path();
        let is_log = path.extension().and_then(|ext| ext.to_str()) == Some(LOG_EXTENSION);
        if is_log && path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

/// 按文件名中的时间戳与后缀排序，无法解析的文件名排在最后并按名称排序。
pub fn sort_chronologically(files: &mut [PathBuf]) {
    files.sort_by_cached_key(|path| {
        let stamp = FileStamp::parse(path);
        (stamp.is_none(), stamp, path.clone())
    });
}

/// 读取并解析一个日志文件。
///
/// 只读取打开时已存在的字节，不会阻塞正在追加的写入方；无法解析的行（例如写入到一半的行）
/// 会被跳过，不会导致整个读取失败。
pub fn read_log_file(path: impl AsRef<Path>) -> Result<Vec<LogRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(LogStoreError::io(path))?;
    let len = file.metadata().map_err(LogStoreError::io(path))?.len();
    let reader = BufReader::new(file.take(len));

    let mut records = Vec::new();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(LogStoreError::io(path))?;
        match std::str::from_utf8(&line).ok().and_then(decode) {
            Some(record) => records.push(record),
            None => debug!(
                path = %path.display(),
                line = index + 1,
                "skipping malformed log line"
            ),
        }
    }

    Ok(records)
}

/// 统计以换行结尾的行数，末尾未写完的半行不计入。
pub fn count_lines(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path).map_err(LogStoreError::io(path))?;
    let mut reader = BufReader::new(file);
    let mut count = 0;

    loop {
        let buf = reader.fill_buf().map_err(LogStoreError::io(path))?;
        if buf.is_empty() {
            break;
        }
        count += buf.iter().filter(|byte| **byte == b'\n').count();
        let consumed = buf.len();
        reader.consume(consumed);
    }

    Ok(count)
}

/// 某个文件夹下日志文件的快照，文件按创建时间排序。
pub struct LogReader {
    folder: PathBuf,
    files: Vec<PathBuf>,
}

impl LogReader {
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self> {
        let folder = folder.into();
        let mut files = list_log_files(&folder)?;
        sort_chronologically(&mut files);
        Ok(Self { folder, files })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn list_files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn read_all(&self) -> Result<Vec<LogRecord>> {
        let mut all = Vec::new();
        for path in &self.files {
            all.extend(read_log_file(path)?);
        }
        Ok(all)
    }

    pub fn count_records(&self) -> Result<usize> {
        let mut count = 0;
        for path in &self.files {
            count += read_log_file(path)?.len();
        }
        Ok(count)
    }
}
