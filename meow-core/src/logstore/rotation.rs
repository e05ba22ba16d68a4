use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use super::error::{LogStoreError, Result};

pub const LOG_EXTENSION: &str = "log";
pub const FILE_STAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S%.3f";
const FILE_STAMP_LEN: usize = 23;

/// 同一时间戳下尝试的文件名数量上限，防止病态情况下无限循环。
pub const MAX_NAME_ATTEMPTS: usize = 10_000;

#[derive(Debug)]
struct ActiveFile {
    path: PathBuf,
    lines: usize,
}

/// 按行数轮转的活动文件管理器。
///
/// 每个 `LogWriter` 独占一个实例；轮转后旧文件不会再被追加，但仍可读取。
#[derive(Debug)]
pub struct LineBasedRotation {
    folder: PathBuf,
    max_lines_per_file: usize,
    active: Option<ActiveFile>,
}

impl LineBasedRotation {
    pub fn new(folder: impl Into<PathBuf>, max_lines_per_file: usize) -> Result<Self> {
        if max_lines_per_file == 0 {
            return Err(LogStoreError::InvalidThreshold(max_lines_per_file));
        }
        let folder = folder.into();
        fs::create_dir_all(&folder).map_err(LogStoreError::io(&folder))?;

        Ok(Self {
            folder,
            max_lines_per_file,
            active: None,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn max_lines_per_file(&self) -> usize {
        self.max_lines_per_file
    }

    pub fn active_file(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }

    /// 活动文件当前的行数，没有活动文件时为 0。
    pub fn active_lines(&self) -> usize {
        self.active.as_ref().map_or(0, |active| active.lines)
    }

    pub fn ensure_active_file(&mut self) -> Result<&Path> {
        self.ensure_active_file_at(Local::now().naive_local())
    }

    pub(crate) fn ensure_active_file_at(&mut self, now: NaiveDateTime) -> Result<&Path> {
        let active = match self.active.take() {
            Some(active) => active,
            None => {
                fs::create_dir_all(&self.folder).map_err(LogStoreError::io(&self.folder))?;
                let path = create_unique_file(&self.folder, now)?;
                debug!(path = %path.display(), "created log file");
                ActiveFile { path, lines: 0 }
            }
        };
        Ok(self.active.insert(active).path.as_path())
    }

    /// 放弃当前活动文件（例如追加失败后），下一次写入会创建新文件，旧文件不再被追加。
    pub fn abandon(&mut self) {
        if let Some(dropped) = self.active.take() {
            warn!(
                path = %dropped.path.display(),
                lines = dropped.lines,
                "abandoning active log file"
            );
        }
    }

    /// 在一次成功追加之后调用；行数达到阈值时清除活动文件，下一次写入会创建新文件。
    pub fn notify_write(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.lines += 1;
        if active.lines < self.max_lines_per_file {
            return;
        }
        if let Some(full) = self.active.take() {
            info!(
                path = %full.path.display(),
                lines = full.lines,
                "log file reached line limit, rotating"
            );
        }
    }
}

pub fn file_name(stamp: &str, suffix: usize) -> String {
    if suffix == 0 {
        format!("{stamp}.{LOG_EXTENSION}")
    } else {
        format!("{stamp}-{suffix}.{LOG_EXTENSION}")
    }
}

/// 以 `create_new` 创建文件，名字被占用时依次追加 `-1`、`-2`…
fn create_unique_file(folder: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let stamp = now.format(FILE_STAMP_FORMAT).to_string();
    for suffix in 0..MAX_NAME_ATTEMPTS {
        let path = folder.join(file_name(&stamp, suffix));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(LogStoreError::io(&path)(err)),
        }
    }
    Err(LogStoreError::NameExhausted {
        folder: folder.to_path_buf(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

/// 从文件名中解析出的创建时间与消歧后缀，用于按时间排序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileStamp {
    pub created: NaiveDateTime,
    pub suffix: usize,
}

impl FileStamp {
    pub fn parse(path: &Path) -> Option<Self> {
        if path.extension()?.to_str()? != LOG_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let stamp = stem.get(..FILE_STAMP_LEN)?;
        let suffix = match stem.get(FILE_STAMP_LEN..)? {
            "" => 0,
            rest => rest
                .strip_prefix('-')?
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)?,
        };
        let created = NaiveDateTime::parse_from_str(stamp, FILE_STAMP_FORMAT).ok()?;
        Some(Self { created, suffix })
    }
}
