use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::{LogStoreError, Result};

pub const DEFAULT_MAX_LINES_PER_FILE: usize = 1000;
pub const DEFAULT_FOLDER: &str = "log";

/// 日志存储的配置项。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 日志文件夹，不存在时自动创建
    pub folder: PathBuf,
    /// 单个文件达到该行数后轮转
    pub max_lines_per_file: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_FOLDER),
            max_lines_per_file: DEFAULT_MAX_LINES_PER_FILE,
        }
    }
}

impl StoreConfig {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Self::default()
        }
    }

    pub fn with_max_lines(mut self, max_lines_per_file: usize) -> Self {
        self.max_lines_per_file = max_lines_per_file;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_lines_per_file == 0 {
            return Err(LogStoreError::InvalidThreshold(self.max_lines_per_file));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_validation() {
        let config = StoreConfig::default();
        assert_eq!(config.folder, PathBuf::from("log"));
        assert_eq!(config.max_lines_per_file, 1000);
        assert!(config.validate().is_ok());

        let zero = StoreConfig::new("x").with_max_lines(0);
        assert!(matches!(
            zero.validate(),
            Err(LogStoreError::InvalidThreshold(0))
        ));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"folder":"logs"}"#).unwrap();
        assert_eq!(config.folder, PathBuf::from("logs"));
        assert_eq!(config.max_lines_per_file, DEFAULT_MAX_LINES_PER_FILE);
    }
}
