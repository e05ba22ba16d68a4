//! 命令行工具的持久化配置。

use std::path::PathBuf;

use anyhow::{Context, Result};
use meow_core::logger::LogLevel;
use meow_core::logstore::StoreConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 日志存储位置与轮转阈值
    pub store: StoreConfig,
    /// 工具自身诊断日志的级别
    pub log_level: LogLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            log_level: LogLevel::Warn,
        }
    }
}

/// 命令行上给出的覆盖项，优先于配置文件。
#[derive(Debug, Clone, Default)]
pub struct CliOverride {
    pub folder: Option<PathBuf>,
    pub max_lines_per_file: Option<usize>,
    pub log_level: Option<LogLevel>,
}

impl CliConfig {
    pub const CONFY_APP_NAME: &'static str = "meow";
    pub const CONFY_CONFIG_NAME: &'static str = "config";

    pub fn load() -> Result<Self> {
        confy::load::<Self>(Self::CONFY_APP_NAME, Self::CONFY_CONFIG_NAME)
            .context("failed to load meow configuration")
    }

    pub fn merge(&mut self, other: CliOverride) {
        if let Some(folder) = other.folder {
            self.store.folder = folder;
        }
        if let Some(max_lines) = other.max_lines_per_file {
            self.store.max_lines_per_file = max_lines;
        }
        if let Some(level) = other.log_level {
            self.log_level = level;
        }
    }
}
