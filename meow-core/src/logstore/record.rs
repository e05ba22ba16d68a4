use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// 日志严重程度，封闭枚举，不支持自定义级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Message,
    Tip,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Message, Self::Tip, Self::Warning, Self::Error];

    /// 行格式中使用的规范名称。
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::Tip => "Tip",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    /// 忽略 ASCII 大小写匹配规范名称。
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

/// 一条结构化日志。构造后不可变，时间戳精度为毫秒。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    name: String,
    severity: Severity,
    content: String,
    timestamp: NaiveDateTime,
}

impl LogRecord {
    /// 时间戳会被截断到毫秒，保证编码后再解码得到相同的记录。
    pub fn new(
        severity: Severity,
        name: impl Into<String>,
        content: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            severity,
            content: content.into(),
            timestamp: timestamp.trunc_subsecs(3),
        }
    }

    /// 以当前本地时间创建记录。
    pub fn now(severity: Severity, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(severity, name, content, Local::now().naive_local())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn severity_names_are_case_insensitive() {
        assert_eq!(Severity::from_name("warning"), Some(Severity::Warning));
        assert_eq!(Severity::from_name("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::from_name("tIp"), Some(Severity::Tip));
        assert_eq!(Severity::from_name("Info"), None);
        assert_eq!(Severity::from_name(""), None);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn timestamp_is_truncated_to_millis() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_nano_opt(8, 7, 6, 123_456_789)
            .unwrap();
        let record = LogRecord::new(Severity::Tip, "n", "c", ts);
        assert_eq!(record.timestamp().nanosecond(), 123_000_000);
    }
}
