//! 单行文本编解码。
//!
//! 行格式：`[yyyy-MM-dd HH:mm:ss.fff][Severity][Base64(Name)] Base64(Content)`。
//! name 与 content 使用标准 base64 编码，因此任意内容（方括号、换行、NUL）都不会破坏行结构。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;

use super::record::{LogRecord, Severity};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const TIMESTAMP_LEN: usize = 23;

pub fn encode(record: &LogRecord) -> String {
    format!(
        "[{}][{}][{}] {}",
        record.timestamp().format(TIMESTAMP_FORMAT),
        record.severity(),
        STANDARD.encode(record.name().as_bytes()),
        STANDARD.encode(record.content().as_bytes()),
    )
}

/// 解析一行文本。任何结构不匹配、时间戳非法、未知级别或 base64 非法都返回 `None`。
pub fn decode(line: &str) -> Option<LogRecord> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line.strip_prefix('[')?;
    let (timestamp, rest) = rest.split_once("][")?;
    let (severity, rest) = rest.split_once("][")?;
    let (name, content) = rest.split_once("] ")?;

    let timestamp = parse_timestamp(timestamp)?;
    let severity = Severity::from_name(severity)?;
    let name = decode_text(name)?;
    let content = decode_text(content)?;

    Some(LogRecord::new(severity, name, content, timestamp))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if s.len() != TIMESTAMP_LEN {
        return None;
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

fn decode_text(s: &str) -> Option<String> {
    let bytes = STANDARD.decode(s).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 67)
            .unwrap()
    }

    #[test]
    fn encodes_exact_line_layout() {
        let record = LogRecord::new(Severity::Warning, "ab", "hello", ts());
        assert_eq!(
            encode(&record),
            "[2024-01-02 03:04:05.067][Warning][YWI=] aGVsbG8="
        );
    }

    #[test]
    fn roundtrip_hostile_content() {
        let samples = [
            ("", ""),
            ("[x]", "][ ] ["),
            ("line\nbreak", "crlf\r\nend\n"),
            ("nul\0byte", "\0\0"),
            ("日志🐱", "内容 with spaces"),
        ];
        for severity in Severity::ALL {
            for (name, content) in samples {
                let record = LogRecord::new(severity, name, content, ts());
                let line = encode(&record);
                assert!(!line.contains('\n') && !line.contains('\r'), "{line}");
                assert_eq!(decode(&line), Some(record));
            }
        }
    }

    #[test]
    fn decode_ignores_severity_case_and_crlf() {
        let line = "[2024-01-02 03:04:05.067][eRRoR][YWI=] aGVsbG8=\r";
        let record = decode(line).expect("record");
        assert_eq!(record.severity(), Severity::Error);
        assert_eq!(record.name(), "ab");
        assert_eq!(record.content(), "hello");
    }

    #[test]
    fn decode_rejects_malformed_lines() {
        let bad = [
            "",
            "garbage",
            "[2024-01-02 03:04:05.067][Warning][YWI=]",
            "[2024-01-02 03:04:05.067][Warning][YWI=]aGVsbG8=",
            "[2024-01-02 03:04:05][Warning][YWI=] aGVsbG8=",
            "[2024-13-02 03:04:05.067][Warning][YWI=] aGVsbG8=",
            "[2024-01-02 03:04:05.067][Fatal][YWI=] aGVsbG8=",
            "[2024-01-02 03:04:05.067][Warning][!!!] aGVsbG8=",
            "[2024-01-02 03:04:05.067][Warning][YWI=] aGVsbG8",
            "[2024-01-02 03:04:05.067][Warning][YWI=] aGVs bG8=",
            // 0xFF 0xFE 不是合法 UTF-8
            "[2024-01-02 03:04:05.067][Warning][//4=] aGVsbG8=",
            "[2024-01-02 03:04:05.067][Warn",
        ];
        for line in bad {
            assert_eq!(decode(line), None, "{line:?}");
        }
    }
}
