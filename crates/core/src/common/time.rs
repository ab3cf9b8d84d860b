use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// # Summary
/// 将 ISO-8601 时间字符串解析为 Unix 秒。
///
/// # Logic
/// 1. 优先按 RFC 3339 解析（包含 `Z` 或 `+08:00` 之类的时区后缀）。
/// 2. 其次按不带时区的 `YYYY-MM-DDTHH:MM:SS[.fff]` 解析，视为 UTC。
/// 3. 最后按纯日期 `YYYY-MM-DD` 解析，取当日 00:00:00 UTC。
///
/// # Arguments
/// * `input`: 待解析的时间字符串。
///
/// # Returns
/// 成功返回 Unix 秒，格式不合法时返回 None。
pub fn parse_iso8601(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(naive.and_utc().timestamp());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}
