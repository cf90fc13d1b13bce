// ==========================================
// 物料流追溯看板 - 记录归一化
// ==========================================
// 职责: 日期/数量单元格 → 规范值
// 红线: 不抛错。坏日期标记为 Invalid,坏数量按 0 计
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::types::ParsedDate;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// 一天的毫秒数（Excel 序列号换算用）
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Excel 允许的最大序列号（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Excel/Lotus 序列号纪元: 1899-12-30
pub fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// 序列号 → 日期时间（含小数部分的时刻）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_EXCEL_SERIAL {
        return None;
    }
    let ms = (serial * MS_PER_DAY).round() as i64;
    excel_epoch().checked_add_signed(Duration::milliseconds(ms))
}

/// 解析日期单元格
///
/// # 返回
/// - None: 空值
/// - Some(Valid): ISO 文本 / 序列号 / 日期对象
/// - Some(Invalid): 有值但无法解析
pub fn parse_date(raw: &CellValue) -> Option<ParsedDate> {
    match raw {
        CellValue::Empty => None,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(
                parse_iso(trimmed)
                    .map(ParsedDate::Valid)
                    .unwrap_or(ParsedDate::Invalid),
            )
        }
        CellValue::Number(n) => Some(
            excel_serial_to_datetime(*n)
                .map(ParsedDate::Valid)
                .unwrap_or(ParsedDate::Invalid),
        ),
        CellValue::DateTime(dt) => Some(ParsedDate::Valid(*dt)),
        CellValue::Bool(_) => Some(ParsedDate::Invalid),
    }
}

/// ISO-8601 文本解析（日期、本地时间、带时区三种写法,兼容 YYYYMMDD）
fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    const LOCAL_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(d) = NaiveDate::parse_from_str(value, "%Y%m%d") {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// 解析数量单元格
///
/// 去掉百分号与首尾空白后按前缀浮点数解析,
/// 结果非有限数时返回 0（单个坏单元格不能拖垮汇总）
pub fn parse_quantity(raw: &CellValue) -> f64 {
    let value = match raw {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let stripped = s.replacen('%', "", 1);
            leading_float(stripped.trim()).unwrap_or(f64::NAN)
        }
        CellValue::Empty | CellValue::Bool(_) | CellValue::DateTime(_) => f64::NAN,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// 可选单元格的数量解析（缺列按 0）
pub fn parse_quantity_opt(raw: Option<&CellValue>) -> f64 {
    raw.map(parse_quantity).unwrap_or(0.0)
}

/// 前缀浮点数解析: "12.5kg" → 12.5, "abc" → None
pub fn leading_float(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].replace("Infinity", "inf").parse().ok();
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // 指数部分必须完整才计入
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// 格式化为 ISO 日历日期
pub fn format_iso_date(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}
