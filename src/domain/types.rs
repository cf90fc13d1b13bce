// ==========================================
// 物料流追溯看板 - 领域类型定义
// ==========================================
// 职责: 风险状态、日期区间、区间策略等值类型
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单风险状态 (Risk Status)
// ==========================================
// 分值映射固定: High→5, Medium→3, 其他→1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskStatus {
    Low,
    Medium,
    High,
}

impl RiskStatus {
    /// 从原始标签解析（大小写敏感,未知标签按 Low 处理）
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "High" => RiskStatus::High,
            "Medium" => RiskStatus::Medium,
            _ => RiskStatus::Low,
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            RiskStatus::High => 5,
            RiskStatus::Medium => 3,
            RiskStatus::Low => 1,
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskStatus::Low => write!(f, "Low"),
            RiskStatus::Medium => write!(f, "Medium"),
            RiskStatus::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 热力图风险分档 (Risk Bucket)
// ==========================================
// 仅供展示层着色使用,不参与计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBucket {
    Low,    // score < 2
    Medium, // 2 <= score < 4
    High,   // score >= 4
}

impl RiskBucket {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            RiskBucket::High
        } else if score >= 2.0 {
            RiskBucket::Medium
        } else {
            RiskBucket::Low
        }
    }
}

// ==========================================
// 解析后的日期
// ==========================================
// Invalid: 有原始值但无法解析,区间过滤时永不命中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Valid(NaiveDateTime),
    Invalid,
}

impl ParsedDate {
    pub fn valid(&self) -> Option<NaiveDateTime> {
        match self {
            ParsedDate::Valid(dt) => Some(*dt),
            ParsedDate::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedDate::Valid(_))
    }
}

impl Serialize for ParsedDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParsedDate::Valid(dt) => dt.serialize(serializer),
            ParsedDate::Invalid => serializer.serialize_none(),
        }
    }
}

// ==========================================
// DateRange - 闭区间 [from, to]
// ==========================================
// 不变量: from <= to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl DateRange {
    /// 构造区间,from > to 时返回 None
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Option<Self> {
        if from <= to {
            Some(Self { from, to })
        } else {
            None
        }
    }

    /// 以自然日构造（两端均取当日零点）
    pub fn from_days(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        Self::new(from.and_time(chrono::NaiveTime::MIN), to.and_time(chrono::NaiveTime::MIN))
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    /// 两端均含
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.from && at <= self.to
    }

    /// 整体平移（负数为向前）,超出可表示日期范围时返回 None
    pub fn shift_days(&self, days: i64) -> Option<Self> {
        let delta = TimeDelta::try_days(days)?;
        Some(Self {
            from: self.from.checked_add_signed(delta)?,
            to: self.to.checked_add_signed(delta)?,
        })
    }
}

// ==========================================
// 默认区间策略
// ==========================================
// full-span: 最早日期 ~ 最晚日期+1天（订单/库存视图）
// trailing-window: 最晚日期往前 days-1 天 ~ 最晚日期（物料流视图）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DateRangePolicy {
    FullSpan,
    TrailingWindow { days: i64 },
}

impl DateRangePolicy {
    pub fn trailing_week() -> Self {
        DateRangePolicy::TrailingWindow { days: 7 }
    }
}

impl Default for DateRangePolicy {
    fn default() -> Self {
        DateRangePolicy::FullSpan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_risk_score_mapping() {
        assert_eq!(RiskStatus::from_label("High").score(), 5);
        assert_eq!(RiskStatus::from_label("Medium").score(), 3);
        assert_eq!(RiskStatus::from_label("Low").score(), 1);
        assert_eq!(RiskStatus::from_label("unknown").score(), 1);
    }

    #[test]
    fn test_risk_bucket_boundaries() {
        assert_eq!(RiskBucket::from_score(4.0), RiskBucket::High);
        assert_eq!(RiskBucket::from_score(3.99), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_score(2.0), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_score(1.0), RiskBucket::Low);
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(at(2024, 5, 2), at(2024, 5, 1)).is_none());
        assert!(DateRange::new(at(2024, 5, 1), at(2024, 5, 1)).is_some());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(at(2024, 5, 1), at(2024, 5, 7)).unwrap();
        assert!(range.contains(at(2024, 5, 1)));
        assert!(range.contains(at(2024, 5, 7)));
        assert!(!range.contains(at(2024, 5, 8)));
    }

    #[test]
    fn test_shift_days_out_of_range_is_none() {
        let range = DateRange::new(at(2024, 5, 1), at(2024, 5, 7)).unwrap();
        assert_eq!(
            range.shift_days(-7),
            DateRange::new(at(2024, 4, 24), at(2024, 4, 30))
        );
        assert!(range.shift_days(i64::MAX / 2).is_none());
        assert!(range.shift_days(-1_000_000_000).is_none());
    }

    #[test]
    fn test_policy_serde_tags() {
        let json = serde_json::to_string(&DateRangePolicy::trailing_week()).unwrap();
        assert_eq!(json, r#"{"kind":"trailing-window","days":7}"#);
        let parsed: DateRangePolicy = serde_json::from_str(r#"{"kind":"full-span"}"#).unwrap();
        assert_eq!(parsed, DateRangePolicy::FullSpan);
    }
}
