// ==========================================
// 物料流追溯看板 - 区间与分面过滤
// ==========================================
// 职责: 默认区间推算、闭区间过滤、分面过滤、环比区间
// 红线: 无日期或日期无效的记录在设置区间后永不命中
// ==========================================

use crate::domain::records::TabularRecord;
use crate::domain::types::{DateRange, DateRangePolicy};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::collections::BTreeSet;
use tracing::debug;

/// 默认 "全部" 哨兵值
pub const DEFAULT_ALL_SENTINEL: &str = "All";

// ==========================================
// 默认区间
// ==========================================

/// 收集记录中全部有效日期
pub fn collect_valid_dates<T: TabularRecord>(records: &[T]) -> Vec<NaiveDateTime> {
    records
        .iter()
        .filter_map(|r| r.record_date())
        .filter_map(|d| d.valid())
        .collect()
}

/// 按策略推算默认区间
///
/// - FullSpan: [最早, 最晚 + 1 天]
/// - TrailingWindow { days }: [最晚 - (days - 1) 天, 最晚]
/// - 日期列表为空时返回 None
/// - 端点超出可表示日期范围时取 chrono 的最小/最大值
pub fn default_range(dates: &[NaiveDateTime], policy: DateRangePolicy) -> Option<DateRange> {
    let latest = dates.iter().max().copied()?;

    match policy {
        DateRangePolicy::FullSpan => {
            let earliest = dates.iter().min().copied()?;
            let end = TimeDelta::try_days(1)
                .and_then(|one_day| latest.checked_add_signed(one_day))
                .unwrap_or(NaiveDateTime::MAX);
            DateRange::new(earliest, end)
        }
        DateRangePolicy::TrailingWindow { days } => {
            let span = days.max(1) - 1;
            let start = TimeDelta::try_days(span)
                .and_then(|window| latest.checked_sub_signed(window))
                .unwrap_or(NaiveDateTime::MIN);
            DateRange::new(start, latest)
        }
    }
}

/// 环比区间: 当前区间整体前移 shift_days 天
///
/// 平移后超出可表示日期范围时返回 None
pub fn previous_period(range: &DateRange, shift_days: i64) -> Option<DateRange> {
    range.shift_days(shift_days.checked_neg()?)
}

// ==========================================
// 分面
// ==========================================

/// 分面选择集合
///
/// 选中值等于哨兵值时该分面不做限制
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    sentinel: String,
    selections: Vec<(String, String)>,
}

impl Default for Facets {
    fn default() -> Self {
        Self::with_sentinel(DEFAULT_ALL_SENTINEL)
    }
}

impl Facets {
    pub fn with_sentinel(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            selections: Vec::new(),
        }
    }

    pub fn select(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.selections.push((field.into(), value.into()));
        self
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn is_unrestricted(&self) -> bool {
        self.selections.iter().all(|(_, v)| *v == self.sentinel)
    }

    pub fn matches<T: TabularRecord>(&self, record: &T) -> bool {
        self.selections.iter().all(|(field, selected)| {
            *selected == self.sentinel || record.facet(field).as_deref() == Some(selected.as_str())
        })
    }
}

// ==========================================
// 过滤
// ==========================================

/// 区间 + 分面过滤
///
/// # 规则
/// - range 为 None: 只做分面过滤
/// - range 已设置: 记录日期必须有效且落在 [from, to] 内
pub fn filter_by_range<T>(records: &[T], range: Option<&DateRange>, facets: &Facets) -> Vec<T>
where
    T: TabularRecord + Clone,
{
    let filtered: Vec<T> = records
        .iter()
        .filter(|r| match range {
            Some(range) => r
                .record_date()
                .and_then(|d| d.valid())
                .map_or(false, |at| range.contains(at)),
            None => true,
        })
        .filter(|r| facets.matches(*r))
        .cloned()
        .collect();

    debug!(input = records.len(), output = filtered.len(), "区间过滤完成");
    filtered
}

/// 有数据的自然日（去重,最近的在前）
pub fn available_dates<T: TabularRecord>(records: &[T]) -> Vec<NaiveDate> {
    let days: BTreeSet<NaiveDate> = collect_valid_dates(records)
        .into_iter()
        .map(|dt| dt.date())
        .collect();
    days.into_iter().rev().collect()
}

/// 分面下拉选项: 哨兵值 + 排序去重后的字段取值
pub fn facet_options<T: TabularRecord>(records: &[T], field: &str, sentinel: &str) -> Vec<String> {
    let values: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.facet(field))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != sentinel)
        .collect();

    std::iter::once(sentinel.to_string()).chain(values).collect()
}
