// ==========================================
// 物料流追溯看板 - 聚合引擎
// ==========================================
// 职责: 标量汇总、环比变化、周 × SKU 风险热力图、SKU 预测折线、KPI
// 输入: 已过滤的记录集
// 输出: 视图模型（HeatmapMatrix / ForecastSeries / *Kpis）
// 红线: 不做过滤,不做 IO；非法数值一律按 0 处理
// ==========================================

use crate::domain::records::{fields, EnrichedBatch, ForecastRecord, OrderRecord, TabularRecord};
use crate::domain::types::DateRange;
use crate::domain::view::{
    ForecastPoint, ForecastSeries, HeatmapMatrix, HeatmapRow, MaterialFlowKpis, OrderKpis,
};
use crate::importer::field_mapper::UNKNOWN_KEY;
use crate::importer::normalizer::{format_iso_date, parse_date, parse_quantity_opt};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument};

// ==========================================
// 标量汇总
// ==========================================

/// 字段求和（逐条按数量口径解析,空集为 0）
pub fn sum_field<T: TabularRecord>(records: &[T], field: &str) -> f64 {
    records
        .iter()
        .map(|r| parse_quantity_opt(r.field(field)))
        .sum()
}

/// 环比变化百分比
///
/// previous 为 0 时定义为 0（无上期数据视为无变化）
pub fn period_over_period_delta(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// 实际与预测的偏离度 |actual - forecast| / forecast
///
/// forecast 为 0 时无定义
pub fn deviation_ratio(actual: f64, forecast: f64) -> Option<f64> {
    if forecast == 0.0 {
        return None;
    }
    Some((actual - forecast).abs() / forecast)
}

fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

// ==========================================
// AggregationEngine - 聚合引擎
// ==========================================
pub struct AggregationEngine {
    // 无状态引擎
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 风险热力图
    // ==========================================

    /// 构建周 × SKU 平均风险分矩阵
    ///
    /// # 规则
    /// - 周标签: 去重后按字符串字典序排序
    /// - SKU: 去重,保持首次出现顺序
    /// - 单元格: 匹配 (周, SKU) 的订单 risk_score 算术平均,无匹配为 0
    /// - 缺失的周/SKU 取值归入 "Unknown"
    #[instrument(skip(self, orders), fields(orders = orders.len()))]
    pub fn build_heatmap(
        &self,
        orders: &[OrderRecord],
        week_field: &str,
        sku_field: &str,
    ) -> HeatmapMatrix {
        let mut weeks = BTreeSet::new();
        let mut skus: Vec<String> = Vec::new();
        let mut buckets: HashMap<(String, String), (f64, usize)> = HashMap::new();

        for order in orders {
            let week = group_key(order, week_field);
            let sku = group_key(order, sku_field);

            if !skus.contains(&sku) {
                skus.push(sku.clone());
            }
            weeks.insert(week.clone());

            let entry = buckets.entry((week, sku)).or_insert((0.0, 0));
            entry.0 += f64::from(order.risk_score);
            entry.1 += 1;
        }

        let weeks: Vec<String> = weeks.into_iter().collect();
        let rows = weeks
            .iter()
            .map(|week| HeatmapRow {
                week: week.clone(),
                cells: skus
                    .iter()
                    .map(|sku| {
                        let avg = buckets
                            .get(&(week.clone(), sku.clone()))
                            .map(|(sum, count)| sum / *count as f64)
                            .unwrap_or(0.0);
                        (sku.clone(), avg)
                    })
                    .collect(),
            })
            .collect();

        debug!(weeks = weeks.len(), skus = skus.len(), "风险热力图构建完成");
        HeatmapMatrix { weeks, skus, rows }
    }

    // ==========================================
    // SKU 预测折线
    // ==========================================

    /// 按 SKU 分组生成预测折线
    ///
    /// # 规则
    /// - 分组顺序为 SKU 首次出现顺序
    /// - 日期经归一化后输出 YYYY-MM-DD；无法解析的点丢弃
    /// - range 已设置时只保留区间内（两端均含）的点
    /// - 无剩余点的 SKU 仍输出（data 为空）
    #[instrument(skip(self, forecasts), fields(forecasts = forecasts.len()))]
    pub fn build_forecast_series(
        &self,
        forecasts: &[ForecastRecord],
        range: Option<&DateRange>,
    ) -> Vec<ForecastSeries> {
        let mut series: Vec<ForecastSeries> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in forecasts {
            let slot = *index.entry(record.sku.clone()).or_insert_with(|| {
                series.push(ForecastSeries {
                    id: record.sku.clone(),
                    data: Vec::new(),
                });
                series.len() - 1
            });

            let Some(at) = parse_date(&record.date).and_then(|d| d.valid()) else {
                continue;
            };
            if range.map_or(false, |r| !r.contains(at)) {
                continue;
            }

            series[slot].data.push(ForecastPoint {
                x: format_iso_date(at),
                y: record.projected_tonnage,
            });
        }

        debug!(series = series.len(), "预测折线构建完成");
        series
    }

    // ==========================================
    // KPI
    // ==========================================

    /// 物料流 KPI（实际 vs 预测）
    pub fn material_flow_kpis(&self, batches: &[EnrichedBatch]) -> MaterialFlowKpis {
        let total_in: f64 = batches.iter().map(|b| b.collected_qty).sum();
        let forecast_in: f64 = batches.iter().map(|b| b.raw_material_qty()).sum();
        let total_out: f64 = batches
            .iter()
            .map(|b| b.categorized_qty * b.yield_percentage / 100.0)
            .sum();
        let forecast_out: f64 = batches
            .iter()
            .map(|b| b.raw_material_qty() * b.yield_percentage / 100.0)
            .sum();

        let in_vs_forecast_pct = if forecast_in == 0.0 {
            0.0
        } else {
            total_in / forecast_in * 100.0 - 100.0
        };

        MaterialFlowKpis {
            total_in,
            forecast_in,
            total_out,
            forecast_out,
            yield_actual: ratio_pct(total_out, total_in),
            yield_forecast: ratio_pct(forecast_out, forecast_in),
            in_vs_forecast_pct,
            in_deviation: deviation_ratio(total_in, forecast_in),
            out_deviation: deviation_ratio(total_out, forecast_out),
        }
    }

    /// 订单 KPI（当前区间 vs 上一周期）
    pub fn order_kpis(&self, current: &[OrderRecord], previous: &[OrderRecord]) -> OrderKpis {
        let total_value = sum_field(current, fields::ORDER_VALUE);
        let total_quantity = sum_field(current, fields::ORDER_QUANTITY);
        let previous_total_value = sum_field(previous, fields::ORDER_VALUE);
        let previous_total_quantity = sum_field(previous, fields::ORDER_QUANTITY);

        OrderKpis {
            total_value,
            total_quantity,
            previous_total_value,
            previous_total_quantity,
            value_delta_pct: period_over_period_delta(total_value, previous_total_value),
            quantity_delta_pct: period_over_period_delta(total_quantity, previous_total_quantity),
        }
    }
}

fn group_key<T: TabularRecord>(record: &T, field: &str) -> String {
    record
        .facet(field)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_KEY.to_string())
}
