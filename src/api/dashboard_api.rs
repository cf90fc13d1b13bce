// ==========================================
// 物料流追溯看板 - 看板 API
// ==========================================
// 职责: 由数据上下文 + 查询条件组装两个视图模型
// - 物料流视图: 富化 → 区间过滤 → KPI + 流向图
// - 订单/库存视图: 区间 + 分面过滤 → KPI 环比 + 风险热力图 + 预测折线
// 架构: API 层 → Engine 层（纯计算）
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::dashboard_config::DashboardConfig;
use crate::domain::records::{fields, EnrichedBatch};
use crate::domain::types::{DateRange, DateRangePolicy};
use crate::domain::view::{
    FlowGraphOutcome, ForecastSeries, HeatmapMatrix, MaterialFlowKpis, OrderKpis,
};
use crate::engine::aggregation::AggregationEngine;
use crate::engine::enrichment::EnrichmentEngine;
use crate::engine::flow_graph::FlowGraphBuilder;
use crate::engine::range_filter::{
    available_dates, collect_valid_dates, default_range, facet_options, filter_by_range,
    previous_period, Facets,
};
use crate::importer::data_loader::DataContext;

// ==========================================
// 查询条件
// ==========================================

/// 物料流视图查询
///
/// from/to 均为空时按配置策略推算默认区间
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialFlowQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// 订单/库存视图查询
///
/// region / risk_status 为空或等于哨兵值时不限制
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTrackerQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub region: Option<String>,
    pub risk_status: Option<String>,
}

// ==========================================
// 视图模型
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialFlowView {
    pub load_id: Uuid,
    pub range: Option<DateRange>,
    /// 有数据的日期（最近的在前）
    pub available_dates: Vec<NaiveDate>,
    pub kpis: MaterialFlowKpis,
    pub batches: Vec<EnrichedBatch>,
    pub flow_graph: FlowGraphOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTrackerView {
    pub load_id: Uuid,
    pub range: Option<DateRange>,
    pub previous_range: Option<DateRange>,
    pub region_options: Vec<String>,
    pub risk_options: Vec<String>,
    pub order_count: usize,
    pub kpis: OrderKpis,
    pub heatmap: HeatmapMatrix,
    pub forecast: Vec<ForecastSeries>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    config: Arc<DashboardConfig>,
    enrichment: EnrichmentEngine,
    aggregation: AggregationEngine,
    flow_graph: FlowGraphBuilder,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    ///
    /// # 参数
    /// - config: 看板配置（区间策略、阶段链、哨兵值）
    pub fn new(config: Arc<DashboardConfig>) -> Self {
        let flow_graph = FlowGraphBuilder::new(config.flow_graph.stages.clone());
        Self {
            config,
            enrichment: EnrichmentEngine::new(),
            aggregation: AggregationEngine::new(),
            flow_graph,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ==========================================
    // 物料流视图
    // ==========================================

    /// 组装物料流视图
    ///
    /// # 返回
    /// - Ok(MaterialFlowView)
    /// - Err(ApiError::InvalidInput / InvalidDateRange): 区间参数非法
    #[instrument(skip(self, ctx), fields(load_id = %ctx.load_id))]
    pub fn material_flow_view(
        &self,
        ctx: &DataContext,
        query: &MaterialFlowQuery,
    ) -> ApiResult<MaterialFlowView> {
        let enriched =
            self.enrichment
                .enrich_batches(&ctx.batches, &ctx.materials, &ctx.sources, &ctx.outputs);

        let dates = collect_valid_dates(&enriched);
        let range = resolve_range(
            query.from,
            query.to,
            &dates,
            self.config.material_flow.range_policy,
        )?;

        let facets = Facets::with_sentinel(self.config.all_sentinel.as_str());
        let batches = filter_by_range(&enriched, range.as_ref(), &facets);
        let kpis = self.aggregation.material_flow_kpis(&batches);
        let flow_graph = self.flow_graph.outcome(&batches);

        info!(
            enriched = enriched.len(),
            in_range = batches.len(),
            "物料流视图组装完成"
        );

        Ok(MaterialFlowView {
            load_id: ctx.load_id,
            range,
            available_dates: available_dates(&enriched),
            kpis,
            batches,
            flow_graph,
        })
    }

    // ==========================================
    // 订单/库存视图
    // ==========================================

    /// 组装订单/库存视图
    ///
    /// # 规则
    /// - 默认区间由订单交付日期与库存补货日期共同推算
    /// - 上期区间为当前区间整体前移 comparison_shift_days 天,分面条件相同
    /// - 热力图与预测折线只基于当前区间
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 区间参数非法,或环比区间超出可表示日期范围
    #[instrument(skip(self, ctx), fields(load_id = %ctx.load_id))]
    pub fn order_tracker_view(
        &self,
        ctx: &DataContext,
        query: &OrderTrackerQuery,
    ) -> ApiResult<OrderTrackerView> {
        let mut dates = collect_valid_dates(&ctx.orders);
        dates.extend(collect_valid_dates(&ctx.inventory));
        let range = resolve_range(
            query.from,
            query.to,
            &dates,
            self.config.order_tracker.range_policy,
        )?;

        let sentinel = self.config.all_sentinel.as_str();
        let facets = Facets::with_sentinel(sentinel)
            .select(fields::REGION, selection(&query.region, sentinel))
            .select(fields::RISK_STATUS, selection(&query.risk_status, sentinel));

        let current = filter_by_range(&ctx.orders, range.as_ref(), &facets);
        let shift_days = self.config.order_tracker.comparison_shift_days;
        let previous_range = range
            .map(|r| {
                previous_period(&r, shift_days).ok_or_else(|| {
                    ApiError::InvalidInput(format!(
                        "环比区间超出可表示的日期范围: 前移 {} 天",
                        shift_days
                    ))
                })
            })
            .transpose()?;
        let previous = match previous_range.as_ref() {
            Some(prev) => filter_by_range(&ctx.orders, Some(prev), &facets),
            None => Vec::new(),
        };

        let kpis = self.aggregation.order_kpis(&current, &previous);
        let heatmap =
            self.aggregation
                .build_heatmap(&current, fields::DELIVERY_DUE_WEEK, fields::SKU);
        let forecast = self
            .aggregation
            .build_forecast_series(&ctx.forecasts, range.as_ref());

        info!(
            orders = current.len(),
            previous_orders = previous.len(),
            "订单视图组装完成"
        );

        Ok(OrderTrackerView {
            load_id: ctx.load_id,
            range,
            previous_range,
            region_options: facet_options(&ctx.orders, fields::REGION, sentinel),
            risk_options: facet_options(&ctx.orders, fields::RISK_STATUS, sentinel),
            order_count: current.len(),
            kpis,
            heatmap,
            forecast,
        })
    }

    // ==========================================
    // 流向图（未类型化输入）
    // ==========================================

    /// 由任意 JSON 构建流向图渲染状态（非数组输入为 Invalid）
    pub fn flow_graph_from_json(&self, input: &serde_json::Value) -> FlowGraphOutcome {
        self.flow_graph.outcome_from_json(input)
    }
}

fn selection(value: &Option<String>, sentinel: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(sentinel)
        .to_string()
}

/// 查询区间解析
///
/// - 起止均提供: 以自然日构造,起点晚于终点为错误
/// - 均未提供: 按策略推算（无有效日期时为 None）
/// - 只提供一端: 错误
fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    dates: &[NaiveDateTime],
    policy: DateRangePolicy,
) -> ApiResult<Option<DateRange>> {
    match (from, to) {
        (Some(from), Some(to)) => DateRange::from_days(from, to)
            .map(Some)
            .ok_or_else(|| ApiError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            }),
        (None, None) => Ok(default_range(dates, policy)),
        _ => Err(ApiError::InvalidInput(
            "日期区间的起点和终点必须同时提供".to_string(),
        )),
    }
}
