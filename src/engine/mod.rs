// ==========================================
// 物料流追溯看板 - 引擎层
// ==========================================
// 职责: 富化、过滤、聚合、流向图构建
// 红线: 引擎均为纯计算,不做 IO,不持有可变状态
// ==========================================

pub mod aggregation;
pub mod enrichment;
pub mod flow_graph;
pub mod range_filter;

// 重导出核心引擎
pub use aggregation::{
    deviation_ratio, period_over_period_delta, sum_field, AggregationEngine,
};
pub use enrichment::{EnrichmentEngine, MergeLayer, ENRICHMENT_MERGE_ORDER};
pub use flow_graph::{FlowGraphBuilder, StageSpec};
pub use range_filter::{
    available_dates, collect_valid_dates, default_range, facet_options, filter_by_range,
    previous_period, Facets, DEFAULT_ALL_SENTINEL,
};
