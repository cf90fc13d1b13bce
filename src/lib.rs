// ==========================================
// 物料流追溯看板 - 核心库
// ==========================================
// 技术栈: Rust + Tokio + calamine/csv
// 系统定位: 表格数据 → 看板视图模型的聚合层
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与视图模型
pub mod domain;

// 引擎层 - 富化/过滤/聚合/流向图
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 看板配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 视图组装
pub mod api;

// 应用层 - 数据上下文生命周期
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DateRange, DateRangePolicy, ParsedDate, RiskBucket, RiskStatus};

// 领域实体
pub use domain::{
    BatchRecord, CellValue, EnrichedBatch, ForecastRecord, InventoryRecord, MaterialRecord,
    OrderRecord, OutputRecord, RawRow, SourceRecord,
};

// 视图模型
pub use domain::{
    FlowGraphOutcome, ForecastSeries, HeatmapMatrix, MaterialFlowKpis, OrderKpis, SankeyGraph,
};

// 引擎
pub use engine::{AggregationEngine, EnrichmentEngine, FlowGraphBuilder, StageSpec};

// API
pub use api::{DashboardApi, MaterialFlowQuery, OrderTrackerQuery};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物料流追溯看板";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
