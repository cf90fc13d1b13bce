// ==========================================
// 物料流追溯看板 - 领域模型层
// ==========================================
// 职责: 定义表格记录、值类型、视图模型
// 红线: 不含文件读取逻辑,不含聚合计算逻辑
// ==========================================

pub mod cell;
pub mod records;
pub mod types;
pub mod view;

// 重导出核心类型
pub use cell::{CellValue, RawRow};
pub use records::{
    fields, BatchKeyed, BatchRecord, EnrichedBatch, ForecastRecord, InventoryRecord,
    MaterialRecord, OrderRecord, OutputRecord, SourceRecord, TabularRecord,
};
pub use types::{DateRange, DateRangePolicy, ParsedDate, RiskBucket, RiskStatus};
pub use view::{
    FlowGraphOutcome, ForecastPoint, ForecastSeries, HeatmapMatrix, HeatmapRow,
    MaterialFlowKpis, OrderKpis, SankeyGraph, SankeyLink, SankeyNode,
};
