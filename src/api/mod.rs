// ==========================================
// 物料流追溯看板 - API 层
// ==========================================
// 职责: 提供看板视图组装接口,供 CLI / 应用状态调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{
    DashboardApi, MaterialFlowQuery, MaterialFlowView, OrderTrackerQuery, OrderTrackerView,
};
pub use error::{ApiError, ApiResult};
