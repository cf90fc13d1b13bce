// ==========================================
// 物料流追溯看板 - 应用层
// ==========================================
// 职责: 数据上下文生命周期,连接载入层与 API 层
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_config_path, AppState, LoadState};
