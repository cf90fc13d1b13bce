// ==========================================
// 物料流追溯看板 - 配置层
// ==========================================
// 职责: 看板配置加载、数据源定位
// 存储: JSON 配置文件
// ==========================================

pub mod config_manager;
pub mod dashboard_config;
pub mod data_source_reader;

// 重导出核心配置管理器
pub use config_manager::{get_default_config_path, ConfigManager, CONFIG_PATH_ENV};
pub use dashboard_config::{
    DashboardConfig, DataSourceConfig, FlowGraphConfig, MaterialFlowConfig, OrderTrackerConfig,
    TableKind,
};
pub use data_source_reader::DataSourceConfigReader;
