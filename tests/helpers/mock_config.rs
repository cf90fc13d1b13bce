// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use std::path::Path;
use supply_trace_analytics::config::{DataSourceConfig, DataSourceConfigReader};
use supply_trace_analytics::importer::{ImportError, ImportResult};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub data: DataSourceConfig,
    /// 为 true 时读取配置即失败
    pub broken: bool,
}

impl MockConfig {
    /// 数据表均位于 dir 下,使用 CSV/JSON 文件名
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            data: DataSourceConfig {
                data_dir: dir.to_path_buf(),
                batches: "batches.csv".to_string(),
                materials: "materials.csv".to_string(),
                sources: "sources.csv".to_string(),
                processing_outputs: "processing_outputs.csv".to_string(),
                orders: "orders.json".to_string(),
                inventory: "inventory.json".to_string(),
                inventory_forecast: "inventory_forecast.json".to_string(),
            },
            broken: false,
        }
    }

    /// 读取配置即失败的配置源
    pub fn broken() -> Self {
        Self {
            data: DataSourceConfig::default(),
            broken: true,
        }
    }
}

#[async_trait]
impl DataSourceConfigReader for MockConfig {
    async fn get_data_source_config(&self) -> ImportResult<DataSourceConfig> {
        if self.broken {
            return Err(ImportError::ConfigReadError {
                key: "data".to_string(),
                message: "mock 配置源不可用".to_string(),
            });
        }
        Ok(self.data.clone())
    }
}
