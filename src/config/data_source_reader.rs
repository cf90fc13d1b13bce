// ==========================================
// 物料流追溯看板 - 数据源配置读取 Trait
// ==========================================
// 职责: 定义载入层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::dashboard_config::{DataSourceConfig, TableKind};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::PathBuf;

// ==========================================
// DataSourceConfigReader Trait
// ==========================================
// 实现者: ConfigManager（JSON 配置文件）,测试中为 MockConfig
#[async_trait]
pub trait DataSourceConfigReader: Send + Sync {
    /// 获取数据源配置
    async fn get_data_source_config(&self) -> ImportResult<DataSourceConfig>;

    /// 获取单张数据表的文件路径
    ///
    /// # 默认实现
    /// - data_dir + 表文件名
    async fn get_table_path(&self, table: TableKind) -> ImportResult<PathBuf> {
        Ok(self.get_data_source_config().await?.path_for(table))
    }
}
