// ==========================================
// 物料流追溯看板 - 配置管理器
// ==========================================
// 职责: 配置文件定位、加载、查询
// 存储: JSON 文件（缺失时使用默认配置）
// 定位顺序: 显式路径 → 环境变量 SUPPLY_TRACE_CONFIG → 用户配置目录
// ==========================================

use crate::config::dashboard_config::{DashboardConfig, DataSourceConfig};
use crate::config::data_source_reader::DataSourceConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "SUPPLY_TRACE_CONFIG";

/// 获取默认配置文件路径
///
/// 优先级:
/// 1. 环境变量 SUPPLY_TRACE_CONFIG
/// 2. 用户配置目录/supply-trace/config.json
/// 3. 当前目录 ./supply_trace_config.json
pub fn get_default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("supply-trace").join("config.json"),
        None => PathBuf::from("./supply_trace_config.json"),
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: DashboardConfig,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 由内存配置创建（测试与嵌入调用）
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            source_path: None,
        }
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式配置路径；None 时按默认顺序定位
    ///
    /// # 返回
    /// - 文件不存在: 默认配置
    /// - 文件存在但 JSON 非法,或天数配置越界: ConfigReadError
    pub fn load(path: Option<&Path>) -> ImportResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => get_default_config_path(),
        };

        if !path.exists() {
            info!(path = %path.display(), "配置文件不存在,使用默认配置");
            return Ok(Self::new(DashboardConfig::default()));
        }

        let content = std::fs::read_to_string(&path)?;
        let mut config: DashboardConfig =
            serde_json::from_str(&content).map_err(|e| ImportError::ConfigReadError {
                key: path.display().to_string(),
                message: e.to_string(),
            })?;
        config
            .validate()
            .map_err(|(key, message)| ImportError::ConfigReadError { key, message })?;

        // 相对数据目录以配置文件所在目录为基准
        if config.data.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data.data_dir = parent.join(&config.data.data_dir);
            }
        }

        info!(path = %path.display(), data_dir = %config.data.data_dir.display(), "配置加载完成");
        Ok(Self {
            config,
            source_path: Some(path),
        })
    }

    /// 加载配置,失败时回退默认配置
    pub fn load_or_default(path: Option<&Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "配置加载失败,回退默认配置");
            Self::new(DashboardConfig::default())
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

// ==========================================
// 实现 DataSourceConfigReader Trait
// ==========================================
#[async_trait]
impl DataSourceConfigReader for ConfigManager {
    async fn get_data_source_config(&self) -> ImportResult<DataSourceConfig> {
        Ok(self.config.data.clone())
    }
}
