// ==========================================
// 物料流追溯看板 - 应用状态
// ==========================================
// 职责: 持有看板 API 与当前数据上下文,管理载入/刷新生命周期
// 生命周期: NotLoaded → Ready | Failed,refresh 整体替换
// ==========================================

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::{
    ApiError, ApiResult, DashboardApi, MaterialFlowQuery, MaterialFlowView, OrderTrackerQuery,
    OrderTrackerView,
};
use crate::config::config_manager::ConfigManager;
use crate::config::data_source_reader::DataSourceConfigReader;
use crate::importer::data_loader::{DataContext, DataLoader};

pub use crate::config::config_manager::get_default_config_path;

/// 数据载入状态
#[derive(Debug, Clone)]
pub enum LoadState {
    NotLoaded,
    Ready(Arc<DataContext>),
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    fn context(&self) -> ApiResult<Arc<DataContext>> {
        match self {
            LoadState::Ready(ctx) => Ok(Arc::clone(ctx)),
            LoadState::NotLoaded => Err(ApiError::DataNotReady("数据尚未载入".to_string())),
            LoadState::Failed(reason) => Err(ApiError::DataNotReady(format!(
                "最近一次载入失败: {}",
                reason
            ))),
        }
    }
}

/// 应用状态
///
/// 包含看板API、数据载入器和当前数据上下文
pub struct AppState<C = ConfigManager>
where
    C: DataSourceConfigReader,
{
    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    loader: DataLoader<C>,
    state: RwLock<LoadState>,
}

impl AppState<ConfigManager> {
    /// 由配置管理器创建AppState（数据尚未载入）
    pub fn from_config_manager(manager: ConfigManager) -> Self {
        let config = Arc::new(manager.config().clone());
        Self::new(Arc::new(manager), Arc::new(DashboardApi::new(config)))
    }
}

impl<C> AppState<C>
where
    C: DataSourceConfigReader,
{
    pub fn new(config_reader: Arc<C>, dashboard_api: Arc<DashboardApi>) -> Self {
        tracing::info!("初始化AppState");
        Self {
            dashboard_api,
            loader: DataLoader::new(config_reader),
            state: RwLock::new(LoadState::NotLoaded),
        }
    }

    /// 当前载入状态快照
    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.clone()
    }

    /// 重新载入全部数据表
    ///
    /// # 说明
    /// - 成功: 以新的数据上下文整体替换
    /// - 失败: 状态置为 Failed,旧数据不再对外提供
    pub async fn refresh(&self) -> ApiResult<Arc<DataContext>> {
        match self.loader.load_all().await {
            Ok(ctx) => {
                let ctx = Arc::new(ctx);
                *self.state.write().await = LoadState::Ready(Arc::clone(&ctx));
                tracing::info!(load_id = %ctx.load_id, "数据上下文已刷新");
                Ok(ctx)
            }
            Err(e) => {
                tracing::error!(error = %e, "数据载入失败");
                *self.state.write().await = LoadState::Failed(e.to_string());
                Err(ApiError::Import(e))
            }
        }
    }

    pub async fn material_flow_view(&self, query: &MaterialFlowQuery) -> ApiResult<MaterialFlowView> {
        let ctx = self.state.read().await.context()?;
        self.dashboard_api.material_flow_view(&ctx, query)
    }

    pub async fn order_tracker_view(&self, query: &OrderTrackerQuery) -> ApiResult<OrderTrackerView> {
        let ctx = self.state.read().await.context()?;
        self.dashboard_api.order_tracker_view(&ctx, query)
    }
}
