// ==========================================
// 物料流追溯看板 - 看板配置项
// ==========================================
// 职责: 数据源文件、默认区间策略、流向图阶段链、分面哨兵值
// 存储: JSON 配置文件,缺省字段取默认值
// ==========================================

use crate::domain::types::DateRangePolicy;
use crate::engine::flow_graph::StageSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ==========================================
// 数据表种类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Batches,
    Materials,
    Sources,
    ProcessingOutputs,
    Orders,
    Inventory,
    InventoryForecast,
}

impl TableKind {
    pub const ALL: [TableKind; 7] = [
        TableKind::Batches,
        TableKind::Materials,
        TableKind::Sources,
        TableKind::ProcessingOutputs,
        TableKind::Orders,
        TableKind::Inventory,
        TableKind::InventoryForecast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Batches => "batches",
            TableKind::Materials => "materials",
            TableKind::Sources => "sources",
            TableKind::ProcessingOutputs => "processing_outputs",
            TableKind::Orders => "orders",
            TableKind::Inventory => "inventory",
            TableKind::InventoryForecast => "inventory_forecast",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 数据源配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub data_dir: PathBuf,
    pub batches: String,
    pub materials: String,
    pub sources: String,
    pub processing_outputs: String,
    pub orders: String,
    pub inventory: String,
    pub inventory_forecast: String,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            batches: "batches.xlsx".to_string(),
            materials: "materials.xlsx".to_string(),
            sources: "sources.xlsx".to_string(),
            processing_outputs: "processing_outputs.xlsx".to_string(),
            orders: "orders.json".to_string(),
            inventory: "inventory.json".to_string(),
            inventory_forecast: "inventory_forecast.json".to_string(),
        }
    }
}

impl DataSourceConfig {
    /// 数据表文件的完整路径
    pub fn path_for(&self, table: TableKind) -> PathBuf {
        let file = match table {
            TableKind::Batches => &self.batches,
            TableKind::Materials => &self.materials,
            TableKind::Sources => &self.sources,
            TableKind::ProcessingOutputs => &self.processing_outputs,
            TableKind::Orders => &self.orders,
            TableKind::Inventory => &self.inventory,
            TableKind::InventoryForecast => &self.inventory_forecast,
        };
        self.data_dir.join(file)
    }
}

// ==========================================
// 视图配置
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialFlowConfig {
    pub range_policy: DateRangePolicy,
}

impl Default for MaterialFlowConfig {
    fn default() -> Self {
        Self {
            range_policy: DateRangePolicy::trailing_week(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTrackerConfig {
    pub range_policy: DateRangePolicy,
    /// 环比区间向前平移的天数
    pub comparison_shift_days: i64,
}

impl Default for OrderTrackerConfig {
    fn default() -> Self {
        Self {
            range_policy: DateRangePolicy::FullSpan,
            comparison_shift_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowGraphConfig {
    pub stages: Vec<StageSpec>,
}

impl Default for FlowGraphConfig {
    fn default() -> Self {
        Self {
            stages: StageSpec::five_stage_chain(),
        }
    }
}

/// 区间天数配置的上限（约一百年）
pub const MAX_CONFIG_DAYS: i64 = 36_600;

// ==========================================
// DashboardConfig - 看板总配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataSourceConfig,
    pub material_flow: MaterialFlowConfig,
    pub order_tracker: OrderTrackerConfig,
    pub flow_graph: FlowGraphConfig,
    /// 分面 "全部" 哨兵值
    pub all_sentinel: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: DataSourceConfig::default(),
            material_flow: MaterialFlowConfig::default(),
            order_tracker: OrderTrackerConfig::default(),
            flow_graph: FlowGraphConfig::default(),
            all_sentinel: "All".to_string(),
        }
    }
}

impl DashboardConfig {
    /// 校验天数类配置
    ///
    /// # 返回
    /// - Err((键名, 说明)): 第一个越界的配置项
    pub fn validate(&self) -> Result<(), (String, String)> {
        let shift = self.order_tracker.comparison_shift_days;
        if !(0..=MAX_CONFIG_DAYS).contains(&shift) {
            return Err((
                "order_tracker.comparison_shift_days".to_string(),
                format!("{} 超出 0..={}", shift, MAX_CONFIG_DAYS),
            ));
        }

        let policies = [
            ("material_flow.range_policy.days", self.material_flow.range_policy),
            ("order_tracker.range_policy.days", self.order_tracker.range_policy),
        ];
        for (key, policy) in policies {
            if let DateRangePolicy::TrailingWindow { days } = policy {
                if !(0..=MAX_CONFIG_DAYS).contains(&days) {
                    return Err((
                        key.to_string(),
                        format!("{} 超出 0..={}", days, MAX_CONFIG_DAYS),
                    ));
                }
            }
        }
        Ok(())
    }
}
