// ==========================================
// 物料流追溯看板 - 视图模型
// ==========================================
// 职责: 渲染层消费的派生结果（只读输出）
// 红线: 颜色、交互等展示细节不进入视图模型
// ==========================================

use crate::domain::types::RiskBucket;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// ==========================================
// Sankey 流向图
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SankeyNode {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// 节点按 id 去重、连线按 (source, target) 去重求和
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.links.is_empty()
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&SankeyLink> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
    }
}

/// 流向图渲染状态
///
/// - `Invalid`: 输入不是批次数组
/// - `Empty`: 没有可展示的流向
/// - `Graph`: 正常图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "graph", rename_all = "snake_case")]
pub enum FlowGraphOutcome {
    Invalid,
    Empty,
    Graph(SankeyGraph),
}

impl FlowGraphOutcome {
    pub fn from_graph(graph: SankeyGraph) -> Self {
        if graph.is_empty() {
            FlowGraphOutcome::Empty
        } else {
            FlowGraphOutcome::Graph(graph)
        }
    }
}

// ==========================================
// 风险热力图（周 × SKU）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRow {
    pub week: String,
    /// 按 SKU 出现顺序排列的 (sku, 平均风险分)
    pub cells: Vec<(String, f64)>,
}

impl HeatmapRow {
    pub fn value(&self, sku: &str) -> Option<f64> {
        self.cells.iter().find(|(s, _)| s == sku).map(|(_, v)| *v)
    }
}

// 输出为 {"week": "W1", "<sku>": <score>, ...}
impl Serialize for HeatmapRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry("week", &self.week)?;
        for (sku, score) in &self.cells {
            map.serialize_entry(sku, score)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub weeks: Vec<String>,
    pub skus: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

impl HeatmapMatrix {
    pub fn cell(&self, week: &str, sku: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.week == week)
            .and_then(|r| r.value(sku))
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }

    /// 单元格着色分档（展示辅助）
    pub fn bucket(&self, week: &str, sku: &str) -> Option<RiskBucket> {
        self.cell(week, sku).map(RiskBucket::from_score)
    }
}

// ==========================================
// 预测折线（按 SKU 分组）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub x: String, // ISO 日历日期 YYYY-MM-DD
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub id: String, // sku
    pub data: Vec<ForecastPoint>,
}

// ==========================================
// KPI
// ==========================================

/// 订单风险 KPI（当前区间 vs 上一周期）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderKpis {
    pub total_value: f64,
    pub total_quantity: f64,
    pub previous_total_value: f64,
    pub previous_total_quantity: f64,
    pub value_delta_pct: f64,
    pub quantity_delta_pct: f64,
}

/// 物料流 KPI（实际 vs 预测）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterialFlowKpis {
    pub total_in: f64,
    pub forecast_in: f64,
    pub total_out: f64,
    pub forecast_out: f64,
    pub yield_actual: f64,
    pub yield_forecast: f64,
    pub in_vs_forecast_pct: f64,
    pub in_deviation: Option<f64>,
    pub out_deviation: Option<f64>,
}
