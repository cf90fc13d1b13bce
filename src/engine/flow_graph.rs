// ==========================================
// 物料流追溯看板 - 流向图构建器
// ==========================================
// 职责: 富化批次 → 多阶段 Sankey 流向图
// 输入: 批次记录（类型化或未类型化 JSON）
// 输出: FlowGraphOutcome（Invalid / Empty / Graph）
// 红线: 非数组输入返回 Invalid,不抛错；权重为 0 的批次不产生节点与连线
// ==========================================

use crate::domain::cell::{CellValue, RawRow};
use crate::domain::records::{fields, TabularRecord};
use crate::domain::view::{FlowGraphOutcome, SankeyGraph, SankeyLink, SankeyNode};
use crate::importer::field_mapper::UNKNOWN_KEY;
use crate::importer::normalizer::parse_quantity;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

// ==========================================
// StageSpec - 阶段定义
// ==========================================
// 节点 id 为 "<label>: <取值>",取值为 field 或 fallback 中第一个有值的文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub label: String,
    pub field: String,
    #[serde(default)]
    pub fallback: Option<String>,
}

impl StageSpec {
    pub fn new(label: &str, field: &str, fallback: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            fallback: fallback.map(str::to_string),
        }
    }

    /// 标准五阶段链: 来源 → 收集 → 分拣 → 再生 → 发运
    pub fn five_stage_chain() -> Vec<StageSpec> {
        vec![
            StageSpec::new("Origin", "sourceName", None),
            StageSpec::new("Collection", "collectionLocation", Some("sourceName")),
            StageSpec::new("Categorization", "categorizedLocation", Some("destination")),
            StageSpec::new("Recycling", "recyclingLocation", Some("categorizedLocation")),
            StageSpec::new("Dispatch", "destination", Some("dispatchLocation")),
        ]
    }

    fn node_id<T: TabularRecord>(&self, record: &T) -> String {
        let picked = std::iter::once(self.field.as_str())
            .chain(self.fallback.as_deref())
            .filter_map(|name| record.field(name))
            .find(|cell| cell.is_truthy());

        let value = picked
            .and_then(CellValue::as_trimmed_str)
            .unwrap_or(UNKNOWN_KEY);
        format!("{}: {}", self.label, value)
    }
}

// ==========================================
// FlowGraphBuilder - 流向图构建器
// ==========================================
pub struct FlowGraphBuilder {
    stages: Vec<StageSpec>,
}

impl Default for FlowGraphBuilder {
    fn default() -> Self {
        Self::new(StageSpec::five_stage_chain())
    }
}

impl FlowGraphBuilder {
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self { stages }
    }

    /// 构建流向图
    ///
    /// # 规则
    /// - 每个批次生成一条阶段链,相邻阶段之间一条连线
    /// - 权重: 数值型 categorizedQty 优先,非数值时回退 rawMaterialQty；为 0 则跳过该批次
    /// - 节点按 id 去重、连线按 (source, target) 去重累加,保持首次出现顺序
    /// - 累加后的连线值保留 2 位小数
    #[instrument(skip_all, fields(batches = batches.len(), stages = self.stages.len()))]
    pub fn build<T: TabularRecord>(&self, batches: &[T]) -> SankeyGraph {
        let mut nodes: Vec<SankeyNode> = Vec::new();
        let mut node_seen: HashSet<String> = HashSet::new();
        let mut links: Vec<(String, String, f64)> = Vec::new();
        let mut link_index: HashMap<(String, String), usize> = HashMap::new();
        let mut skipped = 0usize;

        for batch in batches {
            let Some(weight) = flow_weight(batch) else {
                skipped += 1;
                continue;
            };

            let chain: Vec<String> = self.stages.iter().map(|s| s.node_id(batch)).collect();

            for id in &chain {
                if node_seen.insert(id.clone()) {
                    nodes.push(SankeyNode { id: id.clone() });
                }
            }

            for pair in chain.windows(2) {
                let key = (pair[0].clone(), pair[1].clone());
                match link_index.get(&key) {
                    Some(&idx) => links[idx].2 += weight,
                    None => {
                        link_index.insert(key.clone(), links.len());
                        links.push((key.0, key.1, weight));
                    }
                }
            }
        }

        let links: Vec<SankeyLink> = links
            .into_iter()
            .map(|(source, target, value)| SankeyLink {
                source,
                target,
                value: round2(value),
            })
            .collect();

        debug!(nodes = nodes.len(), links = links.len(), skipped, "流向图构建完成");
        SankeyGraph { nodes, links }
    }

    /// 构建流向图并给出渲染状态
    pub fn outcome<T: TabularRecord>(&self, batches: &[T]) -> FlowGraphOutcome {
        FlowGraphOutcome::from_graph(self.build(batches))
    }

    /// 从未类型化输入构建
    ///
    /// - 非数组: Invalid
    /// - 数组中的非对象元素按空行处理（无权重,被跳过）
    pub fn outcome_from_json(&self, input: &serde_json::Value) -> FlowGraphOutcome {
        let Some(items) = input.as_array() else {
            warn!("流向图输入不是批次数组");
            return FlowGraphOutcome::Invalid;
        };

        let rows: Vec<RawRow> = items
            .iter()
            .map(|item| {
                item.as_object()
                    .map(RawRow::from_json_object)
                    .unwrap_or_default()
            })
            .collect();
        self.outcome(&rows)
    }
}

/// 批次流量权重
///
/// categorizedQty 为数值时直接采用（含 0）；否则解析 categorizedQty,为空再取 rawMaterialQty
fn flow_weight<T: TabularRecord>(batch: &T) -> Option<f64> {
    let weight = match batch.field(fields::CATEGORIZED_QTY) {
        Some(CellValue::Number(qty)) => *qty,
        categorized => categorized
            .filter(|cell| cell.is_truthy())
            .or_else(|| batch.field(fields::RAW_MATERIAL_QTY))
            .map(parse_quantity)
            .unwrap_or(0.0),
    };
    (weight.is_finite() && weight != 0.0).then_some(weight)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
