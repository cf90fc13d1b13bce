// ==========================================
// 物料流追溯看板 - 批次富化引擎
// ==========================================
// 职责: 批次 ⊕ 物料 ⊕ 来源 ⊕ 产出 → 富化批次
// 输入: 四类以 batchId 关联的记录
// 输出: 每个批次一条 EnrichedBatch（派生收集量、分拣量、得率、日期）
// 红线: 纯函数,无隐藏状态；缺关联记录按空行处理,不报错
// ==========================================

use crate::domain::cell::{CellValue, RawRow};
use crate::domain::records::{
    fields, BatchKeyed, BatchRecord, EnrichedBatch, MaterialRecord, OutputRecord, SourceRecord,
};
use crate::importer::normalizer::{parse_date, parse_quantity, parse_quantity_opt};
use std::collections::HashMap;
use tracing::{debug, instrument};

// ==========================================
// 合并层次
// ==========================================
// 后出现的层覆盖先出现的层的同名列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeLayer {
    Batch,    // 批次原始列
    Computed, // 派生数量列（collectedQty / categorizedQty / yieldPercentage）
    Material,
    Source,
    Output,
}

/// 固定合并顺序: 物料 < 来源 < 产出
pub const ENRICHMENT_MERGE_ORDER: [MergeLayer; 5] = [
    MergeLayer::Batch,
    MergeLayer::Computed,
    MergeLayer::Material,
    MergeLayer::Source,
    MergeLayer::Output,
];

/// 日期派生优先级: 来源发运日期 → 产出分拣日期 → 收集点接收日期
const DATE_PRIORITY: [(MergeLayer, &str); 3] = [
    (MergeLayer::Source, fields::DATE_OF_DISPATCH),
    (MergeLayer::Output, fields::DATE_OF_CATEGORIZATION),
    (MergeLayer::Source, fields::DATE_RECEIVED_AT_COLLECTION),
];

// ==========================================
// EnrichmentEngine - 批次富化引擎
// ==========================================
pub struct EnrichmentEngine {
    merge_order: Vec<MergeLayer>,
}

impl Default for EnrichmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 单个批次的各层原始行
struct LayerRows<'a> {
    batch: &'a RawRow,
    computed: RawRow,
    material: &'a RawRow,
    source: &'a RawRow,
    output: &'a RawRow,
}

impl<'a> LayerRows<'a> {
    fn layer(&self, layer: MergeLayer) -> &RawRow {
        match layer {
            MergeLayer::Batch => self.batch,
            MergeLayer::Computed => &self.computed,
            MergeLayer::Material => self.material,
            MergeLayer::Source => self.source,
            MergeLayer::Output => self.output,
        }
    }
}

impl EnrichmentEngine {
    pub fn new() -> Self {
        Self {
            merge_order: ENRICHMENT_MERGE_ORDER.to_vec(),
        }
    }

    pub fn merge_order(&self) -> &[MergeLayer] {
        &self.merge_order
    }

    /// 富化批次
    ///
    /// # 规则
    /// - 关联: 各表按 batchId 取第一条匹配,无匹配时为空行
    /// - 派生列先于物料/来源/产出各层写入,同名列被后续层覆盖
    /// - 得率: 分拣量 / 收集量 × 100,两者均为正时有效,否则为 0
    /// - 日期: 按 DATE_PRIORITY 取第一个有值的字段
    #[instrument(skip_all, fields(batches = batches.len()))]
    pub fn enrich_batches(
        &self,
        batches: &[BatchRecord],
        materials: &[MaterialRecord],
        sources: &[SourceRecord],
        outputs: &[OutputRecord],
    ) -> Vec<EnrichedBatch> {
        let material_index = first_match_index(materials);
        let source_index = first_match_index(sources);
        let output_index = first_match_index(outputs);
        let empty = RawRow::new();

        let enriched: Vec<EnrichedBatch> = batches
            .iter()
            .map(|batch| {
                let key = batch.batch_id();
                let source = source_index.get(key).copied().unwrap_or(&empty);
                let output = output_index.get(key).copied().unwrap_or(&empty);
                let layers = LayerRows {
                    batch: batch.row(),
                    computed: computed_quantities(source, output),
                    material: material_index.get(key).copied().unwrap_or(&empty),
                    source,
                    output,
                };
                self.merge(key, &layers)
            })
            .collect();

        debug!(enriched = enriched.len(), "批次富化完成");
        enriched
    }

    fn merge(&self, batch_id: &str, layers: &LayerRows<'_>) -> EnrichedBatch {
        let mut merged = RawRow::new();
        for layer in &self.merge_order {
            merged.overlay(layers.layer(*layer));
        }

        let parsed_date = DATE_PRIORITY
            .iter()
            .find_map(|(layer, field)| {
                layers
                    .layer(*layer)
                    .get(field)
                    .filter(|cell| cell.is_truthy())
            })
            .and_then(parse_date);

        EnrichedBatch {
            batch_id: batch_id.to_string(),
            collected_qty: parse_quantity_opt(merged.get(fields::COLLECTED_QTY)),
            categorized_qty: parse_quantity_opt(merged.get(fields::CATEGORIZED_QTY)),
            yield_percentage: parse_quantity_opt(merged.get(fields::YIELD_PERCENTAGE)),
            fields: merged,
            parsed_date,
        }
    }
}

/// batchId → 第一条匹配记录
fn first_match_index<T: BatchKeyed>(records: &[T]) -> HashMap<&str, &RawRow> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        index.entry(record.batch_id()).or_insert(record.row());
    }
    index
}

/// 派生数量列
fn computed_quantities(source: &RawRow, output: &RawRow) -> RawRow {
    let collected = parse_quantity(
        source
            .first_truthy(&fields::COLLECTED_QTY_ALIASES)
            .unwrap_or(&CellValue::Empty),
    );
    let categorized = parse_quantity_opt(output.get(fields::CATEGORIZED_QTY));
    let yield_percentage = if collected > 0.0 && categorized > 0.0 {
        categorized / collected * 100.0
    } else {
        0.0
    };

    RawRow::new()
        .with(fields::COLLECTED_QTY, collected)
        .with(fields::CATEGORIZED_QTY, categorized)
        .with(fields::YIELD_PERCENTAGE, yield_percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ParsedDate;
    use chrono::NaiveDate;

    fn batch(id: &str) -> BatchRecord {
        BatchRecord::new(id, RawRow::new().with("batchId", id))
    }

    #[test]
    fn test_yield_from_source_and_output() {
        let sources = vec![SourceRecord::new(
            "B1",
            RawRow::new().with("batchId", "B1").with("collectedQty", "100"),
        )];
        let outputs = vec![OutputRecord::new(
            "B1",
            RawRow::new().with("batchId", "B1").with("categorizedQty", 50.0),
        )];

        let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &outputs);

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].collected_qty, 100.0);
        assert_eq!(enriched[0].categorized_qty, 50.0);
        assert_eq!(enriched[0].yield_percentage, 50.0);
        assert_eq!(enriched[0].parsed_date, None);
    }

    #[test]
    fn test_collected_alias_feeds_yield() {
        let sources = vec![SourceRecord::new(
            "B1",
            RawRow::new().with("collected_quantity", "80%"),
        )];
        let outputs = vec![OutputRecord::new("B1", RawRow::new().with("categorizedQty", "20"))];

        let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &outputs);

        assert_eq!(enriched[0].collected_qty, 80.0);
        assert_eq!(enriched[0].yield_percentage, 25.0);
    }

    #[test]
    fn test_output_layer_wins_conflicts() {
        let materials = vec![MaterialRecord::new("B1", RawRow::new().with("grade", "material"))];
        let sources = vec![SourceRecord::new("B1", RawRow::new().with("grade", "source"))];
        let outputs = vec![OutputRecord::new("B1", RawRow::new().with("grade", "output"))];

        let enriched =
            EnrichmentEngine::new().enrich_batches(&[batch("B1")], &materials, &sources, &outputs);

        assert_eq!(enriched[0].fields.text("grade").as_deref(), Some("output"));
    }

    #[test]
    fn test_date_priority_prefers_dispatch_date() {
        let sources = vec![SourceRecord::new(
            "B1",
            RawRow::new()
                .with("dateOfDispatchFromSource", "")
                .with("dateReceivedAtCollection", "2024-05-03"),
        )];
        let outputs = vec![OutputRecord::new(
            "B1",
            RawRow::new().with("dateOfCategorization", "2024-05-02"),
        )];

        let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &outputs);

        let expected = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(enriched[0].parsed_date, Some(ParsedDate::Valid(expected)));
    }

    #[test]
    fn test_missing_partners_default_to_zero() {
        let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B9")], &[], &[], &[]);

        assert_eq!(enriched[0].collected_qty, 0.0);
        assert_eq!(enriched[0].categorized_qty, 0.0);
        assert_eq!(enriched[0].yield_percentage, 0.0);
        assert_eq!(enriched[0].fields.text("batchId").as_deref(), Some("B9"));
    }

    #[test]
    fn test_first_match_wins_on_duplicate_keys() {
        let sources = vec![
            SourceRecord::new("B1", RawRow::new().with("sourceName", "first")),
            SourceRecord::new("B1", RawRow::new().with("sourceName", "second")),
        ];

        let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &[]);

        assert_eq!(enriched[0].source_name().as_deref(), Some("first"));
    }
}
