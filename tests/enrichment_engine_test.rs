// ==========================================
// EnrichmentEngine 引擎集成测试
// ==========================================
// 测试目标: 批次 ⊕ 物料 ⊕ 来源 ⊕ 产出 合并规则
// 覆盖范围: 派生数量、合并优先级、日期优先级、缺关联记录、幂等
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use supply_trace_analytics::domain::{ParsedDate, RawRow};
use supply_trace_analytics::engine::{EnrichmentEngine, MergeLayer, ENRICHMENT_MERGE_ORDER};

#[test]
fn test_enrich_batches_派生数量() {
    let batches = vec![batch("B1")];
    let sources = vec![source("B1", RawRow::new().with("collectedQty", "100"))];
    let outputs = vec![output("B1", RawRow::new().with("categorizedQty", 50.0))];

    let enriched = EnrichmentEngine::new().enrich_batches(&batches, &[], &sources, &outputs);

    assert_eq!(enriched.len(), 1);
    let b1 = &enriched[0];
    assert_eq!(b1.batch_id, "B1");
    assert_eq!(b1.collected_qty, 100.0);
    assert_eq!(b1.categorized_qty, 50.0);
    assert_eq!(b1.yield_percentage, 50.0);
}

#[test]
fn test_enrich_batches_合并顺序() {
    assert_eq!(
        ENRICHMENT_MERGE_ORDER,
        [
            MergeLayer::Batch,
            MergeLayer::Computed,
            MergeLayer::Material,
            MergeLayer::Source,
            MergeLayer::Output,
        ]
    );
    assert_eq!(EnrichmentEngine::new().merge_order(), &ENRICHMENT_MERGE_ORDER[..]);

    let batches = vec![batch_with("B1", RawRow::new().with("note", "batch"))];
    let materials = vec![material(
        "B1",
        RawRow::new().with("note", "material").with("composition", "PET"),
    )];
    let sources = vec![source(
        "B1",
        RawRow::new().with("note", "source").with("supplierName", "Depot"),
    )];
    let outputs = vec![output("B1", RawRow::new().with("note", "output"))];

    let enriched =
        EnrichmentEngine::new().enrich_batches(&batches, &materials, &sources, &outputs);
    let fields = &enriched[0].fields;

    assert_eq!(fields.text("note").as_deref(), Some("output"));
    assert_eq!(fields.text("composition").as_deref(), Some("PET"));
    assert_eq!(fields.text("supplierName").as_deref(), Some("Depot"));
}

#[test]
fn test_enrich_batches_产出自带得率列覆盖派生值() {
    let sources = vec![source("B1", RawRow::new().with("collectedQty", 100.0))];
    let outputs = vec![output(
        "B1",
        RawRow::new()
            .with("categorizedQty", 50.0)
            .with("yieldPercentage", "48.5%"),
    )];

    let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &outputs);

    assert_eq!(enriched[0].yield_percentage, 48.5);
}

#[test]
fn test_enrich_batches_非正数量得率为零() {
    let sources = vec![source("B1", RawRow::new().with("collectedQty", "-10"))];
    let outputs = vec![output("B1", RawRow::new().with("categorizedQty", 5.0))];

    let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &outputs);

    assert_eq!(enriched[0].collected_qty, -10.0);
    assert_eq!(enriched[0].yield_percentage, 0.0);
}

#[test]
fn test_enrich_batches_日期取产出分拣日期() {
    let sources = vec![source(
        "B1",
        RawRow::new().with("dateReceivedAtCollection", "2024-05-03"),
    )];
    let outputs = vec![output(
        "B1",
        RawRow::new().with("dateOfCategorization", "2024-05-02"),
    )];

    let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &outputs);

    assert_eq!(enriched[0].parsed_date, Some(ParsedDate::Valid(at(2024, 5, 2))));
}

#[test]
fn test_enrich_batches_无法解析的日期标记为无效() {
    let sources = vec![source(
        "B1",
        RawRow::new().with("dateOfDispatchFromSource", "not a date"),
    )];

    let enriched = EnrichmentEngine::new().enrich_batches(&[batch("B1")], &[], &sources, &[]);

    assert_eq!(enriched[0].parsed_date, Some(ParsedDate::Invalid));
}

#[test]
fn test_enrich_batches_缺关联记录不报错() {
    let batches = vec![batch("B1"), batch("B2")];
    let sources = vec![source("B1", RawRow::new().with("collectedQty", 10.0))];

    let enriched = EnrichmentEngine::new().enrich_batches(&batches, &[], &sources, &[]);

    assert_eq!(enriched.len(), 2);
    assert_eq!(enriched[1].batch_id, "B2");
    assert_eq!(enriched[1].collected_qty, 0.0);
    assert_eq!(enriched[1].yield_percentage, 0.0);
    assert_eq!(enriched[1].parsed_date, None);
}

#[test]
fn test_enrich_batches_幂等() {
    let batches = vec![batch("B1"), batch("B2")];
    let materials = vec![material("B2", RawRow::new().with("materialName", "HDPE"))];
    let sources = vec![source(
        "B1",
        RawRow::new()
            .with("collectedQty", "100")
            .with("dateOfDispatchFromSource", "2024-05-06"),
    )];
    let outputs = vec![output("B1", RawRow::new().with("categorizedQty", 50.0))];

    let engine = EnrichmentEngine::new();
    let first = engine.enrich_batches(&batches, &materials, &sources, &outputs);
    let second = engine.enrich_batches(&batches, &materials, &sources, &outputs);

    assert_eq!(first, second);
}
