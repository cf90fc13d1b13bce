// ==========================================
// DataLoader 集成测试
// ==========================================
// 测试目标: 七张数据表并发载入、主键别名归一、整体失败语义
// ==========================================

mod helpers;

use helpers::mock_config::MockConfig;
use helpers::test_data_builder::*;
use std::sync::Arc;
use supply_trace_analytics::config::TableKind;
use supply_trace_analytics::domain::CellValue;
use supply_trace_analytics::engine::EnrichmentEngine;
use supply_trace_analytics::importer::{DataLoader, ImportError};
use supply_trace_analytics::logging;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_all_完整数据集() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let loader = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())));
    let ctx = loader.load_all().await.expect("载入失败");

    assert_eq!(ctx.batches.len(), 2);
    assert_eq!(ctx.materials.len(), 2);
    assert_eq!(ctx.sources.len(), 2);
    assert_eq!(ctx.outputs.len(), 2);
    assert_eq!(ctx.orders.len(), 3);
    assert_eq!(ctx.inventory.len(), 1);
    assert_eq!(ctx.forecasts.len(), 3);

    assert_eq!(ctx.report.tables.len(), 7);
    assert_eq!(ctx.report.total_rows(), 15);
}

#[tokio::test]
async fn test_load_all_缺主键行被跳过并记录() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let ctx = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())))
        .load_all()
        .await
        .unwrap();

    let batches = ctx.report.table(TableKind::Batches).unwrap();
    assert_eq!(batches.rows, 2);
    assert_eq!(batches.skipped_rows, vec![3]);
    assert!(batches.path.ends_with("batches.csv"));

    let orders = ctx.report.table(TableKind::Orders).unwrap();
    assert!(orders.skipped_rows.is_empty());
}

#[tokio::test]
async fn test_load_all_主键别名归一() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let ctx = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())))
        .load_all()
        .await
        .unwrap();

    // sources.csv 表头为 batch_id
    let ids: Vec<&str> = ctx.sources.iter().map(|s| s.batch_id.as_str()).collect();
    assert_eq!(ids, vec!["B1", "B2"]);
    assert_eq!(ctx.sources[0].row.text("batchId").as_deref(), Some("B1"));
}

#[tokio::test]
async fn test_load_all_保留原始单元格类型() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let ctx = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())))
        .load_all()
        .await
        .unwrap();

    assert_eq!(ctx.forecasts[0].date, CellValue::Number(45419.0));
    assert_eq!(ctx.forecasts[0].projected_tonnage, 12.5);
    assert_eq!(
        ctx.batches[1].row.get("rawMaterialQty"),
        Some(&CellValue::Text("80%".to_string()))
    );
}

#[tokio::test]
async fn test_load_all_每次载入生成新的load_id() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let loader = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())));
    let first = loader.load_all().await.unwrap();
    let second = loader.load_all().await.unwrap();

    assert_ne!(first.load_id, second.load_id);
    assert_eq!(first.batches, second.batches);
}

#[tokio::test]
async fn test_load_all_任一数据表缺失则整体失败() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    std::fs::remove_file(dir.path().join("inventory.json")).unwrap();

    let result = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())))
        .load_all()
        .await;

    match result {
        Err(ImportError::TableLoadFailed { table, .. }) => assert_eq!(table, "inventory"),
        other => panic!("expected TableLoadFailed, got {:?}", other.map(|c| c.load_id)),
    }
}

#[tokio::test]
async fn test_load_all_格式错误的json整体失败() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    write_file(dir.path(), "orders.json", "{ not json");

    let result = DataLoader::new(Arc::new(MockConfig::in_dir(dir.path())))
        .load_all()
        .await;

    assert!(matches!(result, Err(ImportError::TableLoadFailed { .. })));
}

#[tokio::test]
async fn test_load_all_配置不可读() {
    let result = DataLoader::new(Arc::new(MockConfig::broken())).load_all().await;
    assert!(matches!(result, Err(ImportError::ConfigReadError { .. })));
}

#[tokio::test]
async fn test_load_all_前导零标识跨格式可关联() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    write_file(dir.path(), "batches.csv", "batchId,rawMaterialQty\n007,120\n");
    write_file(
        dir.path(),
        "sources.json",
        r#"[{"batchId":"007","sourceName":"Harbor Depot","collectedQty":100}]"#,
    );
    let mut config = MockConfig::in_dir(dir.path());
    config.data.sources = "sources.json".to_string();

    let ctx = DataLoader::new(Arc::new(config)).load_all().await.unwrap();

    assert_eq!(ctx.batches[0].batch_id, "007");
    assert_eq!(ctx.sources[0].batch_id, "007");
    let enriched =
        EnrichmentEngine::new().enrich_batches(&ctx.batches, &ctx.materials, &ctx.sources, &ctx.outputs);
    assert_eq!(enriched[0].collected_qty, 100.0);
}
