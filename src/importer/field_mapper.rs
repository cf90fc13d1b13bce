// ==========================================
// 物料流追溯看板 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 类型化记录（列名别名 + 类型转换）
// 约定: 以 batchId 关联的表缺主键时跳过该行并记录行号
// ==========================================

use crate::domain::cell::{CellValue, RawRow};
use crate::domain::records::{
    fields, BatchRecord, ForecastRecord, InventoryRecord, MaterialRecord, OrderRecord,
    OutputRecord, SourceRecord,
};
use crate::domain::types::RiskStatus;
use crate::importer::error::ImportError;
use crate::importer::normalizer::{parse_date, parse_quantity_opt};
use tracing::warn;

/// 分组键缺失时的占位值
pub const UNKNOWN_KEY: &str = "Unknown";

/// 单表映射结果
#[derive(Debug, Clone, PartialEq)]
pub struct MappedTable<T> {
    pub records: Vec<T>,
    /// 被跳过的行号（从 1 开始,不含表头）
    pub skipped_rows: Vec<usize>,
}

impl<T> MappedTable<T> {
    fn all(records: Vec<T>) -> Self {
        Self {
            records,
            skipped_rows: Vec::new(),
        }
    }
}

pub struct FieldMapper;

impl FieldMapper {
    // ==========================================
    // 以 batchId 关联的四张表
    // ==========================================

    pub fn map_batches(&self, rows: Vec<RawRow>) -> MappedTable<BatchRecord> {
        self.map_batch_keyed("batches", rows, BatchRecord::new)
    }

    pub fn map_materials(&self, rows: Vec<RawRow>) -> MappedTable<MaterialRecord> {
        self.map_batch_keyed("materials", rows, MaterialRecord::new)
    }

    pub fn map_sources(&self, rows: Vec<RawRow>) -> MappedTable<SourceRecord> {
        self.map_batch_keyed("sources", rows, SourceRecord::new)
    }

    pub fn map_outputs(&self, rows: Vec<RawRow>) -> MappedTable<OutputRecord> {
        self.map_batch_keyed("processing_outputs", rows, OutputRecord::new)
    }

    fn map_batch_keyed<T>(
        &self,
        table: &str,
        rows: Vec<RawRow>,
        build: impl Fn(String, RawRow) -> T,
    ) -> MappedTable<T> {
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped_rows = Vec::new();

        for (idx, mut row) in rows.into_iter().enumerate() {
            let Some(batch_id) = self.batch_id_of(&row) else {
                let err = ImportError::PrimaryKeyMissing {
                    table: table.to_string(),
                    row: idx + 1,
                    key: fields::BATCH_ID.to_string(),
                };
                warn!(error = %err, "跳过缺主键的行");
                skipped_rows.push(idx + 1);
                continue;
            };

            // 统一补齐标准主键列,合并后的行始终带 batchId
            if !row.contains_key(fields::BATCH_ID) {
                row.insert(fields::BATCH_ID, batch_id.clone());
            }
            records.push(build(batch_id, row));
        }

        MappedTable {
            records,
            skipped_rows,
        }
    }

    fn batch_id_of(&self, row: &RawRow) -> Option<String> {
        fields::BATCH_ID_ALIASES.iter().find_map(|key| row.text(key))
    }

    // ==========================================
    // 订单 / 库存 / 预测
    // ==========================================

    pub fn map_orders(&self, rows: Vec<RawRow>) -> MappedTable<OrderRecord> {
        let records = rows
            .into_iter()
            .map(|row| {
                let risk_status = RiskStatus::from_label(
                    &row.text(fields::RISK_STATUS).unwrap_or_default(),
                );
                OrderRecord {
                    order_id: row.text(fields::ORDER_ID),
                    sku: row.text(fields::SKU).unwrap_or_else(|| UNKNOWN_KEY.to_string()),
                    region: row.text(fields::REGION),
                    risk_status,
                    risk_score: risk_status.score(),
                    delivery_due_week: row
                        .text(fields::DELIVERY_DUE_WEEK)
                        .unwrap_or_else(|| UNKNOWN_KEY.to_string()),
                    parsed_date: row.get(fields::DELIVERY_DUE_DATE).and_then(parse_date),
                    row,
                }
            })
            .collect();
        MappedTable::all(records)
    }

    pub fn map_inventory(&self, rows: Vec<RawRow>) -> MappedTable<InventoryRecord> {
        let records = rows
            .into_iter()
            .map(|row| InventoryRecord {
                sku: row.text(fields::SKU),
                region: row.text(fields::REGION),
                parsed_date: row.get(fields::EXPECTED_RESTOCK_DATE).and_then(parse_date),
                row,
            })
            .collect();
        MappedTable::all(records)
    }

    pub fn map_forecasts(&self, rows: Vec<RawRow>) -> MappedTable<ForecastRecord> {
        let records = rows
            .into_iter()
            .map(|row| ForecastRecord {
                sku: row.text(fields::SKU).unwrap_or_else(|| UNKNOWN_KEY.to_string()),
                date: row.get(fields::DATE).cloned().unwrap_or(CellValue::Empty),
                projected_tonnage: parse_quantity_opt(row.get(fields::PROJECTED_TONNAGE)),
            })
            .collect();
        MappedTable::all(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ParsedDate;

    #[test]
    fn test_batch_id_alias_is_normalized() {
        let rows = vec![
            RawRow::new().with("batch_id", "B1").with("stage", "Collection"),
            RawRow::new().with("stage", "orphan"),
            RawRow::new().with("batchId", 1002.0),
        ];

        let mapped = FieldMapper.map_batches(rows);

        assert_eq!(mapped.records.len(), 2);
        assert_eq!(mapped.skipped_rows, vec![2]);
        assert_eq!(mapped.records[0].batch_id, "B1");
        assert_eq!(mapped.records[0].row.text("batchId").as_deref(), Some("B1"));
        assert_eq!(mapped.records[1].batch_id, "1002");
    }

    #[test]
    fn test_order_mapping_derives_risk_score() {
        let rows = vec![RawRow::new()
            .with("order_id", "O-1")
            .with("sku", "PET-FLAKE")
            .with("risk_status", "Medium")
            .with("delivery_due_week", "2024-W18")
            .with("delivery_due_date", "2024-05-01")
            .with("order_value", "1,200")];

        let mapped = FieldMapper.map_orders(rows);
        let order = &mapped.records[0];

        assert_eq!(order.risk_status, RiskStatus::Medium);
        assert_eq!(order.risk_score, 3);
        assert!(matches!(order.parsed_date, Some(ParsedDate::Valid(_))));
        // 千分位逗号只取前缀
        assert_eq!(order.order_value(), 1.0);
    }

    #[test]
    fn test_forecast_mapping_defaults() {
        let rows = vec![RawRow::new().with("date", 45413.0)];
        let mapped = FieldMapper.map_forecasts(rows);
        assert_eq!(mapped.records[0].sku, UNKNOWN_KEY);
        assert_eq!(mapped.records[0].projected_tonnage, 0.0);
    }
}
