// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use supply_trace_analytics::domain::{
    BatchRecord, CellValue, ForecastRecord, InventoryRecord, MaterialRecord, OrderRecord,
    OutputRecord, RawRow, SourceRecord,
};
use supply_trace_analytics::importer::FieldMapper;

/// 当日零点
pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// 批次关联记录
// ==========================================

pub fn batch(id: &str) -> BatchRecord {
    BatchRecord::new(id, RawRow::new().with("batchId", id))
}

pub fn batch_with(id: &str, row: RawRow) -> BatchRecord {
    BatchRecord::new(id, row.with("batchId", id))
}

pub fn material(id: &str, row: RawRow) -> MaterialRecord {
    MaterialRecord::new(id, row.with("batchId", id))
}

pub fn source(id: &str, row: RawRow) -> SourceRecord {
    SourceRecord::new(id, row.with("batchId", id))
}

pub fn output(id: &str, row: RawRow) -> OutputRecord {
    OutputRecord::new(id, row.with("batchId", id))
}

// ==========================================
// 流向图批次构建器（未类型化行）
// ==========================================

pub struct FlowBatchBuilder {
    row: RawRow,
}

impl FlowBatchBuilder {
    pub fn new(source_name: &str) -> Self {
        Self {
            row: RawRow::new().with("sourceName", source_name),
        }
    }

    pub fn collection(mut self, location: &str) -> Self {
        self.row.insert("collectionLocation", location);
        self
    }

    pub fn categorized_at(mut self, location: &str) -> Self {
        self.row.insert("categorizedLocation", location);
        self
    }

    pub fn recycling(mut self, location: &str) -> Self {
        self.row.insert("recyclingLocation", location);
        self
    }

    pub fn destination(mut self, location: &str) -> Self {
        self.row.insert("destination", location);
        self
    }

    pub fn categorized_qty(mut self, qty: impl Into<CellValue>) -> Self {
        self.row.insert("categorizedQty", qty);
        self
    }

    pub fn raw_qty(mut self, qty: impl Into<CellValue>) -> Self {
        self.row.insert("rawMaterialQty", qty);
        self
    }

    pub fn build(self) -> RawRow {
        self.row
    }
}

// ==========================================
// OrderRecord 构建器
// ==========================================
// 经 FieldMapper 生成,风险分与日期的派生口径与载入时一致
pub struct OrderBuilder {
    row: RawRow,
}

impl OrderBuilder {
    pub fn new(sku: &str) -> Self {
        Self {
            row: RawRow::new().with("sku", sku),
        }
    }

    pub fn week(mut self, week: &str) -> Self {
        self.row.insert("delivery_due_week", week);
        self
    }

    pub fn risk(mut self, status: &str) -> Self {
        self.row.insert("risk_status", status);
        self
    }

    pub fn due(mut self, date: &str) -> Self {
        self.row.insert("delivery_due_date", date);
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.row.insert("region", region);
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.row.insert("order_value", value);
        self
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.row.insert("order_quantity", quantity);
        self
    }

    pub fn build(self) -> OrderRecord {
        FieldMapper.map_orders(vec![self.row]).records.remove(0)
    }
}

pub fn inventory(sku: &str, restock_date: &str) -> InventoryRecord {
    let row = RawRow::new()
        .with("sku", sku)
        .with("expected_restock_date", restock_date);
    FieldMapper.map_inventory(vec![row]).records.remove(0)
}

pub fn forecast(sku: &str, date: impl Into<CellValue>, tonnage: f64) -> ForecastRecord {
    ForecastRecord {
        sku: sku.to_string(),
        date: date.into(),
        projected_tonnage: tonnage,
    }
}

// ==========================================
// 数据文件夹具
// ==========================================

/// 在 dir 下写入一套完整的七张数据表（CSV + JSON）
pub fn write_dataset(dir: &Path) {
    write_file(
        dir,
        "batches.csv",
        "batchId,parentBatch,stage,processingType,rawMaterialQty\n\
         B1,,Collection,Shredding,120\n\
         B2,B1,Categorization,Sorting,80%\n\
         ,,orphan,,\n",
    );
    write_file(
        dir,
        "materials.csv",
        "batchId,materialName,composition\nB1,PET,95% PET\nB2,HDPE,90% HDPE\n",
    );
    write_file(
        dir,
        "sources.csv",
        "batch_id,sourceName,collectedQty,dateOfDispatchFromSource,collectionLocation\n\
         B1,Harbor Depot,100,2024-05-06,North Yard\n\
         B2,City MRF,40,2024-05-07,\n",
    );
    write_file(
        dir,
        "processing_outputs.csv",
        "batchId,categorizedQty,dateOfCategorization,categorizedLocation,destination\n\
         B1,50,2024-05-08,Line 1,Mill A\n\
         B2,30,2024-05-09,Line 2,Mill B\n",
    );
    write_file(
        dir,
        "orders.json",
        r#"[
            {"order_id":"O1","sku":"PET","order_quantity":10,"order_value":1000,"region":"North","risk_status":"High","delivery_due_week":"2024-W19","delivery_due_date":"2024-05-08"},
            {"order_id":"O2","sku":"PET","order_quantity":5,"order_value":500,"region":"South","risk_status":"Low","delivery_due_week":"2024-W19","delivery_due_date":"2024-05-09"},
            {"order_id":"O3","sku":"HDPE","order_quantity":8,"order_value":800,"region":"North","risk_status":"Medium","delivery_due_week":"2024-W18","delivery_due_date":"2024-05-01"}
        ]"#,
    );
    write_file(
        dir,
        "inventory.json",
        r#"[{"sku":"PET","region":"North","expected_restock_date":"2024-05-10"}]"#,
    );
    write_file(
        dir,
        "inventory_forecast.json",
        r#"[
            {"sku":"PET","date":45419,"projected_tonnage":12.5},
            {"sku":"PET","date":"2024-06-30","projected_tonnage":9.0},
            {"sku":"HDPE","date":"2024-05-02","projected_tonnage":4.0}
        ]"#,
    );
}

pub fn write_file(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}
