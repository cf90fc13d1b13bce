// ==========================================
// 物料流追溯看板 - 表格记录领域模型
// ==========================================
// 职责: 批次/物料/来源/产出/订单/库存/预测 七类记录
// 约定: 记录一经载入不可变,新一轮载入整体替换
// 约定: 类型化字段之外的列保留在 row 中,供合并与展示
// ==========================================

use crate::domain::cell::{CellValue, RawRow};
use crate::domain::types::{ParsedDate, RiskStatus};
use crate::importer::normalizer::parse_quantity;
use serde::Serialize;

// ==========================================
// 标准列名
// ==========================================
pub mod fields {
    // ===== 批次主键 =====
    pub const BATCH_ID: &str = "batchId";
    pub const BATCH_ID_ALIASES: [&str; 3] = ["batchId", "batch_id", "BatchId"];

    // ===== 批次 =====
    pub const RAW_MATERIAL_QTY: &str = "rawMaterialQty";

    // ===== 来源 =====
    pub const SOURCE_NAME: &str = "sourceName";
    pub const COLLECTED_QTY: &str = "collectedQty";
    pub const COLLECTED_QTY_ALIASES: [&str; 3] = ["collectedQty", "collected_quantity", "collected"];
    pub const DATE_OF_DISPATCH: &str = "dateOfDispatchFromSource";
    pub const DATE_RECEIVED_AT_COLLECTION: &str = "dateReceivedAtCollection";

    // ===== 产出 =====
    pub const CATEGORIZED_QTY: &str = "categorizedQty";
    pub const DATE_OF_CATEGORIZATION: &str = "dateOfCategorization";

    // ===== 派生 =====
    pub const YIELD_PERCENTAGE: &str = "yieldPercentage";

    // ===== 订单 =====
    pub const ORDER_ID: &str = "order_id";
    pub const SKU: &str = "sku";
    pub const ORDER_QUANTITY: &str = "order_quantity";
    pub const ORDER_VALUE: &str = "order_value";
    pub const REGION: &str = "region";
    pub const RISK_STATUS: &str = "risk_status";
    pub const DELIVERY_DUE_WEEK: &str = "delivery_due_week";
    pub const DELIVERY_DUE_DATE: &str = "delivery_due_date";

    // ===== 库存 =====
    pub const EXPECTED_RESTOCK_DATE: &str = "expected_restock_date";

    // ===== 预测 =====
    pub const DATE: &str = "date";
    pub const PROJECTED_TONNAGE: &str = "projected_tonnage";

    /// 标识列: 原样保留为文本（"007" 不能变成 7）
    pub fn is_identifier(column: &str) -> bool {
        BATCH_ID_ALIASES.contains(&column) || column == SKU || column == ORDER_ID
    }
}

// ==========================================
// Trait: TabularRecord
// ==========================================
// 用途: 区间过滤、分面过滤、字段求和的统一读取接口
pub trait TabularRecord {
    /// 按列名读取单元格
    fn field(&self, name: &str) -> Option<&CellValue>;

    /// 参与区间过滤的日期（None 表示无日期）
    fn record_date(&self) -> Option<ParsedDate> {
        None
    }

    /// 分面取值（文本视图）
    fn facet(&self, name: &str) -> Option<String> {
        self.field(name)
            .and_then(CellValue::as_text)
            .map(|s| s.into_owned())
    }
}

impl TabularRecord for RawRow {
    fn field(&self, name: &str) -> Option<&CellValue> {
        self.get(name)
    }
}

// ==========================================
// Trait: BatchKeyed
// ==========================================
// 用途: 富化阶段按 batchId 关联四类记录
pub trait BatchKeyed {
    fn batch_id(&self) -> &str;
    fn row(&self) -> &RawRow;
}

macro_rules! batch_keyed_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct $name {
            pub batch_id: String,
            pub row: RawRow,
        }

        impl $name {
            pub fn new(batch_id: impl Into<String>, row: RawRow) -> Self {
                Self {
                    batch_id: batch_id.into(),
                    row,
                }
            }
        }

        impl BatchKeyed for $name {
            fn batch_id(&self) -> &str {
                &self.batch_id
            }

            fn row(&self) -> &RawRow {
                &self.row
            }
        }

        impl TabularRecord for $name {
            fn field(&self, name: &str) -> Option<&CellValue> {
                self.row.get(name)
            }
        }
    };
}

batch_keyed_record!(
    /// 批次记录（batches 表一行）
    BatchRecord
);
batch_keyed_record!(
    /// 物料记录（成分、物料名）
    MaterialRecord
);
batch_keyed_record!(
    /// 来源记录（供应方、收集量、发运/收集日期）
    SourceRecord
);
batch_keyed_record!(
    /// 加工产出记录（分拣量、分拣日期）
    OutputRecord
);

// ==========================================
// EnrichedBatch - 富化批次（派生）
// ==========================================
// 不变量: yield_percentage 由来源/产出数量计算,任一为非正时为 0
// （产出记录自带 yieldPercentage 列时以产出列为准）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBatch {
    pub batch_id: String,
    /// 按合并顺序叠加后的全部列
    pub fields: RawRow,
    pub collected_qty: f64,
    pub categorized_qty: f64,
    pub yield_percentage: f64,
    pub parsed_date: Option<ParsedDate>,
}

impl EnrichedBatch {
    pub fn raw_material_qty(&self) -> f64 {
        parse_quantity(self.fields.get(fields::RAW_MATERIAL_QTY).unwrap_or(&CellValue::Empty))
    }

    pub fn source_name(&self) -> Option<String> {
        self.fields.text(fields::SOURCE_NAME)
    }
}

impl TabularRecord for EnrichedBatch {
    fn field(&self, name: &str) -> Option<&CellValue> {
        self.fields.get(name)
    }

    fn record_date(&self) -> Option<ParsedDate> {
        self.parsed_date
    }
}

// ==========================================
// OrderRecord - 订单记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub sku: String,
    pub region: Option<String>,
    pub risk_status: RiskStatus,
    pub risk_score: u8,
    pub delivery_due_week: String,
    pub parsed_date: Option<ParsedDate>,
    pub row: RawRow,
}

impl OrderRecord {
    pub fn order_quantity(&self) -> f64 {
        parse_quantity(self.row.get(fields::ORDER_QUANTITY).unwrap_or(&CellValue::Empty))
    }

    pub fn order_value(&self) -> f64 {
        parse_quantity(self.row.get(fields::ORDER_VALUE).unwrap_or(&CellValue::Empty))
    }
}

impl TabularRecord for OrderRecord {
    fn field(&self, name: &str) -> Option<&CellValue> {
        self.row.get(name)
    }

    fn record_date(&self) -> Option<ParsedDate> {
        self.parsed_date
    }
}

// ==========================================
// InventoryRecord - 库存记录
// ==========================================
// 用途: 仅参与订单视图默认区间的推算
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRecord {
    pub sku: Option<String>,
    pub region: Option<String>,
    pub parsed_date: Option<ParsedDate>,
    pub row: RawRow,
}

impl TabularRecord for InventoryRecord {
    fn field(&self, name: &str) -> Option<&CellValue> {
        self.row.get(name)
    }

    fn record_date(&self) -> Option<ParsedDate> {
        self.parsed_date
    }
}

// ==========================================
// ForecastRecord - 库存预测记录
// ==========================================
// date 保留原始单元格（ISO 文本 / Excel 序列号 / 日期对象）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub sku: String,
    pub date: CellValue,
    pub projected_tonnage: f64,
}
