// ==========================================
// 物料流追溯看板 - 导入层
// ==========================================
// 职责: 外部数据表读取、字段归一化、类型化映射
// 支持: Excel, CSV, JSON
// ==========================================

// 模块声明
pub mod data_loader;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod file_parser_trait;
pub mod normalizer;

// 重导出核心类型
pub use data_loader::{DataContext, DataLoader, LoadReport, TableLoadSummary};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MappedTable, UNKNOWN_KEY};
pub use file_parser::{CsvParser, ExcelParser, JsonParser, UniversalFileParser};
pub use normalizer::{parse_date, parse_quantity};

// 重导出 Trait 接口
pub use file_parser_trait::FileParser;
