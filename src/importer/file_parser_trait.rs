// ==========================================
// 物料流追溯看板 - 文件解析 Trait
// ==========================================
// 职责: 定义表格文件 → 原始行的解析接口（不包含实现）
// ==========================================

use crate::domain::cell::RawRow;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser, JsonParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 行记录列表（已跳过完全空白的行）
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}
