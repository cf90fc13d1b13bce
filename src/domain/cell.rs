// ==========================================
// 物料流追溯看板 - 单元格与原始行
// ==========================================
// 职责: 表格数据的最小单元（单元格值）与扁平行记录
// 来源: CSV / Excel / JSON 三种表格输入统一落到 RawRow
// ==========================================

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::collections::HashMap;

// ==========================================
// CellValue - 单元格值
// ==========================================
// 数字或字符串混排的字段（如 rawMaterialQty）在读入时保留原样,
// 由归一化层在使用时再转换
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,                 // 空单元格 / null
    Bool(bool),            // 布尔
    Number(f64),           // 数值（Excel 日期单元格也以序列号落在这里）
    Text(String),          // 文本
    DateTime(NaiveDateTime), // 已是日期对象的值
}

impl CellValue {
    /// 是否为空（Empty 或去空白后为空串）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 真值判定
    ///
    /// 与表格合并时 "取第一个有值字段" 的口径一致：
    /// 空串、0、NaN、false、空值均视为无值
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
            CellValue::DateTime(_) => true,
        }
    }

    /// 文本视图（数值按最短十进制形式输出,整数不带小数点）
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            CellValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::DateTime(dt) => Some(Cow::Owned(dt.format("%Y-%m-%dT%H:%M:%S").to_string())),
        }
    }

    /// 仅当单元格本身是非空文本时返回去空白后的内容
    pub fn as_trimmed_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            Value::String(s) => CellValue::Text(s.clone()),
            // 嵌套结构不参与计算,保留其 JSON 文本
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            CellValue::Number(_) => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::DateTime(dt) => {
                serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
        }
    }
}

// ==========================================
// RawRow - 扁平行记录（列名 → 单元格）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(key.into(), value.into());
    }

    /// 链式构造（主要给测试与夹具用）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.cells.iter()
    }

    /// 以 other 的全部列覆盖本行（含空值列）
    pub fn overlay(&mut self, other: &RawRow) {
        for (k, v) in &other.cells {
            self.cells.insert(k.clone(), v.clone());
        }
    }

    /// 按别名顺序取第一个有值的单元格
    pub fn first_truthy(&self, keys: &[&str]) -> Option<&CellValue> {
        keys.iter()
            .filter_map(|k| self.cells.get(*k))
            .find(|v| v.is_truthy())
    }

    /// 去空白后的非空文本（数值列按文本视图输出）
    pub fn text(&self, key: &str) -> Option<String> {
        self.cells
            .get(key)
            .and_then(CellValue::as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// 从 JSON 对象构造
    pub fn from_json_object(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        map.iter()
            .map(|(k, v)| (k.clone(), CellValue::from(v)))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // 按列名排序输出,保证快照稳定
        let mut keys: Vec<&String> = self.cells.keys().collect();
        keys.sort();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for k in keys {
            map.serialize_entry(k, &self.cells[k])?;
        }
        map.end()
    }
}
