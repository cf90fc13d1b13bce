// ==========================================
// 物料流追溯看板 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换导入层错误为用户可读的错误消息
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 区间起点晚于终点
    #[error("无效的日期区间: from={from} to={to}")]
    InvalidDateRange { from: String, to: String },

    // ==========================================
    // 数据状态
    // ==========================================
    /// 数据尚未载入或最近一次载入失败,渲染层显示加载/空状态
    #[error("数据未就绪: {0}")]
    DataNotReady(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("数据载入失败: {0}")]
    Import(#[from] ImportError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("序列化失败: {0}")]
    SerializationError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl ApiError {
    /// 是否应渲染为加载/空状态（而非错误提示）
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ApiError::DataNotReady(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
