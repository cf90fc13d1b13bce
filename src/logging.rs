// ==========================================
// 物料流追溯看板 - 日志
// ==========================================
// 输出: stderr（stdout 留给视图 JSON）
// 级别: RUST_LOG,缺省时本 crate 为 info、依赖库为 warn
// 格式: SUPPLY_TRACE_LOG_FORMAT=json 时输出 JSON 行,其余为文本
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "SUPPLY_TRACE_LOG_FORMAT";

const DEFAULT_DIRECTIVES: &str = "warn,supply_trace_analytics=info";
const TEST_DIRECTIVES: &str = "supply_trace_analytics=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 未设置或无法识别时为 Text
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// 安装全局 subscriber（进程内只调用一次）
///
/// ```no_run
/// supply_trace_analytics::logging::init();
/// tracing::info!("ready");
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_line_number(true);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Text => builder.with_target(true).init(),
    }
}

/// 测试用 subscriber: debug 级别,走 libtest 捕获,可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(TEST_DIRECTIVES))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
    }

    #[test]
    fn test_init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!("second init is a no-op");
    }
}
