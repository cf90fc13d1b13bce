// ==========================================
// 物料流追溯看板 - 命令行入口
// ==========================================
// 用法: supply-trace-analytics [config_path] [material-flow|order-tracker]
// 输出: 视图模型 JSON（stdout）,日志走 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context};
use supply_trace_analytics::api::{MaterialFlowQuery, OrderTrackerQuery};
use supply_trace_analytics::app::AppState;
use supply_trace_analytics::config::ConfigManager;
use supply_trace_analytics::logging;

/// 需要输出的视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewSelection {
    MaterialFlow,
    OrderTracker,
    All,
}

impl ViewSelection {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "material-flow" => Some(ViewSelection::MaterialFlow),
            "order-tracker" => Some(ViewSelection::OrderTracker),
            "all" => Some(ViewSelection::All),
            _ => None,
        }
    }
}

/// 解析命令行参数
///
/// 第一个参数若是视图名则视为未提供配置路径
fn parse_args(args: &[String]) -> anyhow::Result<(Option<PathBuf>, ViewSelection)> {
    let mut config_path = None;
    let mut view = ViewSelection::All;

    for arg in args {
        if let Some(selected) = ViewSelection::parse(arg) {
            view = selected;
        } else if config_path.is_none() {
            config_path = Some(PathBuf::from(arg));
        } else {
            bail!("无法识别的参数: {}", arg);
        }
    }

    Ok((config_path, view))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", supply_trace_analytics::APP_NAME, supply_trace_analytics::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, view) = parse_args(&args)?;

    let manager = ConfigManager::load(config_path.as_deref()).context("配置加载失败")?;
    let state = AppState::from_config_manager(manager);
    state.refresh().await.context("数据载入失败")?;

    let mut output = serde_json::Map::new();
    if matches!(view, ViewSelection::MaterialFlow | ViewSelection::All) {
        let material_flow = state
            .material_flow_view(&MaterialFlowQuery::default())
            .await?;
        output.insert("material_flow".to_string(), serde_json::to_value(material_flow)?);
    }
    if matches!(view, ViewSelection::OrderTracker | ViewSelection::All) {
        let order_tracker = state
            .order_tracker_view(&OrderTrackerQuery::default())
            .await?;
        output.insert("order_tracker".to_string(), serde_json::to_value(order_tracker)?);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let (path, view) = parse_args(&[]).unwrap();
        assert!(path.is_none());
        assert_eq!(view, ViewSelection::All);
    }

    #[test]
    fn test_parse_args_view_only() {
        let (path, view) = parse_args(&args(&["order-tracker"])).unwrap();
        assert!(path.is_none());
        assert_eq!(view, ViewSelection::OrderTracker);
    }

    #[test]
    fn test_parse_args_path_and_view() {
        let (path, view) = parse_args(&args(&["conf.json", "material-flow"])).unwrap();
        assert_eq!(path, Some(PathBuf::from("conf.json")));
        assert_eq!(view, ViewSelection::MaterialFlow);
        assert!(parse_args(&args(&["a.json", "b.json"])).is_err());
    }
}
