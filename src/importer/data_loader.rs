// ==========================================
// 物料流追溯看板 - 数据载入器
// ==========================================
// 职责: 并发读取七张数据表,全部成功后生成一次性的数据上下文
// 约定: 任一数据表失败则整次载入失败,不产生部分结果
// ==========================================

use crate::config::dashboard_config::TableKind;
use crate::config::data_source_reader::DataSourceConfigReader;
use crate::domain::cell::RawRow;
use crate::domain::records::{
    BatchRecord, ForecastRecord, InventoryRecord, MaterialRecord, OrderRecord, OutputRecord,
    SourceRecord,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapper, MappedTable};
use crate::importer::file_parser::UniversalFileParser;
use chrono::{Local, NaiveDateTime};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// LoadReport - 载入报告
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLoadSummary {
    pub table: TableKind,
    pub path: String,
    pub rows: usize,
    pub skipped_rows: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub tables: Vec<TableLoadSummary>,
    pub elapsed_ms: u128,
}

impl LoadReport {
    pub fn table(&self, table: TableKind) -> Option<&TableLoadSummary> {
        self.tables.iter().find(|t| t.table == table)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

// ==========================================
// DataContext - 一次载入的完整数据快照
// ==========================================
#[derive(Debug, Clone)]
pub struct DataContext {
    pub load_id: Uuid,
    pub loaded_at: NaiveDateTime,
    pub batches: Vec<BatchRecord>,
    pub materials: Vec<MaterialRecord>,
    pub sources: Vec<SourceRecord>,
    pub outputs: Vec<OutputRecord>,
    pub orders: Vec<OrderRecord>,
    pub inventory: Vec<InventoryRecord>,
    pub forecasts: Vec<ForecastRecord>,
    pub report: LoadReport,
}

impl DataContext {
    /// 由已映射的记录直接构造（报告为空）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        batches: Vec<BatchRecord>,
        materials: Vec<MaterialRecord>,
        sources: Vec<SourceRecord>,
        outputs: Vec<OutputRecord>,
        orders: Vec<OrderRecord>,
        inventory: Vec<InventoryRecord>,
        forecasts: Vec<ForecastRecord>,
    ) -> Self {
        Self {
            load_id: Uuid::new_v4(),
            loaded_at: Local::now().naive_local(),
            batches,
            materials,
            sources,
            outputs,
            orders,
            inventory,
            forecasts,
            report: LoadReport::default(),
        }
    }
}

// ==========================================
// DataLoader - 数据载入器
// ==========================================
pub struct DataLoader<C>
where
    C: DataSourceConfigReader,
{
    config_reader: Arc<C>,
    mapper: FieldMapper,
}

impl<C> DataLoader<C>
where
    C: DataSourceConfigReader,
{
    pub fn new(config_reader: Arc<C>) -> Self {
        Self {
            config_reader,
            mapper: FieldMapper,
        }
    }

    /// 载入全部数据表
    ///
    /// # 流程
    /// 1. 读取数据源配置
    /// 2. 每张表一个阻塞解析任务,全部并发
    /// 3. 等待全部完成（任一失败即返回错误）
    /// 4. 字段映射 → DataContext
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> ImportResult<DataContext> {
        let start = Instant::now();
        let data_sources = self.config_reader.get_data_source_config().await?;
        info!(data_dir = %data_sources.data_dir.display(), "开始载入数据表");

        let tasks = TableKind::ALL.iter().map(|&table| {
            let path = data_sources.path_for(table);
            load_table(table, path)
        });
        let loaded = try_join_all(tasks).await?;

        let mut raw: HashMap<TableKind, (PathBuf, Vec<RawRow>)> = loaded
            .into_iter()
            .map(|(table, path, rows)| (table, (path, rows)))
            .collect();
        let mut report = LoadReport::default();

        let batches = self.mapped(&mut raw, &mut report, TableKind::Batches, |m, rows| {
            m.map_batches(rows)
        })?;
        let materials = self.mapped(&mut raw, &mut report, TableKind::Materials, |m, rows| {
            m.map_materials(rows)
        })?;
        let sources = self.mapped(&mut raw, &mut report, TableKind::Sources, |m, rows| {
            m.map_sources(rows)
        })?;
        let outputs = self.mapped(&mut raw, &mut report, TableKind::ProcessingOutputs, |m, rows| {
            m.map_outputs(rows)
        })?;
        let orders = self.mapped(&mut raw, &mut report, TableKind::Orders, |m, rows| {
            m.map_orders(rows)
        })?;
        let inventory = self.mapped(&mut raw, &mut report, TableKind::Inventory, |m, rows| {
            m.map_inventory(rows)
        })?;
        let forecasts = self.mapped(&mut raw, &mut report, TableKind::InventoryForecast, |m, rows| {
            m.map_forecasts(rows)
        })?;

        report.elapsed_ms = start.elapsed().as_millis();

        let mut context =
            DataContext::new(batches, materials, sources, outputs, orders, inventory, forecasts);
        context.report = report;

        info!(
            load_id = %context.load_id,
            rows = context.report.total_rows(),
            elapsed_ms = context.report.elapsed_ms,
            "数据表载入完成"
        );
        Ok(context)
    }

    fn mapped<T>(
        &self,
        raw: &mut HashMap<TableKind, (PathBuf, Vec<RawRow>)>,
        report: &mut LoadReport,
        table: TableKind,
        map: impl FnOnce(&FieldMapper, Vec<RawRow>) -> MappedTable<T>,
    ) -> ImportResult<Vec<T>> {
        let (path, rows) = raw
            .remove(&table)
            .ok_or_else(|| ImportError::InternalError(format!("数据表 {} 未载入", table)))?;

        let mapped = map(&self.mapper, rows);
        report.tables.push(TableLoadSummary {
            table,
            path: path.display().to_string(),
            rows: mapped.records.len(),
            skipped_rows: mapped.skipped_rows,
        });
        Ok(mapped.records)
    }
}

/// 单表解析（阻塞 IO 放入 blocking 线程池）
async fn load_table(
    table: TableKind,
    path: PathBuf,
) -> ImportResult<(TableKind, PathBuf, Vec<RawRow>)> {
    let parse_path = path.clone();
    let rows = tokio::task::spawn_blocking(move || UniversalFileParser.parse(&parse_path))
        .await?
        .map_err(|e| ImportError::TableLoadFailed {
            table: table.to_string(),
            message: e.to_string(),
        })?;

    debug!(table = %table, rows = rows.len(), "数据表解析完成");
    Ok((table, path, rows))
}
