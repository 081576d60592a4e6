//! 補貨主計算器

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use replen_core::{
    CalculationDetails, CatalogEntry, CatalogIntegrityError, DataQualityError, DemandRecord,
    InputSource, OrderEmitter, OrderLine, PersistenceSink, ReplenError, ReplenishmentConfig,
    RunIssue, StockOrigin, StockRecord,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    CatalogJoiner, DemandAggregator, NetDemandCalculator, NoActionReason, OrderQuantityRounder,
    PipelineStage, ReplenishmentPlan, RunFailure, RunOutcome, RunReport, RunSummary,
    StockResolver, SupplierOrderGrouper,
};

/// 補貨計算器
///
/// 每次執行只依目標日期與三份輸入資料決定結果，執行之間不共享可變狀態。
#[derive(Debug, Clone, Default)]
pub struct ReplenishmentCalculator {
    config: ReplenishmentConfig,
}

impl ReplenishmentCalculator {
    /// 創建新的補貨計算器
    pub fn new(config: ReplenishmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplenishmentConfig {
        &self.config
    }

    /// 計算補貨計劃（不輸出）
    pub fn calculate<S>(&self, source: &S, target_date: NaiveDate) -> Result<RunReport, RunFailure>
    where
        S: InputSource + ?Sized,
    {
        self.calculate_at(source, target_date, Utc::now())
    }

    /// 以指定的計算時間計算補貨計劃；相同輸入與時間會得到相同結果
    pub fn calculate_at<S>(
        &self,
        source: &S,
        target_date: NaiveDate,
        computed_at: DateTime<Utc>,
    ) -> Result<RunReport, RunFailure>
    where
        S: InputSource + ?Sized,
    {
        let mut run = Run::start(target_date, computed_at);
        let span = tracing::info_span!("replenishment", run_id = %run.run_id, target_date = %target_date);
        let _guard = span.enter();

        let outcome = self.plan(source, &mut run)?;
        Ok(run.finish(outcome))
    }

    /// 計算並輸出補貨計劃
    pub fn run<S, E, P>(
        &self,
        source: &S,
        target_date: NaiveDate,
        emitter: &mut E,
        sink: &mut P,
    ) -> Result<RunReport, RunFailure>
    where
        S: InputSource + ?Sized,
        E: OrderEmitter + ?Sized,
        P: PersistenceSink + ?Sized,
    {
        self.run_at(source, target_date, Utc::now(), emitter, sink)
    }

    /// 以指定的計算時間計算並輸出補貨計劃
    ///
    /// 先寫入訂單明細與稽核記錄，再逐一輸出供應商訂單；任何輸出端錯誤都會讓整次計算失敗。
    pub fn run_at<S, E, P>(
        &self,
        source: &S,
        target_date: NaiveDate,
        computed_at: DateTime<Utc>,
        emitter: &mut E,
        sink: &mut P,
    ) -> Result<RunReport, RunFailure>
    where
        S: InputSource + ?Sized,
        E: OrderEmitter + ?Sized,
        P: PersistenceSink + ?Sized,
    {
        let mut run = Run::start(target_date, computed_at);
        let span = tracing::info_span!("replenishment", run_id = %run.run_id, target_date = %target_date);
        let _guard = span.enter();

        let outcome = self.plan(source, &mut run)?;

        if let RunOutcome::Orders(plan) = &outcome {
            run.enter(PipelineStage::Emitting);

            let order_lines: Vec<OrderLine> = plan.order_lines().cloned().collect();
            let audit_records = plan.audit_records(target_date);
            if let Err(error) = sink.persist(&order_lines, &audit_records) {
                return Err(run.fail(error));
            }

            for batch in &plan.batches {
                if let Err(error) = emitter.emit(batch, computed_at) {
                    return Err(run.fail(error));
                }
                tracing::info!(
                    "已輸出供應商 {} 訂單：{} 筆，總金額 {}",
                    batch.supplier_id,
                    batch.total_items,
                    batch.total_value
                );
            }
        }

        Ok(run.finish(outcome))
    }

    /// 執行到分組為止的各階段
    fn plan<S>(&self, source: &S, run: &mut Run) -> Result<RunOutcome, RunFailure>
    where
        S: InputSource + ?Sized,
    {
        let target_date = run.target_date;

        // Step 1: 彙總需求
        run.enter(PipelineStage::AggregatingDemand);
        let demand_input = match source.demand(target_date) {
            Ok(input) => input,
            Err(error) => return Err(run.fail(error)),
        };
        let demands = run.absorb(
            DemandAggregator::new(self.config.malformed_quantity_policy).resolve(&demand_input),
        );
        run.summary.demand_items = demands.len();
        tracing::info!("需求明細 {} 筆，有需求物料 {} 個", demand_input.len(), demands.len());

        if demands.is_empty() {
            return Ok(RunOutcome::NoActionRequired {
                reason: NoActionReason::NoDemand,
            });
        }

        // Step 2: 解析庫存
        run.enter(PipelineStage::ResolvingStock);
        let stock_rows = match source.stock(target_date) {
            Ok(rows) => rows,
            Err(error) => return Err(run.fail(error)),
        };
        let stock = run.absorb(StockResolver::new(self.config.stock_defaults).resolve(&stock_rows));
        tracing::info!("庫存快照 {} 列", stock_rows.len());

        // Step 3: 聯結目錄
        run.enter(PipelineStage::JoiningCatalog);
        let catalog_input = match source.catalog() {
            Ok(input) => input,
            Err(error) => return Err(run.fail(error)),
        };
        let catalog =
            run.absorb(CatalogJoiner::new(self.config.catalog_defaults).resolve(&catalog_input));

        let mut uncatalogued: Vec<&str> = demands
            .keys()
            .map(String::as_str)
            .filter(|item_id| catalog.get(item_id).is_none() && !catalog.is_excluded(item_id))
            .collect();
        uncatalogued.sort_unstable();
        for item_id in uncatalogued {
            run.record(RunIssue::from(CatalogIntegrityError::NotInCatalog {
                item_id: item_id.to_string(),
            }));
        }

        // 依目錄順序，只保留有需求的物料
        let candidates: Vec<(&CatalogEntry, &DemandRecord)> = catalog
            .iter()
            .filter_map(|entry| demands.get(&entry.item_id).map(|demand| (entry, demand)))
            .collect();
        run.summary.orderable_items = candidates.len();
        tracing::info!("目錄 {} 筆，可採購且有需求 {} 筆", catalog.len(), candidates.len());

        if candidates.is_empty() {
            return Ok(RunOutcome::NoActionRequired {
                reason: NoActionReason::NoOrderableItems,
            });
        }

        // Step 4: 逐物料計算淨需求與訂購量
        run.enter(PipelineStage::Calculating);
        let items: Vec<(&CatalogEntry, &DemandRecord, StockRecord)> = candidates
            .into_iter()
            .map(|(entry, demand)| {
                let stock_record = stock.resolve_for(&entry.item_id);
                if stock_record.origin == StockOrigin::Missing {
                    run.record(RunIssue::from(DataQualityError::StockRowMissing {
                        item_id: entry.item_id.clone(),
                    }));
                }
                (entry, demand, stock_record)
            })
            .collect();

        let rounder = OrderQuantityRounder::new(self.config.moq_policy);
        let computed_at = run.computed_at;
        let results: Vec<Option<OrderLine>> = if items.len() >= self.config.parallel_threshold {
            tracing::debug!("物料數 {} 達並行門檻，使用並行計算", items.len());
            items
                .par_iter()
                .map(|(entry, demand, stock)| Self::order_line(entry, demand, stock, rounder, computed_at))
                .collect()
        } else {
            items
                .iter()
                .map(|(entry, demand, stock)| Self::order_line(entry, demand, stock, rounder, computed_at))
                .collect()
        };
        let lines: Vec<OrderLine> = results.into_iter().flatten().collect();

        run.summary.ordered_items = lines.len();
        run.summary.covered_items = items.len() - lines.len();
        tracing::info!("需補貨物料 {} 個，庫存足夠 {} 個", lines.len(), run.summary.covered_items);

        if lines.is_empty() {
            return Ok(RunOutcome::NoActionRequired {
                reason: NoActionReason::StockCoversDemand,
            });
        }

        // Step 5: 依供應商分組並檢查總計
        run.enter(PipelineStage::Grouping);
        let batches = SupplierOrderGrouper::group(lines, target_date, self.config.line_sort);
        if let Some(batch) = batches.iter().find(|batch| !batch.totals_match()) {
            let error = ReplenError::BatchIntegrity {
                supplier_id: batch.supplier_id.clone(),
                message: format!(
                    "明細 {} 筆，總計記錄 {} 筆、金額 {}",
                    batch.order_lines.len(),
                    batch.total_items,
                    batch.total_value
                ),
            };
            return Err(run.fail(error));
        }

        Ok(RunOutcome::Orders(ReplenishmentPlan { batches }))
    }

    /// 單物料訂單計算；淨需求為 0 時不產生訂單
    fn order_line(
        entry: &CatalogEntry,
        demand: &DemandRecord,
        stock: &StockRecord,
        rounder: OrderQuantityRounder,
        computed_at: DateTime<Utc>,
    ) -> Option<OrderLine> {
        let requirement = NetDemandCalculator::calculate(demand, stock);
        let Some(order_quantity) = rounder.round(
            requirement.net_requirement,
            entry.pack_size,
            entry.min_order_quantity,
        ) else {
            tracing::debug!("物料 {} 庫存足夠，不需訂購", entry.item_id);
            return None;
        };

        tracing::debug!(
            "物料 {}: 需求 {}，淨需求 {}，訂購 {}（包裝 {}，最小訂購量 {}）",
            entry.item_id,
            demand.total_demand,
            requirement.net_requirement,
            order_quantity,
            entry.pack_size,
            entry.min_order_quantity
        );

        Some(OrderLine {
            order_id: Uuid::new_v4(),
            item_id: entry.item_id.clone(),
            product_name: entry.product_name.clone(),
            demand: demand.total_demand,
            available_stock: stock.available_stock,
            reserved_stock: stock.reserved_stock,
            safety_stock: stock.safety_stock,
            net_demand: requirement.net_requirement,
            order_quantity,
            pack_size: entry.pack_size,
            unit_price: entry.unit_price,
            total_price: entry.unit_price * Decimal::from(order_quantity),
            supplier_id: entry.supplier_id.clone(),
            supplier_name: entry.supplier_name.clone(),
            lead_time_days: entry.lead_time_days,
            computed_at,
            calculation_details: CalculationDetails::new(
                requirement.gross_requirement,
                requirement.safety_stock,
                requirement.net_available,
                requirement.net_requirement,
            ),
        })
    }
}

/// 單次計算的狀態
struct Run {
    run_id: Uuid,
    target_date: NaiveDate,
    computed_at: DateTime<Utc>,
    started: Instant,
    stages: Vec<PipelineStage>,
    issues: Vec<RunIssue>,
    summary: RunSummary,
}

impl Run {
    fn start(target_date: NaiveDate, computed_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target_date,
            computed_at,
            started: Instant::now(),
            stages: Vec::new(),
            issues: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        tracing::info!("進入階段：{}", stage);
        self.stages.push(stage);
    }

    fn record(&mut self, issue: RunIssue) {
        tracing::warn!("{}", issue.message);
        self.issues.push(issue);
    }

    fn absorb<T>(&mut self, resolved: crate::Resolved<T>) -> T {
        for issue in resolved.issues {
            self.record(issue);
        }
        resolved.value
    }

    fn fail(&mut self, error: ReplenError) -> RunFailure {
        let stage = self.stages.last().copied().unwrap_or(PipelineStage::AggregatingDemand);
        tracing::error!("補貨計算在「{}」階段失敗: {}", stage, error);
        self.stages.push(PipelineStage::Failed);
        RunFailure {
            run_id: self.run_id,
            stage,
            error,
            issues: std::mem::take(&mut self.issues),
        }
    }

    fn finish(mut self, outcome: RunOutcome) -> RunReport {
        self.stages.push(PipelineStage::Done);
        let calculation_time_ms = self.started.elapsed().as_millis();

        match &outcome {
            RunOutcome::Orders(plan) => tracing::info!(
                "補貨計算完成，耗時 {} ms：{} 個供應商，{} 筆明細，總金額 {}",
                calculation_time_ms,
                plan.batches.len(),
                plan.line_count(),
                plan.total_value()
            ),
            RunOutcome::NoActionRequired { reason } => {
                tracing::info!("補貨計算完成，耗時 {} ms：不需補貨（{:?}）", calculation_time_ms, reason)
            }
        }

        let summary = RunReport::summarize(&self.issues, self.summary);
        if summary.excluded_items > 0 {
            tracing::warn!("排除物料 {} 個", summary.excluded_items);
        }

        RunReport {
            run_id: self.run_id,
            target_date: self.target_date,
            computed_at: self.computed_at,
            outcome,
            issues: self.issues,
            stages: self.stages,
            summary,
            calculation_time_ms,
        }
    }
}
