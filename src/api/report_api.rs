// ==========================================
// 粮食接收系统 - 报表 API
// ==========================================
// 职责: 接收 KPI 汇总、筒仓占用概览 (只读)
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::report::ReceptionReport;
use crate::domain::silo::StorageConstraint;
use crate::domain::types::ReportWindow;
use crate::engine::report::ReportAggregator;
use crate::repository::reception_repo::ReceptionRepository;

/// 筒仓占用概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiloOccupancy {
    pub silo_id: String,
    pub silo_name: String,
    pub assigned_product: String,
    pub current_stock: i64,
    pub capacity: i64,
    pub free_space: i64,
    pub fill_pct: u32,
}

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    repo: Arc<ReceptionRepository>,
    aggregator: ReportAggregator,
    today: Option<NaiveDate>,
}

impl ReportApi {
    pub fn new(repo: Arc<ReceptionRepository>) -> Self {
        Self {
            repo,
            aggregator: ReportAggregator::new(),
            today: None,
        }
    }

    /// 固定业务日期
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// 按窗口汇总 KPI
    pub fn reception_report(&self, window: ReportWindow) -> ApiResult<ReceptionReport> {
        let operations = self.repo.load_operations()?;
        let products = self.repo.load_products()?;
        Ok(self
            .aggregator
            .aggregate(window, self.today(), &operations, &products))
    }

    /// 按筛选值汇总 KPI (TODAY/HOY, ALL_TIME/TODO)
    pub fn reception_report_by_filter(&self, filter: &str) -> ApiResult<ReceptionReport> {
        let window = ReportWindow::parse(filter)
            .ok_or_else(|| ApiError::ValidationError(format!("未知的报表窗口: {}", filter)))?;
        self.reception_report(window)
    }

    /// 筒仓占用概览 (集合顺序)
    pub fn silo_occupancy(&self) -> ApiResult<Vec<SiloOccupancy>> {
        Ok(self
            .repo
            .load_silos()?
            .iter()
            .map(|silo| SiloOccupancy {
                silo_id: silo.id.clone(),
                silo_name: silo.name.clone(),
                assigned_product: silo.assigned_product.clone(),
                current_stock: silo.current_stock,
                capacity: silo.capacity,
                free_space: silo.free_space(),
                fill_pct: (silo.fill_ratio() * 100.0).floor() as u32,
            })
            .collect())
    }
}
