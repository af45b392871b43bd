// ==========================================
// 粮食接收系统 - 接收报表汇总引擎
// ==========================================
// 职责: 只读汇总作业集合,输出 KPI
// 红线: 不修改任何作业记录
// ==========================================

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::operation::Operation;
use crate::domain::product::Product;
use crate::domain::report::{ProductReportRow, ReceptionReport};
use crate::domain::types::{OperationState, ReportWindow};

#[derive(Debug, Default)]
pub struct ReportAggregator {}

impl ReportAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 汇总接收 KPI
    ///
    /// # 参数
    /// - `window`: Today 只统计 quota_date == today 的作业
    /// - `today`: 业务日期
    /// - `operations`: 作业全集
    /// - `products`: 产品全集,决定按产品行的顺序
    #[instrument(skip(self, operations, products), fields(
        window = %window,
        today = %today,
        operation_count = operations.len()
    ))]
    pub fn aggregate(
        &self,
        window: ReportWindow,
        today: NaiveDate,
        operations: &[Operation],
        products: &[Product],
    ) -> ReceptionReport {
        let in_window: Vec<&Operation> = operations
            .iter()
            .filter(|op| match window {
                ReportWindow::Today => op.quota_date == today,
                ReportWindow::AllTime => true,
            })
            .collect();

        let total_quotas = in_window.len();
        let accepted = in_window.iter().filter(|op| op.state.is_accepted()).count();
        let rejected = in_window
            .iter()
            .filter(|op| op.state == OperationState::Rejected)
            .count();

        let products = products
            .iter()
            .map(|product| product_row(product, &in_window))
            .collect();

        ReceptionReport {
            window,
            reference_date: today,
            total_quotas,
            accepted,
            rejected,
            efficiency_pct: efficiency_pct(accepted, total_quotas),
            products,
        }
    }
}

/// 接收率 (%),截断取整;总数为 0 时返回 0
pub fn efficiency_pct(accepted: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (accepted * 100 / total) as u32
}

fn product_row(product: &Product, operations: &[&Operation]) -> ProductReportRow {
    let of_product: Vec<&Operation> = operations
        .iter()
        .copied()
        .filter(|op| op.product_code == product.code)
        .collect();

    let rejected_count = of_product
        .iter()
        .filter(|op| op.state == OperationState::Rejected)
        .count();

    let finished: Vec<&Operation> = of_product
        .iter()
        .copied()
        .filter(|op| op.is_finished())
        .collect();
    let finished_count = finished.len();
    let net_total: i64 = finished.iter().map(|op| op.gross_weight - op.tare_weight).sum();
    let avg_net = if finished_count > 0 {
        net_total / finished_count as i64
    } else {
        0
    };

    ProductReportRow {
        product_code: product.code.clone(),
        product_name: product.name.clone(),
        count: of_product.len(),
        rejected_count,
        finished_count,
        net_total,
        avg_net,
    }
}
