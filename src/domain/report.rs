// ==========================================
// 粮食接收系统 - 接收报表领域模型
// ==========================================
// 用途: ReportAggregator 输出 (只读汇总,不回写)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::ReportWindow;

// ==========================================
// ReceptionReport - 接收 KPI 汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptionReport {
    pub window: ReportWindow,
    pub reference_date: NaiveDate, // "今日" 的取值

    // ===== 总体指标 =====
    pub total_quotas: usize,  // 窗口内配额数
    pub accepted: usize,      // 已接收 (非 P/R)
    pub rejected: usize,      // 拒收 (R)
    pub efficiency_pct: u32,  // accepted / total_quotas * 100,截断取整

    // ===== 按产品 =====
    pub products: Vec<ProductReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReportRow {
    pub product_code: String,
    pub product_name: String,
    pub count: usize,          // 该产品配额数
    pub rejected_count: usize, // 拒收数
    pub finished_count: usize, // 已完成数
    pub net_total: i64,        // 已完成作业净重合计 (kg)
    pub avg_net: i64,          // 平均净重 (kg),无完成作业时为 0
}
