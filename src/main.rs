// ==========================================
// 粮食接收系统 - 主入口
// ==========================================
// 打开默认数据库,输出当日与累计 KPI
// ==========================================

use std::process::ExitCode;

use grain_reception::app::{get_default_db_path, AppState};
use grain_reception::{logging, ReceptionReport, ReportWindow};

fn log_report(report: &ReceptionReport) {
    tracing::info!(
        window = %report.window,
        reference_date = %report.reference_date,
        total_quotas = report.total_quotas,
        accepted = report.accepted,
        rejected = report.rejected,
        efficiency_pct = report.efficiency_pct,
        "接收汇总"
    );

    for row in &report.products {
        tracing::info!(
            product = %row.product_code,
            name = %row.product_name,
            count = row.count,
            rejected = row.rejected_count,
            finished = row.finished_count,
            net_total_kg = row.net_total,
            avg_net_kg = row.avg_net,
            "产品明细"
        );
    }
}

fn main() -> ExitCode {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 系统版本: {}", grain_reception::APP_NAME, grain_reception::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for window in [ReportWindow::Today, ReportWindow::AllTime] {
        match state.report_api.reception_report(window) {
            Ok(report) => log_report(&report),
            Err(e) => {
                tracing::error!(window = %window, "汇总失败: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    match state.report_api.silo_occupancy() {
        Ok(silos) => {
            for silo in silos {
                tracing::info!(
                    silo = %silo.silo_id,
                    product = %silo.assigned_product,
                    stock_kg = silo.current_stock,
                    capacity_kg = silo.capacity,
                    fill_pct = silo.fill_pct,
                    "筒仓占用"
                );
            }
        }
        Err(e) => tracing::warn!("筒仓占用查询失败: {}", e),
    }

    ExitCode::SUCCESS
}
