// ==========================================
// 接收流程端到端测试
// ==========================================
// 测试目标: 配额 → 到场 → 质检 → 毛重 → 皮重 → 入仓 → 报表
// 存储: 临时 SQLite 文件
// ==========================================

mod test_helpers;

use std::collections::HashMap;

use grain_reception::api::{ApiError, ReceptionApi, ReceptionResponse, ReportApi};
use grain_reception::config::ReceptionConfig;
use grain_reception::engine::ReceptionStage;
use grain_reception::{logging, AdvisoryWarning, OperationState, ReportWindow};

fn measurements(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_abc123_end_to_end() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = test_helpers::create_test_repo(&db_path).unwrap();
    test_helpers::seed_catalog(&repo).unwrap();

    let today = test_helpers::date(2024, 6, 1);
    let api = ReceptionApi::new(repo.clone(), ReceptionConfig::default()).with_today(today);
    let reports = ReportApi::new(repo.clone()).with_today(today);

    // 配额
    let op = api.grant_quota("ABC123", "P1", "2024-06-01").unwrap();
    assert_eq!(op.state, OperationState::Pending);
    assert_eq!((op.gross_weight, op.tare_weight), (0, 0));

    // 到场
    let op = api.register_arrival("ABC123").unwrap();
    assert_eq!(op.state, OperationState::Arrived);

    // 质检
    let verdict = api
        .submit_quality("ABC123", &measurements(&[("HUM", "12.5")]))
        .unwrap();
    assert!(verdict.is_approved());
    assert_eq!(api.work_queue(ReceptionStage::Weighing).unwrap().len(), 1);

    // 毛重
    let gross = api.record_gross("ABC123", "20000", false).unwrap();
    assert_eq!(gross.operation().unwrap().state, OperationState::GrossWeighed);

    // 皮重: 净重 12000 超出 S01 剩余 10000,先要求确认
    let pending = api.record_tare("ABC123", "8000", false).unwrap();
    match &pending {
        ReceptionResponse::ConfirmationRequired { warnings } => {
            assert!(matches!(warnings[0], AdvisoryWarning::SplitAllocation { .. }));
        }
        other => panic!("Expected ConfirmationRequired, got {:?}", other),
    }
    assert_eq!(
        repo.load_operations().unwrap()[0].state,
        OperationState::GrossWeighed
    );

    let done = api.record_tare("ABC123", "8000", true).unwrap();
    match done {
        ReceptionResponse::Committed {
            operation, receipt, ..
        } => {
            assert_eq!(operation.state, OperationState::Finished);
            assert_eq!(operation.net_weight(), 12_000);
            let receipt = receipt.unwrap();
            assert_eq!(receipt.net_weight, 12_000);
            assert_eq!(receipt.shares.iter().map(|s| s.delta).sum::<i64>(), 12_000);
        }
        other => panic!("Expected Committed, got {:?}", other),
    }

    let silos = repo.load_silos().unwrap();
    assert_eq!(silos[0].current_stock, 10_000);
    assert_eq!(silos[1].current_stock, 2_000);

    // 报表
    let report = reports.reception_report(ReportWindow::Today).unwrap();
    assert_eq!(report.total_quotas, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.efficiency_pct, 100);
    assert_eq!(report.products[0].net_total, 12_000);
    assert_eq!(report.products[0].avg_net, 12_000);
}

#[test]
fn test_rejected_quality_is_terminal() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = test_helpers::create_test_repo(&db_path).unwrap();
    test_helpers::seed_catalog(&repo).unwrap();

    let today = test_helpers::date(2024, 6, 1);
    let api = ReceptionApi::new(repo.clone(), ReceptionConfig::default()).with_today(today);

    api.grant_quota("AB123CD", "P1", "2024-06-01").unwrap();
    api.register_arrival("AB 123 CD").unwrap();

    let verdict = api
        .submit_quality("AB123CD", &measurements(&[("HUM", "25")]))
        .unwrap();
    assert!(!verdict.is_approved());
    assert_eq!(repo.load_operations().unwrap()[0].state, OperationState::Rejected);

    let err = api.record_gross("AB123CD", "20000", true).unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

    let report = ReportApi::new(repo)
        .with_today(today)
        .reception_report(ReportWindow::AllTime)
        .unwrap();
    assert_eq!(report.rejected, 1);
    assert_eq!(report.efficiency_pct, 0);
}

#[test]
fn test_settlement_errors_leave_silos_untouched() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = test_helpers::create_test_repo(&db_path).unwrap();
    test_helpers::seed_catalog(&repo).unwrap();

    let today = test_helpers::date(2024, 6, 1);
    let api = ReceptionApi::new(repo.clone(), ReceptionConfig::default()).with_today(today);

    api.grant_quota("XYZ789", "P1", "2024-06-01").unwrap();
    api.register_arrival("XYZ789").unwrap();
    api.submit_quality("XYZ789", &measurements(&[("HUM", "15")]))
        .unwrap();
    api.record_gross("XYZ789", "10000", false).unwrap();

    // 皮重等于毛重
    let err = api.record_tare("XYZ789", "10000", true).unwrap_err();
    assert!(matches!(err, ApiError::InvalidTare { gross: 10_000, tare: 10_000 }));

    // 超出称重范围
    let err = api.record_tare("XYZ789", "0", true).unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));

    // 修正毛重后容量不足: 净重 75000 > 总剩余 60000
    api.correct_gross("XYZ789", "76000", true).unwrap();
    let err = api.record_tare("XYZ789", "1000", true).unwrap_err();
    assert!(matches!(err, ApiError::CapacityError { deficit_kg: 15_000, .. }));

    let silos = repo.load_silos().unwrap();
    assert!(silos.iter().all(|s| s.current_stock == 0));
    assert_eq!(repo.load_operations().unwrap()[0].state, OperationState::GrossWeighed);
}

#[test]
fn test_heavy_gross_requires_confirmation() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = test_helpers::create_test_repo(&db_path).unwrap();
    test_helpers::seed_catalog(&repo).unwrap();

    let today = test_helpers::date(2024, 6, 1);
    let api = ReceptionApi::new(repo.clone(), ReceptionConfig::default()).with_today(today);

    api.grant_quota("ABC123", "P1", "2024-06-01").unwrap();
    api.register_arrival("ABC123").unwrap();
    api.submit_quality("ABC123", &measurements(&[("HUM", "15")]))
        .unwrap();

    let pending = api.record_gross("ABC123", "65000", false).unwrap();
    assert!(!pending.is_committed());
    assert!(matches!(
        pending.warnings()[0],
        AdvisoryWarning::HeavyWeight { weight_kg: 65_000, threshold_kg: 60_000 }
    ));
    assert_eq!(repo.load_operations().unwrap()[0].gross_weight, 0);

    let done = api.record_gross("ABC123", "65000", true).unwrap();
    assert!(done.is_committed());
    assert_eq!(done.warnings().len(), 1);
    assert_eq!(repo.load_operations().unwrap()[0].gross_weight, 65_000);
}

#[test]
fn test_quota_for_inactive_product_is_refused() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = test_helpers::create_test_repo(&db_path).unwrap();
    test_helpers::seed_catalog(&repo).unwrap();

    let api = ReceptionApi::new(repo.clone(), ReceptionConfig::default())
        .with_today(test_helpers::date(2024, 6, 1));

    assert!(matches!(
        api.grant_quota("ABC123", "P2", "2024-06-01"),
        Err(ApiError::InactiveOrUnknownProduct(_))
    ));
    assert!(matches!(
        api.grant_quota("ABC123", "P9", "2024-06-01"),
        Err(ApiError::InactiveOrUnknownProduct(_))
    ));
    assert!(repo.load_operations().unwrap().is_empty());
}
