// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、基础数据准备等功能
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use grain_reception::db::{init_schema, open_sqlite_connection};
use grain_reception::repository::{ReceptionRepository, SqliteCollectionStore};
use grain_reception::{Product, ProductStatus, QualityParameter, QualityThreshold, Silo};
use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件(需要保持存活)
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是有效 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 基于 SQLite 文件的仓储
pub fn create_test_repo(db_path: &str) -> Result<Arc<ReceptionRepository>, Box<dyn Error>> {
    let store = Arc::new(SqliteCollectionStore::new(db_path)?);
    Ok(Arc::new(ReceptionRepository::new(store)))
}

/// 写入一套最小基础数据
///
/// - P1 Trigo (启用),阈值 HUM [10, 20]
/// - P2 Soja (停用)
/// - S01 容量 10000、S02 容量 50000,均分配给 P1
pub fn seed_catalog(repo: &ReceptionRepository) -> Result<(), Box<dyn Error>> {
    repo.save_products(&[
        Product::new("P1", "Trigo", ProductStatus::Active),
        Product::new("P2", "Soja", ProductStatus::Inactive),
    ])?;
    repo.save_quality_parameters(&[QualityParameter::new("HUM", "Humedad")])?;
    repo.save_thresholds(&[QualityThreshold::new("P1", "HUM", 10.0, 20.0)])?;
    repo.save_silos(&[
        Silo::new("S01", "Norte", "P1", 0, 10_000),
        Silo::new("S02", "Sur", "P1", 0, 50_000),
    ])?;
    Ok(())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
