use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::Path;

use grain_reception::app::{get_default_db_path, AppState};
use grain_reception::{logging, ProductStatus, Silo};

// 演示用基础数据: (代码, 名称, 状态)
const PRODUCTS: [(&str, &str, ProductStatus); 3] = [
    ("TRI", "Trigo", ProductStatus::Active),
    ("SOJ", "Soja", ProductStatus::Active),
    ("MAI", "Maiz", ProductStatus::Inactive),
];

const PARAMETERS: [(&str, &str); 3] = [
    ("HUM", "Humedad (%)"),
    ("IMP", "Impurezas (%)"),
    ("PH", "Peso hectolitrico (kg/hl)"),
];

// (产品, 参数, min, max)
const THRESHOLDS: [(&str, &str, f64, f64); 5] = [
    ("TRI", "HUM", 10.0, 14.5),
    ("TRI", "IMP", 0.0, 2.0),
    ("TRI", "PH", 73.0, 85.0),
    ("SOJ", "HUM", 9.0, 13.5),
    ("SOJ", "IMP", 0.0, 1.0),
];

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    let catalog = &state.catalog_api;

    for (code, name, status) in PRODUCTS {
        catalog.create_product(code, name, status)?;
    }
    for (code, name) in PARAMETERS {
        catalog.upsert_parameter(code, name)?;
    }
    for (product, parameter, min, max) in THRESHOLDS {
        catalog.upsert_threshold(product, parameter, min, max)?;
    }

    catalog.create_silo(Silo::new("S01", "Celda norte 1", "TRI", 0, 250_000))?;
    catalog.create_silo(Silo::new("S02", "Celda norte 2", "TRI", 120_000, 250_000))?;
    catalog.create_silo(Silo::new("S03", "Celda sur", "SOJ", 0, 400_000))?;
    catalog.create_silo(Silo::new("S04", "Silo bolsa", "MAI", 0, 180_000))?;

    tracing::info!(
        db_path = %db_path,
        products = catalog.list_products()?.len(),
        parameters = catalog.list_parameters()?.len(),
        thresholds = catalog.list_thresholds(None)?.len(),
        silos = catalog.list_silos()?.len(),
        "演示数据已写入"
    );
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup = format!("{}.bak_{}", db_path, ts);
    fs::copy(path, &backup)?;
    fs::remove_file(path)?;

    tracing::info!(backup = %backup, "已备份并删除旧数据库");
    Ok(())
}
