// ==========================================
// 粮食接收系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CatalogApi, ReceptionApi, ReportApi};
use crate::config::config_manager::ConfigManager;
use crate::config::ReceptionConfig;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::collection_store::SqliteCollectionStore;
use crate::repository::reception_repo::ReceptionRepository;

/// 应用状态
///
/// 所有API共享同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生效的接收业务配置
    pub config: ReceptionConfig,

    /// 接收作业API
    pub reception_api: Arc<ReceptionApi>,

    /// 基础数据维护API
    pub catalog_api: Arc<CatalogApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开数据库并建表
    /// 2. 读取接收业务配置
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;

        match read_schema_version(&conn) {
            Ok(Some(v)) if v != CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    db_version = v,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema_version 与当前代码不一致"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取 schema_version 失败: {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config = config_manager
            .get_reception_config()
            .map_err(|e| format!("读取配置失败: {}", e))?;

        // ==========================================
        // Repository / API
        // ==========================================
        let store = Arc::new(SqliteCollectionStore::from_connection(conn));
        let repo = Arc::new(ReceptionRepository::new(store));

        let reception_api = Arc::new(ReceptionApi::new(repo.clone(), config));
        let catalog_api = Arc::new(CatalogApi::new(repo.clone()));
        let report_api = Arc::new(ReportApi::new(repo));

        tracing::info!(
            max_weight_kg = config.max_weight_kg,
            heavy_weight_warning_kg = config.heavy_weight_warning_kg,
            enforce_plate_format = config.enforce_plate_format,
            "AppState初始化完成"
        );

        Ok(Self {
            db_path,
            config,
            reception_api,
            catalog_api,
            report_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 GRAIN_RECEPTION_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("GRAIN_RECEPTION_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./grain_reception.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("grain-reception");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("grain_reception.db");
        }
    }

    path.to_string_lossy().to_string()
}
