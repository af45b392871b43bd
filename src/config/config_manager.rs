// ==========================================
// 粮食接收系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 缺失或格式错误的配置项回退到默认值并记录告警
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::reception::{
    WeightPolicy, HEAVY_WEIGHT_WARNING_KG, MAX_WEIGHT_KG, MIN_WEIGHT_KG,
};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ReceptionConfig - 接收业务配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionConfig {
    pub min_weight_kg: i64,
    pub max_weight_kg: i64,
    pub heavy_weight_warning_kg: i64,
    pub enforce_plate_format: bool,
}

impl Default for ReceptionConfig {
    fn default() -> Self {
        Self {
            min_weight_kg: MIN_WEIGHT_KG,
            max_weight_kg: MAX_WEIGHT_KG,
            heavy_weight_warning_kg: HEAVY_WEIGHT_WARNING_KG,
            enforce_plate_format: true,
        }
    }
}

impl ReceptionConfig {
    /// 转换为状态机使用的称重规则
    pub fn to_weight_policy(&self) -> WeightPolicy {
        WeightPolicy {
            min_kg: self.min_weight_kg,
            max_kg: self.max_weight_kg,
            heavy_warning_kg: self.heavy_weight_warning_kg,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致,会对传入连接再次应用统一 PRAGMA(幂等)。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值(scope_id='global')
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置项已更新");
        Ok(())
    }

    /// 读取并解析配置值,缺失或无法解析时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误,使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照(JSON格式)
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 接收业务配置 =====

    /// 读取接收业务配置 (逐项回退默认值)
    pub fn get_reception_config(&self) -> Result<ReceptionConfig, Box<dyn Error>> {
        let defaults = ReceptionConfig::default();

        let mut config = ReceptionConfig {
            min_weight_kg: self.get_parsed_or_default(config_keys::MIN_WEIGHT_KG, defaults.min_weight_kg)?,
            max_weight_kg: self.get_parsed_or_default(config_keys::MAX_WEIGHT_KG, defaults.max_weight_kg)?,
            heavy_weight_warning_kg: self.get_parsed_or_default(
                config_keys::HEAVY_WEIGHT_WARNING_KG,
                defaults.heavy_weight_warning_kg,
            )?,
            enforce_plate_format: self.get_parsed_or_default(
                config_keys::ENFORCE_PLATE_FORMAT,
                defaults.enforce_plate_format,
            )?,
        };

        // 配置只能收窄地磅量程,不能放宽
        let in_range = |v: i64| (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&v);
        if !in_range(config.min_weight_kg)
            || !in_range(config.max_weight_kg)
            || config.min_weight_kg > config.max_weight_kg
        {
            tracing::warn!(
                min_weight_kg = config.min_weight_kg,
                max_weight_kg = config.max_weight_kg,
                allowed_min = MIN_WEIGHT_KG,
                allowed_max = MAX_WEIGHT_KG,
                "称重上下限配置越界或冲突,使用默认值"
            );
            config.min_weight_kg = defaults.min_weight_kg;
            config.max_weight_kg = defaults.max_weight_kg;
        }

        if !(config.min_weight_kg..=config.max_weight_kg).contains(&config.heavy_weight_warning_kg) {
            tracing::warn!(
                heavy_weight_warning_kg = config.heavy_weight_warning_kg,
                min_weight_kg = config.min_weight_kg,
                max_weight_kg = config.max_weight_kg,
                "偏高提示阈值超出称重范围,使用默认值"
            );
            config.heavy_weight_warning_kg =
                defaults.heavy_weight_warning_kg.clamp(config.min_weight_kg, config.max_weight_kg);
        }

        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 称重
    pub const MIN_WEIGHT_KG: &str = "min_weight_kg";
    pub const MAX_WEIGHT_KG: &str = "max_weight_kg";
    pub const HEAVY_WEIGHT_WARNING_KG: &str = "heavy_weight_warning_kg";

    // 车牌
    pub const ENFORCE_PLATE_FORMAT: &str = "enforce_plate_format";
}
