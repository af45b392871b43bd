// ==========================================
// 粮食接收系统 - 配置层
// ==========================================
// 职责: 系统配置管理 (称重上下限、提示阈值、车牌格式开关)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager, ReceptionConfig};
