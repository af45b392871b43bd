// ==========================================
// 粮食接收系统 - 应用层
// ==========================================
// 职责: 按数据库路径装配配置、仓储与API
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
