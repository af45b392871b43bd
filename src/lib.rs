// ==========================================
// 粮食接收系统 - 核心库
// ==========================================
// 流程: 配额 → 到场 → 质检 → 毛重 → 皮重 → 入仓
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施(连接初始化/PRAGMA 统一/建表)
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OperationState, ProductStatus, QualityDecision, ReportWindow};

// 领域实体
pub use domain::{
    AdvisoryWarning, Operation, OperationKey, Product, QualityParameter, QualityThreshold,
    ReceptionReport, Silo,
};

// 引擎
pub use engine::{
    QualityEvaluator, ReceptionCommand, ReceptionStateMachine, ReportAggregator, SiloAllocator,
};

// API
pub use api::{ApiError, ApiResult, CatalogApi, ReceptionApi, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "粮食接收系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
