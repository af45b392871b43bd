// ==========================================
// 粮食接收系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、容量约束接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod operation;
pub mod product;
pub mod report;
pub mod silo;
pub mod types;
pub mod warning;

// 重导出核心类型
pub use operation::{normalize_plate, plate_key, Operation, OperationKey};
pub use product::{Product, QualityParameter, QualityThreshold};
pub use report::{ProductReportRow, ReceptionReport};
pub use silo::{Silo, StorageConstraint};
pub use types::{OperationState, ProductStatus, QualityDecision, ReportWindow};
pub use warning::{AdvisoryWarning, SiloShare};
