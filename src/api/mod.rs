// ==========================================
// 粮食接收系统 - API 层
// ==========================================
// 职责: 解析外部输入,调用引擎,回写存储
// ==========================================

pub mod catalog_api;
pub mod error;
pub mod reception_api;
pub mod report_api;
pub mod validator;

// 重导出核心类型
pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult};
pub use reception_api::{ReceptionApi, ReceptionResponse};
pub use report_api::{ReportApi, SiloOccupancy};
