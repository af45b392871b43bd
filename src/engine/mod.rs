// ==========================================
// 粮食接收系统 - 引擎层
// ==========================================
// 职责: 业务规则 (纯函数,不访问存储)
// - quality: 质检判定
// - silo_allocator: 筒仓分配
// - reception: 作业状态机
// - report: KPI 汇总
// ==========================================

pub mod quality;
pub mod reception;
pub mod report;
pub mod silo_allocator;

// 重导出核心引擎
pub use quality::{ParameterCheck, QualityEvaluator, QualityVerdict};
pub use reception::{
    ReceptionCommand, ReceptionError, ReceptionResult, ReceptionSnapshot, ReceptionStage,
    ReceptionStateMachine, SettlementReceipt, Transition, TransitionOutcome, WeightPolicy,
};
pub use report::ReportAggregator;
pub use silo_allocator::{AllocationError, SiloAllocation, SiloAllocator};
