// ==========================================
// 粮食接收系统 - 领域类型定义
// ==========================================
// 依据: 作业状态机 (P → A → C → B → F / R)
// 序列化格式: 单字母编码 (与既有存储一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 作业状态 (Operation State)
// ==========================================
// 红线: 只能沿固定路径前进,不可跳转/回退
// 编码: P=待到场 A=已到场 C=质检通过 B=已过毛重 F=已完成 R=已拒收
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
    #[serde(rename = "P", alias = "PENDING")]
    Pending, // 已发放配额,等待到场
    #[serde(rename = "A", alias = "ARRIVED")]
    Arrived, // 已到场,等待质检
    #[serde(rename = "C", alias = "APPROVED")]
    Approved, // 质检通过,等待毛重
    #[serde(rename = "B", alias = "GROSS_WEIGHED")]
    GrossWeighed, // 已过毛重,等待皮重
    #[serde(rename = "F", alias = "FINISHED")]
    Finished, // 已卸货入仓 (终态)
    #[serde(rename = "R", alias = "REJECTED")]
    Rejected, // 质检拒收 (终态)
}

impl OperationState {
    /// 是否终态 (终态后记录不可再变更)
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationState::Finished | OperationState::Rejected)
    }

    /// 是否计入"已接收" (既非待到场也非拒收)
    pub fn is_accepted(self) -> bool {
        !matches!(self, OperationState::Pending | OperationState::Rejected)
    }

    /// 单字母编码
    pub fn code(self) -> &'static str {
        match self {
            OperationState::Pending => "P",
            OperationState::Arrived => "A",
            OperationState::Approved => "C",
            OperationState::GrossWeighed => "B",
            OperationState::Finished => "F",
            OperationState::Rejected => "R",
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Pending => write!(f, "PENDING"),
            OperationState::Arrived => write!(f, "ARRIVED"),
            OperationState::Approved => write!(f, "APPROVED"),
            OperationState::GrossWeighed => write!(f, "GROSS_WEIGHED"),
            OperationState::Finished => write!(f, "FINISHED"),
            OperationState::Rejected => write!(f, "REJECTED"),
        }
    }
}

// ==========================================
// 产品状态 (Product Status)
// ==========================================
// 只有 Active 产品可以发放新配额
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    #[serde(rename = "A", alias = "ACTIVE")]
    Active, // 启用
    #[serde(rename = "B", alias = "INACTIVE")]
    Inactive, // 停用
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "ACTIVE"),
            ProductStatus::Inactive => write!(f, "INACTIVE"),
        }
    }
}

// ==========================================
// 质检结论 (Quality Decision)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityDecision {
    Approved, // 接收
    Rejected, // 拒收
}

impl QualityDecision {
    /// 质检结论对应的作业状态
    pub fn target_state(self) -> OperationState {
        match self {
            QualityDecision::Approved => OperationState::Approved,
            QualityDecision::Rejected => OperationState::Rejected,
        }
    }
}

impl fmt::Display for QualityDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityDecision::Approved => write!(f, "APPROVED"),
            QualityDecision::Rejected => write!(f, "REJECTED"),
        }
    }
}

// ==========================================
// 报表时间窗口 (Report Window)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportWindow {
    Today,   // 仅当日配额
    AllTime, // 全部历史
}

impl ReportWindow {
    /// 从字符串解析 (兼容 "HOY"/"TODO" 旧筛选值)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TODAY" | "HOY" => Some(ReportWindow::Today),
            "ALL_TIME" | "ALL" | "TODO" => Some(ReportWindow::AllTime),
            _ => None,
        }
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWindow::Today => write!(f, "TODAY"),
            ReportWindow::AllTime => write!(f, "ALL_TIME"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_state_serializes_as_letter_code() {
        let s = serde_json::to_string(&OperationState::GrossWeighed).unwrap();
        assert_eq!(s, "\"B\"");

        let back: OperationState = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(back, OperationState::Approved);

        let long: OperationState = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(long, OperationState::Finished);
    }

    #[test]
    fn test_terminal_and_accepted_states() {
        assert!(OperationState::Finished.is_terminal());
        assert!(OperationState::Rejected.is_terminal());
        assert!(!OperationState::GrossWeighed.is_terminal());

        assert!(!OperationState::Pending.is_accepted());
        assert!(!OperationState::Rejected.is_accepted());
        assert!(OperationState::Arrived.is_accepted());
        assert!(OperationState::Finished.is_accepted());
    }

    #[test]
    fn test_report_window_parse() {
        assert_eq!(ReportWindow::parse("hoy"), Some(ReportWindow::Today));
        assert_eq!(ReportWindow::parse("ALL_TIME"), Some(ReportWindow::AllTime));
        assert_eq!(ReportWindow::parse("weekly"), None);
    }
}
