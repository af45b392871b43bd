// ==========================================
// 粮食接收系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,把状态机/仓储错误转换为用户可读的错误消息
// 红线: 每个错误都带显式原因,调用方据此提示操作员
// ==========================================

use crate::engine::reception::ReceptionError;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("配额重复: 车牌{plate}在{quota_date}已有配额")]
    DuplicateQuota { plate: String, quota_date: NaiveDate },

    #[error("产品不存在或未启用: {0}")]
    InactiveOrUnknownProduct(String),

    #[error("皮重必须小于毛重: 毛重={gross}kg, 皮重={tare}kg")]
    InvalidTare { gross: i64, tare: i64 },

    #[error("筒仓容量不足: 产品={product_code}, 缺口={deficit_kg}kg")]
    CapacityError { product_code: String, deficit_kg: i64 },

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ReceptionError 转换
// ==========================================
impl From<ReceptionError> for ApiError {
    fn from(err: ReceptionError) -> Self {
        match err {
            ReceptionError::Validation(msg) => ApiError::ValidationError(msg),
            ReceptionError::DuplicateQuota { plate, quota_date } => {
                ApiError::DuplicateQuota { plate, quota_date }
            }
            ReceptionError::InactiveOrUnknownProduct(code) => ApiError::InactiveOrUnknownProduct(code),
            ReceptionError::InvalidTare { gross, tare } => ApiError::InvalidTare { gross, tare },
            ReceptionError::Capacity {
                product_code,
                deficit,
            } => ApiError::CapacityError {
                product_code,
                deficit_kg: deficit,
            },
            ReceptionError::OperationNotFound { plate, quota_date } => {
                ApiError::NotFound(format!("作业(车牌={}, 日期={})不存在", plate, quota_date))
            }
            ReceptionError::InvalidStateTransition { from, to } => ApiError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseError(format!("事务失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError { key, message } => {
                ApiError::DatabaseError(format!("集合{}数据损坏: {}", key, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OperationState;

    #[test]
    fn test_reception_error_conversion() {
        let api_err: ApiError = ReceptionError::Capacity {
            product_code: "P1".to_string(),
            deficit: 200,
        }
        .into();
        assert!(matches!(
            api_err,
            ApiError::CapacityError { deficit_kg: 200, .. }
        ));

        let api_err: ApiError = ReceptionError::InvalidStateTransition {
            from: OperationState::Pending,
            to: OperationState::GrossWeighed,
        }
        .into();
        match api_err {
            ApiError::InvalidStateTransition { from, to } => {
                assert_eq!(from, "PENDING");
                assert_eq!(to, "GROSS_WEIGHED");
            }
            _ => panic!("Expected InvalidStateTransition"),
        }
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Silo".to_string(),
            id: "S01".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Silo"));
                assert!(msg.contains("S01"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
    }
}
