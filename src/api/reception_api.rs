// ==========================================
// 粮食接收系统 - 接收作业 API
// ==========================================
// 职责: 配额发放、到场登记、质检、过磅、入仓
// 流程: 解析输入 → 读全集 → 状态机 → 整体回写
// 约定: 作业按 (车牌, 当日) 定位,当日默认取本地日期
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::config::ReceptionConfig;
use crate::domain::operation::{Operation, OperationKey};
use crate::domain::warning::AdvisoryWarning;
use crate::engine::quality::QualityVerdict;
use crate::engine::reception::{
    ReceptionCommand, ReceptionSnapshot, ReceptionStage, ReceptionStateMachine,
    SettlementReceipt, TransitionOutcome,
};
use crate::repository::reception_repo::ReceptionRepository;

// ==========================================
// ReceptionResponse - 指令执行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceptionResponse {
    /// 已写入存储
    Committed {
        operation: Operation,
        verdict: Option<QualityVerdict>,
        receipt: Option<SettlementReceipt>,
        warnings: Vec<AdvisoryWarning>,
    },
    /// 需要操作员确认后以 confirmed=true 重新提交,未做任何修改
    ConfirmationRequired { warnings: Vec<AdvisoryWarning> },
}

impl ReceptionResponse {
    pub fn is_committed(&self) -> bool {
        matches!(self, ReceptionResponse::Committed { .. })
    }

    pub fn operation(&self) -> Option<&Operation> {
        match self {
            ReceptionResponse::Committed { operation, .. } => Some(operation),
            ReceptionResponse::ConfirmationRequired { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[AdvisoryWarning] {
        match self {
            ReceptionResponse::Committed { warnings, .. } => warnings,
            ReceptionResponse::ConfirmationRequired { warnings } => warnings,
        }
    }
}

// ==========================================
// ReceptionApi - 接收作业 API
// ==========================================
pub struct ReceptionApi {
    repo: Arc<ReceptionRepository>,
    state_machine: ReceptionStateMachine,
    config: ReceptionConfig,
    today: Option<NaiveDate>,
}

impl ReceptionApi {
    /// 创建新的ReceptionApi实例
    pub fn new(repo: Arc<ReceptionRepository>, config: ReceptionConfig) -> Self {
        Self {
            repo,
            state_machine: ReceptionStateMachine::new(config.to_weight_policy()),
            config,
            today: None,
        }
    }

    /// 固定业务日期 (测试与补录使用)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// 当前业务日期
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    // ==========================================
    // 指令
    // ==========================================

    /// 发放配额
    ///
    /// # 参数
    /// - plate: 车牌
    /// - product_code: 产品代码 (必须启用)
    /// - quota_date: 配额日期 (YYYY-MM-DD)
    ///
    /// # 返回
    /// - Ok(Operation): 新建的待到场作业
    /// - Err(ApiError::DuplicateQuota): 同车牌同日已有配额
    pub fn grant_quota(&self, plate: &str, product_code: &str, quota_date: &str) -> ApiResult<Operation> {
        let command = ReceptionCommand::GrantQuota {
            plate: validator::validate_plate(plate, self.config.enforce_plate_format)?,
            product_code: validator::require_non_empty("产品代码", product_code)?,
            quota_date: validator::parse_iso_date("配额", quota_date)?,
        };

        match self.execute(&command)? {
            ReceptionResponse::Committed { operation, .. } => Ok(operation),
            ReceptionResponse::ConfirmationRequired { .. } => Err(ApiError::InternalError(
                "发放配额不应要求确认".to_string(),
            )),
        }
    }

    /// 登记到场 (当日配额)
    pub fn register_arrival(&self, plate: &str) -> ApiResult<Operation> {
        let command = ReceptionCommand::RegisterArrival {
            key: self.today_key(plate)?,
        };

        match self.execute(&command)? {
            ReceptionResponse::Committed { operation, .. } => Ok(operation),
            ReceptionResponse::ConfirmationRequired { .. } => Err(ApiError::InternalError(
                "到场登记不应要求确认".to_string(),
            )),
        }
    }

    /// 提交质检测量值
    ///
    /// # 参数
    /// - measurements: 参数代码 → 原始输入
    ///
    /// # 返回
    /// - Ok(QualityVerdict): 判定明细;作业已转为 C 或 R
    pub fn submit_quality(
        &self,
        plate: &str,
        measurements: &HashMap<String, String>,
    ) -> ApiResult<QualityVerdict> {
        let command = ReceptionCommand::SubmitQuality {
            key: self.today_key(plate)?,
            measurements: validator::parse_measurements(measurements)?,
        };

        match self.execute(&command)? {
            ReceptionResponse::Committed {
                verdict: Some(verdict),
                ..
            } => Ok(verdict),
            _ => Err(ApiError::InternalError("质检未返回判定结果".to_string())),
        }
    }

    /// 记录毛重
    pub fn record_gross(&self, plate: &str, weight: &str, confirmed: bool) -> ApiResult<ReceptionResponse> {
        self.execute(&ReceptionCommand::RecordGross {
            key: self.today_key(plate)?,
            weight: validator::parse_weight("毛重", weight)?,
            confirmed,
        })
    }

    /// 修正毛重 (仅已过毛重的作业)
    pub fn correct_gross(&self, plate: &str, weight: &str, confirmed: bool) -> ApiResult<ReceptionResponse> {
        self.execute(&ReceptionCommand::CorrectGross {
            key: self.today_key(plate)?,
            weight: validator::parse_weight("毛重", weight)?,
            confirmed,
        })
    }

    /// 记录皮重并入仓
    ///
    /// # 返回
    /// - Committed: 作业完成,筒仓库存已更新,附入仓回执
    /// - ConfirmationRequired: 需分仓装载,等待确认
    pub fn record_tare(&self, plate: &str, weight: &str, confirmed: bool) -> ApiResult<ReceptionResponse> {
        self.execute(&ReceptionCommand::RecordTare {
            key: self.today_key(plate)?,
            weight: validator::parse_weight("皮重", weight)?,
            confirmed,
        })
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 全部作业
    pub fn list_operations(&self) -> ApiResult<Vec<Operation>> {
        Ok(self.repo.load_operations()?)
    }

    /// 当日某环节的待处理作业
    pub fn work_queue(&self, stage: ReceptionStage) -> ApiResult<Vec<Operation>> {
        let operations = self.repo.load_operations()?;
        Ok(self
            .state_machine
            .work_queue(&operations, self.today(), stage)
            .into_iter()
            .cloned()
            .collect())
    }

    // ==========================================
    // 内部
    // ==========================================

    fn today_key(&self, plate: &str) -> ApiResult<OperationKey> {
        let plate = validator::require_non_empty("车牌", plate)?;
        Ok(OperationKey::new(plate, self.today()))
    }

    /// 读全集 → 状态机 → 整体回写
    fn execute(&self, command: &ReceptionCommand) -> ApiResult<ReceptionResponse> {
        let operations = self.repo.load_operations()?;
        let products = self.repo.load_products()?;
        let thresholds = self.repo.load_thresholds()?;
        let silos = self.repo.load_silos()?;

        let snapshot = ReceptionSnapshot {
            operations: &operations,
            products: &products,
            thresholds: &thresholds,
            silos: &silos,
        };

        let transition = match self.state_machine.apply(command, snapshot)? {
            TransitionOutcome::Applied(transition) => transition,
            TransitionOutcome::ConfirmationRequired { warnings } => {
                tracing::info!(
                    command = command.name(),
                    warning_count = warnings.len(),
                    "等待操作员确认"
                );
                return Ok(ReceptionResponse::ConfirmationRequired { warnings });
            }
        };

        match &transition.silos {
            Some(updated_silos) => self.repo.save_settlement(&transition.operations, updated_silos)?,
            None => self.repo.save_operations(&transition.operations)?,
        }

        Ok(ReceptionResponse::Committed {
            operation: transition.operation,
            verdict: transition.verdict,
            receipt: transition.receipt,
            warnings: transition.warnings,
        })
    }
}
