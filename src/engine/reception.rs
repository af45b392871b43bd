// ==========================================
// 粮食接收系统 - 接收作业状态机
// ==========================================
// 状态路径: P(待到场) → A(已到场) → C(质检通过) → B(已过毛重) → F(已完成)
//                              ↘ R(拒收,终态)
// 红线: 只进不退;唯一的同状态写入是 B 状态下修正毛重
// 红线: 每个指令要么整体生效,要么不产生任何修改
// ==========================================
// 职责: 校验并执行状态转换 (纯函数)
// 输入: 指令 + 当前集合快照
// 输出: 新集合 (由调用方整体回写) 或类型化错误
// ==========================================

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::domain::operation::{normalize_plate, plate_key, Operation, OperationKey};
use crate::domain::product::{Product, QualityThreshold};
use crate::domain::silo::Silo;
use crate::domain::types::OperationState;
use crate::domain::warning::{AdvisoryWarning, SiloShare};
use crate::engine::quality::{QualityEvaluator, QualityVerdict};
use crate::engine::silo_allocator::{AllocationError, SiloAllocator};

/// 地磅下限 (kg)
pub const MIN_WEIGHT_KG: i64 = 1;
/// 地磅上限 (kg)
pub const MAX_WEIGHT_KG: i64 = 80_000;
/// 超过该值需要操作员确认 (kg)
pub const HEAVY_WEIGHT_WARNING_KG: i64 = 60_000;

// ==========================================
// ReceptionError - 状态机错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReceptionError {
    #[error("输入校验失败: {0}")]
    Validation(String),

    #[error("配额重复: plate={plate}, date={quota_date}")]
    DuplicateQuota { plate: String, quota_date: NaiveDate },

    #[error("产品不存在或未启用: {0}")]
    InactiveOrUnknownProduct(String),

    #[error("皮重必须小于毛重: gross={gross}kg, tare={tare}kg")]
    InvalidTare { gross: i64, tare: i64 },

    #[error("筒仓容量不足: product={product_code}, deficit={deficit}kg")]
    Capacity { product_code: String, deficit: i64 },

    #[error("作业不存在: plate={plate}, date={quota_date}")]
    OperationNotFound { plate: String, quota_date: NaiveDate },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition {
        from: OperationState,
        to: OperationState,
    },
}

impl From<AllocationError> for ReceptionError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::CapacityShortfall {
                product_code,
                deficit,
                ..
            } => ReceptionError::Capacity {
                product_code,
                deficit,
            },
            AllocationError::InvalidNetWeight(net) => {
                ReceptionError::Validation(format!("净重无效: {}kg", net))
            }
        }
    }
}

pub type ReceptionResult<T> = Result<T, ReceptionError>;

// ==========================================
// WeightPolicy - 称重规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightPolicy {
    pub min_kg: i64,
    pub max_kg: i64,
    pub heavy_warning_kg: i64,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            min_kg: MIN_WEIGHT_KG,
            max_kg: MAX_WEIGHT_KG,
            heavy_warning_kg: HEAVY_WEIGHT_WARNING_KG,
        }
    }
}

impl WeightPolicy {
    /// 范围校验 (闭区间)
    pub fn check(&self, weight: i64) -> ReceptionResult<()> {
        if weight < self.min_kg || weight > self.max_kg {
            return Err(ReceptionError::Validation(format!(
                "称重值超出范围: {}kg (允许 {}-{}kg)",
                weight, self.min_kg, self.max_kg
            )));
        }
        Ok(())
    }

    /// 偏高提示
    pub fn heavy_warning(&self, weight: i64) -> Option<AdvisoryWarning> {
        (weight > self.heavy_warning_kg).then_some(AdvisoryWarning::HeavyWeight {
            weight_kg: weight,
            threshold_kg: self.heavy_warning_kg,
        })
    }
}

// ==========================================
// 指令与快照
// ==========================================

/// 外部动作翻译后的指令
#[derive(Debug, Clone, PartialEq)]
pub enum ReceptionCommand {
    /// 发放配额
    GrantQuota {
        plate: String,
        product_code: String,
        quota_date: NaiveDate,
    },
    /// 登记到场
    RegisterArrival { key: OperationKey },
    /// 提交质检结果
    SubmitQuality {
        key: OperationKey,
        measurements: HashMap<String, f64>,
    },
    /// 记录毛重
    RecordGross {
        key: OperationKey,
        weight: i64,
        confirmed: bool,
    },
    /// 修正毛重 (仅 B 状态)
    CorrectGross {
        key: OperationKey,
        weight: i64,
        confirmed: bool,
    },
    /// 记录皮重并入仓
    RecordTare {
        key: OperationKey,
        weight: i64,
        confirmed: bool,
    },
}

impl ReceptionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ReceptionCommand::GrantQuota { .. } => "grant_quota",
            ReceptionCommand::RegisterArrival { .. } => "register_arrival",
            ReceptionCommand::SubmitQuality { .. } => "submit_quality",
            ReceptionCommand::RecordGross { .. } => "record_gross",
            ReceptionCommand::CorrectGross { .. } => "correct_gross",
            ReceptionCommand::RecordTare { .. } => "record_tare",
        }
    }
}

/// 执行指令所需的只读集合
#[derive(Debug, Clone, Copy)]
pub struct ReceptionSnapshot<'a> {
    pub operations: &'a [Operation],
    pub products: &'a [Product],
    pub thresholds: &'a [QualityThreshold],
    pub silos: &'a [Silo],
}

/// 入仓回执
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub net_weight: i64,
    pub shares: Vec<SiloShare>,
}

/// 一次已校验的状态转换 (新集合待整体回写)
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub operation: Operation,
    pub operations: Vec<Operation>,
    pub silos: Option<Vec<Silo>>, // 仅入仓时有值
    pub verdict: Option<QualityVerdict>,
    pub receipt: Option<SettlementReceipt>,
    pub warnings: Vec<AdvisoryWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// 校验通过,新集合可提交
    Applied(Transition),
    /// 需要操作员确认,未做任何修改
    ConfirmationRequired { warnings: Vec<AdvisoryWarning> },
}

/// 当日作业队列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceptionStage {
    Arrival,  // 待到场 (P)
    Quality,  // 待质检 (A)
    Weighing, // 待称重 (C 或 B)
}

impl ReceptionStage {
    pub fn accepts(self, state: OperationState) -> bool {
        match self {
            ReceptionStage::Arrival => state == OperationState::Pending,
            ReceptionStage::Quality => state == OperationState::Arrived,
            ReceptionStage::Weighing => {
                matches!(state, OperationState::Approved | OperationState::GrossWeighed)
            }
        }
    }
}

// ==========================================
// ReceptionStateMachine - 接收作业状态机
// ==========================================
#[derive(Debug, Default)]
pub struct ReceptionStateMachine {
    weight_policy: WeightPolicy,
    quality_evaluator: QualityEvaluator,
    silo_allocator: SiloAllocator,
}

impl ReceptionStateMachine {
    pub fn new(weight_policy: WeightPolicy) -> Self {
        Self {
            weight_policy,
            quality_evaluator: QualityEvaluator::new(),
            silo_allocator: SiloAllocator::new(),
        }
    }

    pub fn weight_policy(&self) -> &WeightPolicy {
        &self.weight_policy
    }

    /// 执行指令
    ///
    /// # 返回
    /// - Ok(Applied): 新集合,调用方需整体回写
    /// - Ok(ConfirmationRequired): 存在提示项且未确认,快照不变
    /// - Err: 类型化错误,快照不变
    #[instrument(skip(self, command, snapshot), fields(
        command = command.name(),
        operation_count = snapshot.operations.len()
    ))]
    pub fn apply(
        &self,
        command: &ReceptionCommand,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        let outcome = match command {
            ReceptionCommand::GrantQuota {
                plate,
                product_code,
                quota_date,
            } => self.grant_quota(plate, product_code, *quota_date, snapshot)?,
            ReceptionCommand::RegisterArrival { key } => self.register_arrival(key, snapshot)?,
            ReceptionCommand::SubmitQuality { key, measurements } => {
                self.submit_quality(key, measurements, snapshot)?
            }
            ReceptionCommand::RecordGross {
                key,
                weight,
                confirmed,
            } => self.record_gross(key, *weight, *confirmed, snapshot)?,
            ReceptionCommand::CorrectGross {
                key,
                weight,
                confirmed,
            } => self.correct_gross(key, *weight, *confirmed, snapshot)?,
            ReceptionCommand::RecordTare {
                key,
                weight,
                confirmed,
            } => self.record_tare(key, *weight, *confirmed, snapshot)?,
        };

        if let TransitionOutcome::Applied(t) = &outcome {
            tracing::info!(
                plate = %t.operation.plate,
                quota_date = %t.operation.quota_date,
                state = %t.operation.state,
                "状态转换已校验"
            );
        }
        Ok(outcome)
    }

    // ==========================================
    // 各指令实现
    // ==========================================

    fn grant_quota(
        &self,
        plate: &str,
        product_code: &str,
        quota_date: NaiveDate,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        let plate = normalize_plate(plate);
        if plate.is_empty() {
            return Err(ReceptionError::Validation("车牌不能为空".to_string()));
        }
        let product_code = product_code.trim();
        if product_code.is_empty() {
            return Err(ReceptionError::Validation("产品不能为空".to_string()));
        }

        let wanted = plate_key(&plate);
        let duplicate = snapshot
            .operations
            .iter()
            .any(|op| op.quota_date == quota_date && plate_key(&op.plate) == wanted);
        if duplicate {
            return Err(ReceptionError::DuplicateQuota { plate, quota_date });
        }

        let active = snapshot
            .products
            .iter()
            .any(|p| p.code == product_code && p.is_active());
        if !active {
            return Err(ReceptionError::InactiveOrUnknownProduct(
                product_code.to_string(),
            ));
        }

        let operation = Operation::new_quota(&plate, product_code, quota_date);
        let mut operations = snapshot.operations.to_vec();
        operations.push(operation.clone());

        Ok(applied(operation, operations))
    }

    fn register_arrival(
        &self,
        key: &OperationKey,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        let (index, current) = locate(
            key,
            snapshot.operations,
            OperationState::Pending,
            OperationState::Arrived,
        )?;

        let mut operation = current.clone();
        operation.state = OperationState::Arrived;
        Ok(applied(
            operation.clone(),
            replace_at(snapshot.operations, index, operation),
        ))
    }

    /// 质检结论 (C 或 R) 在判定前未知;状态不符时错误中的目标状态统一报告为 Approved
    fn submit_quality(
        &self,
        key: &OperationKey,
        measurements: &HashMap<String, f64>,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        let (index, current) = locate(
            key,
            snapshot.operations,
            OperationState::Arrived,
            OperationState::Approved,
        )?;

        let verdict =
            self.quality_evaluator
                .evaluate(&current.product_code, snapshot.thresholds, measurements);

        let mut operation = current.clone();
        operation.state = verdict.decision.target_state();

        let mut transition = transition_of(
            operation.clone(),
            replace_at(snapshot.operations, index, operation),
        );
        transition.verdict = Some(verdict);
        Ok(TransitionOutcome::Applied(transition))
    }

    fn record_gross(
        &self,
        key: &OperationKey,
        weight: i64,
        confirmed: bool,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        self.weight_policy.check(weight)?;
        let (index, current) = locate(
            key,
            snapshot.operations,
            OperationState::Approved,
            OperationState::GrossWeighed,
        )?;

        let warnings: Vec<AdvisoryWarning> =
            self.weight_policy.heavy_warning(weight).into_iter().collect();
        if !warnings.is_empty() && !confirmed {
            return Ok(TransitionOutcome::ConfirmationRequired { warnings });
        }

        let mut operation = current.clone();
        operation.gross_weight = weight;
        operation.state = OperationState::GrossWeighed;

        let mut transition = transition_of(
            operation.clone(),
            replace_at(snapshot.operations, index, operation),
        );
        transition.warnings = warnings;
        Ok(TransitionOutcome::Applied(transition))
    }

    fn correct_gross(
        &self,
        key: &OperationKey,
        weight: i64,
        confirmed: bool,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        self.weight_policy.check(weight)?;
        let (index, current) = locate(
            key,
            snapshot.operations,
            OperationState::GrossWeighed,
            OperationState::GrossWeighed,
        )?;

        let warnings: Vec<AdvisoryWarning> =
            self.weight_policy.heavy_warning(weight).into_iter().collect();
        if !warnings.is_empty() && !confirmed {
            return Ok(TransitionOutcome::ConfirmationRequired { warnings });
        }

        let mut operation = current.clone();
        operation.gross_weight = weight;

        let mut transition = transition_of(
            operation.clone(),
            replace_at(snapshot.operations, index, operation),
        );
        transition.warnings = warnings;
        Ok(TransitionOutcome::Applied(transition))
    }

    fn record_tare(
        &self,
        key: &OperationKey,
        weight: i64,
        confirmed: bool,
        snapshot: ReceptionSnapshot<'_>,
    ) -> ReceptionResult<TransitionOutcome> {
        self.weight_policy.check(weight)?;
        let (index, current) = locate(
            key,
            snapshot.operations,
            OperationState::GrossWeighed,
            OperationState::Finished,
        )?;

        // 皮重校验先于筒仓分配
        if weight >= current.gross_weight {
            return Err(ReceptionError::InvalidTare {
                gross: current.gross_weight,
                tare: weight,
            });
        }

        let net_weight = current.gross_weight - weight;
        let allocation =
            self.silo_allocator
                .allocate(&current.product_code, net_weight, snapshot.silos)?;

        let mut warnings = Vec::new();
        if allocation.is_split() {
            warnings.push(AdvisoryWarning::SplitAllocation {
                shares: allocation.shares.clone(),
            });
        }
        if !warnings.is_empty() && !confirmed {
            return Ok(TransitionOutcome::ConfirmationRequired { warnings });
        }

        let mut operation = current.clone();
        operation.tare_weight = weight;
        operation.state = OperationState::Finished;

        let mut transition = transition_of(
            operation.clone(),
            replace_at(snapshot.operations, index, operation),
        );
        transition.receipt = Some(SettlementReceipt {
            net_weight,
            shares: allocation.shares,
        });
        transition.silos = Some(allocation.updated_silos);
        transition.warnings = warnings;
        Ok(TransitionOutcome::Applied(transition))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 指定日期某环节的待处理作业 (保持集合顺序)
    pub fn work_queue<'a>(
        &self,
        operations: &'a [Operation],
        date: NaiveDate,
        stage: ReceptionStage,
    ) -> Vec<&'a Operation> {
        operations
            .iter()
            .filter(|op| op.quota_date == date && stage.accepts(op.state))
            .collect()
    }
}

// ==========================================
// 内部辅助
// ==========================================

/// 按键定位作业并校验当前状态
fn locate<'a>(
    key: &OperationKey,
    operations: &'a [Operation],
    expected: OperationState,
    target: OperationState,
) -> ReceptionResult<(usize, &'a Operation)> {
    let (index, op) = operations
        .iter()
        .enumerate()
        .find(|(_, op)| key.matches(op))
        .ok_or_else(|| ReceptionError::OperationNotFound {
            plate: key.plate.clone(),
            quota_date: key.quota_date,
        })?;

    if op.state != expected {
        return Err(ReceptionError::InvalidStateTransition {
            from: op.state,
            to: target,
        });
    }
    Ok((index, op))
}

fn replace_at(operations: &[Operation], index: usize, operation: Operation) -> Vec<Operation> {
    let mut next = operations.to_vec();
    next[index] = operation;
    next
}

fn transition_of(operation: Operation, operations: Vec<Operation>) -> Transition {
    Transition {
        operation,
        operations,
        silos: None,
        verdict: None,
        receipt: None,
        warnings: Vec::new(),
    }
}

fn applied(operation: Operation, operations: Vec<Operation>) -> TransitionOutcome {
    TransitionOutcome::Applied(transition_of(operation, operations))
}
