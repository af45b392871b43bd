// ==========================================
// 粮食接收系统 - 质检判定引擎
// ==========================================
// 职责: 根据产品阈值判定接收/拒收 (纯函数,无副作用)
// 规则: 全部合格 → 接收
//       项目数 > 1 且恰好 1 项不合格 → 接收 (容忍一项)
//       其余 → 拒收
// 注意: 未配置任何阈值时 0 == 0 成立,一律接收
// ==========================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::product::QualityThreshold;
use crate::domain::types::QualityDecision;

/// 单个质检项目的核对结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCheck {
    pub parameter_code: String,
    pub min: f64,
    pub max: f64,
    pub measured: Option<f64>, // 缺失的测量值按不合格处理
    pub passed: bool,
}

/// 质检判定结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityVerdict {
    pub decision: QualityDecision,
    pub total: usize,
    pub passing: usize,
    pub checks: Vec<ParameterCheck>,
}

impl QualityVerdict {
    pub fn is_approved(&self) -> bool {
        self.decision == QualityDecision::Approved
    }

    pub fn failing(&self) -> usize {
        self.total - self.passing
    }
}

/// 判定规则本体
pub fn decide(total: usize, passing: usize) -> QualityDecision {
    if passing == total || (total > 1 && passing + 1 == total) {
        QualityDecision::Approved
    } else {
        QualityDecision::Rejected
    }
}

// ==========================================
// QualityEvaluator - 质检判定引擎
// ==========================================
#[derive(Debug, Default)]
pub struct QualityEvaluator {
    // 无状态引擎
}

impl QualityEvaluator {
    pub fn new() -> Self {
        Self {}
    }

    /// 判定一车货的质检结果
    ///
    /// # 参数
    /// - `product_code`: 产品代码,只取该产品的阈值
    /// - `thresholds`: 阈值全集 (可含其他产品)
    /// - `measurements`: 质检项目代码 → 测量值
    #[instrument(skip(self, thresholds, measurements), fields(
        product_code = %product_code,
        measurement_count = measurements.len()
    ))]
    pub fn evaluate(
        &self,
        product_code: &str,
        thresholds: &[QualityThreshold],
        measurements: &HashMap<String, f64>,
    ) -> QualityVerdict {
        let checks: Vec<ParameterCheck> = thresholds
            .iter()
            .filter(|t| t.product_code == product_code)
            .map(|t| {
                let measured = measurements.get(&t.parameter_code).copied();
                ParameterCheck {
                    parameter_code: t.parameter_code.clone(),
                    min: t.min,
                    max: t.max,
                    measured,
                    passed: measured.map(|v| t.contains(v)).unwrap_or(false),
                }
            })
            .collect();

        let total = checks.len();
        let passing = checks.iter().filter(|c| c.passed).count();
        let decision = decide(total, passing);

        tracing::debug!(total, passing, %decision, "质检判定完成");

        QualityVerdict {
            decision,
            total,
            passing,
            checks,
        }
    }
}
