// ==========================================
// 粮食接收系统 - 操作员确认提示
// ==========================================
// 非错误: 需要操作员确认后以 confirmed=true 重新提交
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 入仓分配明细中的单个筒仓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiloShare {
    pub silo_id: String,
    pub silo_name: String,
    pub delta: i64, // 本次装入 (kg)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryWarning {
    /// 称重值超过提示阈值
    HeavyWeight { weight_kg: i64, threshold_kg: i64 },
    /// 净重分配到多个筒仓
    SplitAllocation { shares: Vec<SiloShare> },
}

impl fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryWarning::HeavyWeight {
                weight_kg,
                threshold_kg,
            } => write!(f, "称重值异常偏高: {}kg > {}kg", weight_kg, threshold_kg),
            AdvisoryWarning::SplitAllocation { shares } => {
                let detail = shares
                    .iter()
                    .map(|s| format!("{}: +{}kg", s.silo_name, s.delta))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "净重将分配到{}个筒仓 ({})", shares.len(), detail)
            }
        }
    }
}
