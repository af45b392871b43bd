// ==========================================
// 粮食接收系统 - 接收作业领域模型
// ==========================================
// 依据: 配额 → 到场 → 质检 → 毛重 → 皮重 → 入仓
// 红线: (规范化车牌, 配额日期) 在创建时唯一
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::OperationState;

/// 车牌规范化 (存储用): 去首尾空白并转大写,保留内部空格
pub fn normalize_plate(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 车牌比较键: 大写并去除所有空白
pub fn plate_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

// ==========================================
// OperationKey - 作业定位键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationKey {
    pub plate: String,
    pub quota_date: NaiveDate,
}

impl OperationKey {
    pub fn new(plate: impl AsRef<str>, quota_date: NaiveDate) -> Self {
        Self {
            plate: normalize_plate(plate.as_ref()),
            quota_date,
        }
    }

    /// 是否指向同一作业 (忽略车牌空白差异)
    pub fn matches(&self, op: &Operation) -> bool {
        op.quota_date == self.quota_date && plate_key(&op.plate) == plate_key(&self.plate)
    }
}

// ==========================================
// Operation - 接收作业
// ==========================================
// 对齐: operations 集合记录结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    // ===== 标识 =====
    pub plate: String,          // 车牌 (大写)
    pub product_code: String,   // 产品代码
    pub quota_date: NaiveDate,  // 配额日期 (无时间)

    // ===== 状态 =====
    pub state: OperationState,

    // ===== 称重 (kg) =====
    pub gross_weight: i64, // 毛重,自毛重环节起有效
    pub tare_weight: i64,  // 皮重,自皮重环节起有效
}

impl Operation {
    /// 新发放的配额: 状态 Pending,毛重/皮重为 0
    pub fn new_quota(plate: &str, product_code: impl Into<String>, quota_date: NaiveDate) -> Self {
        Self {
            plate: normalize_plate(plate),
            product_code: product_code.into(),
            quota_date,
            state: OperationState::Pending,
            gross_weight: 0,
            tare_weight: 0,
        }
    }

    pub fn key(&self) -> OperationKey {
        OperationKey::new(&self.plate, self.quota_date)
    }

    /// 净重 = 毛重 − 皮重,不为负
    pub fn net_weight(&self) -> i64 {
        (self.gross_weight - self.tare_weight).max(0)
    }

    pub fn is_finished(&self) -> bool {
        self.state == OperationState::Finished
    }
}
