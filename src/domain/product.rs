// ==========================================
// 粮食接收系统 - 产品与质检项领域模型
// ==========================================
// 依据: 产品主数据 / 质检项目 / 产品质检阈值
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::ProductStatus;

// ==========================================
// Product - 产品
// ==========================================
// 红线: 只有启用状态的产品可发放配额
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,          // 产品代码 (唯一)
    pub name: String,          // 产品名称
    pub status: ProductStatus, // 启用/停用
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, status: ProductStatus) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

// ==========================================
// QualityParameter - 质检项目
// ==========================================
// 用途: 阈值展示名称 (例如 "湿度"、"杂质")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityParameter {
    pub code: String, // 项目代码 (唯一)
    pub name: String, // 项目名称
}

impl QualityParameter {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

// ==========================================
// QualityThreshold - 产品质检阈值
// ==========================================
// 闭区间 [min, max],同一产品可配置多个项目,也可以一个都不配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThreshold {
    pub product_code: String,   // 产品代码
    pub parameter_code: String, // 质检项目代码
    pub min: f64,               // 下限 (含)
    pub max: f64,               // 上限 (含)
}

impl QualityThreshold {
    pub fn new(
        product_code: impl Into<String>,
        parameter_code: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            parameter_code: parameter_code.into(),
            min,
            max,
        }
    }

    /// 测量值是否落在闭区间内
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        let t = QualityThreshold::new("P1", "HUM", 10.0, 20.0);
        assert!(t.contains(10.0));
        assert!(t.contains(20.0));
        assert!(!t.contains(9.99));
        assert!(!t.contains(25.0));
        assert!(!t.contains(f64::NAN));
    }

    #[test]
    fn test_product_status_wire_format() {
        let p = Product::new("P1", "Trigo", ProductStatus::Active);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["status"], "A");
        assert!(p.is_active());
    }
}
