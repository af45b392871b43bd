// ==========================================
// 粮食接收系统 - 筒仓领域模型
// ==========================================
// 红线: current_stock 永远不超过 capacity
// 用途: 卸货入仓时的容量分配
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Silo - 筒仓
// ==========================================
// 同一产品可以分配多个筒仓;集合顺序即装填优先级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Silo {
    pub id: String,               // 筒仓编号 (唯一)
    pub name: String,             // 名称/位置
    pub assigned_product: String, // 分配的产品代码
    pub current_stock: i64,       // 当前库存 (kg)
    pub capacity: i64,            // 容量上限 (kg)
}

impl Silo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        assigned_product: impl Into<String>,
        current_stock: i64,
        capacity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assigned_product: assigned_product.into(),
            current_stock,
            capacity,
        }
    }
}

// ==========================================
// Trait: StorageConstraint
// ==========================================
// 用途: SiloAllocator 容量检查接口
pub trait StorageConstraint {
    /// 剩余空间 (kg),不为负
    fn free_space(&self) -> i64;

    /// 是否可以整体装入
    fn can_store(&self, weight: i64) -> bool;

    /// 是否已满
    fn is_full(&self) -> bool;

    /// 填充率 (0.0 - 1.0)
    fn fill_ratio(&self) -> f64;
}

impl StorageConstraint for Silo {
    fn free_space(&self) -> i64 {
        self.capacity.saturating_sub(self.current_stock).max(0)
    }

    fn can_store(&self, weight: i64) -> bool {
        weight <= self.free_space()
    }

    fn is_full(&self) -> bool {
        self.free_space() == 0
    }

    fn fill_ratio(&self) -> f64 {
        if self.capacity <= 0 {
            return 0.0;
        }
        (self.current_stock as f64 / self.capacity as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_space_and_fill_ratio() {
        let silo = Silo::new("S01", "Norte 1", "P1", 400, 1000);
        assert_eq!(silo.free_space(), 600);
        assert!(silo.can_store(600));
        assert!(!silo.can_store(601));
        assert!(!silo.is_full());
        assert!((silo.fill_ratio() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_over_filled_silo_reports_zero_free_space() {
        let silo = Silo::new("S02", "Sur", "P1", 1200, 1000);
        assert_eq!(silo.free_space(), 0);
        assert!(silo.is_full());
    }
}
