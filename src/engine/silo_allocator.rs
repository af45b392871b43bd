// ==========================================
// 粮食接收系统 - 筒仓分配引擎
// ==========================================
// 职责: 将净重按集合顺序分配到该产品的筒仓
// 红线: 任一筒仓库存不得超过容量
// 红线: 总剩余空间不足时整体失败,不做任何修改
// 输入: 产品代码 + 净重 + 筒仓集合
// 输出: 新筒仓集合 + 各筒仓增量 (仅非零)
// ==========================================

use thiserror::Error;
use tracing::instrument;

use crate::domain::silo::{Silo, StorageConstraint};
use crate::domain::warning::SiloShare;

/// 分配错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("筒仓容量不足: product={product_code}, net={net_weight}kg, available={available}kg, deficit={deficit}kg")]
    CapacityShortfall {
        product_code: String,
        net_weight: i64,
        available: i64,
        deficit: i64,
    },

    #[error("净重无效: {0}kg")]
    InvalidNetWeight(i64),
}

/// 分配结果 (尚未落库,由调用方整体提交)
#[derive(Debug, Clone, PartialEq)]
pub struct SiloAllocation {
    pub product_code: String,
    pub net_weight: i64,
    pub updated_silos: Vec<Silo>, // 完整筒仓集合 (原顺序)
    pub shares: Vec<SiloShare>,   // 获得非零装入的筒仓
}

impl SiloAllocation {
    /// 是否分散到多个筒仓 (需要操作员确认)
    pub fn is_split(&self) -> bool {
        self.shares.len() > 1
    }

    pub fn total_allocated(&self) -> i64 {
        self.shares.iter().map(|s| s.delta).sum()
    }
}

// ==========================================
// SiloAllocator - 筒仓分配引擎
// ==========================================
#[derive(Debug, Default)]
pub struct SiloAllocator {
    // 无状态引擎
}

impl SiloAllocator {
    pub fn new() -> Self {
        Self {}
    }

    /// 该产品所有筒仓的剩余空间合计 (饱和加法,不溢出)
    pub fn available_space(&self, product_code: &str, silos: &[Silo]) -> i64 {
        silos
            .iter()
            .filter(|s| s.assigned_product == product_code)
            .map(|s| s.free_space())
            .fold(0i64, i64::saturating_add)
    }

    /// 分配净重
    ///
    /// 规则:
    /// 1) 只考虑 assigned_product 匹配的筒仓,保持集合顺序 (先到先装)
    /// 2) 剩余空间合计 < 净重 → CapacityShortfall(差额),输入不变
    /// 3) 依次装入 min(剩余净重, 剩余空间),直到分配完毕
    #[instrument(skip(self, silos), fields(silo_count = silos.len()))]
    pub fn allocate(
        &self,
        product_code: &str,
        net_weight: i64,
        silos: &[Silo],
    ) -> Result<SiloAllocation, AllocationError> {
        if net_weight < 0 {
            return Err(AllocationError::InvalidNetWeight(net_weight));
        }

        let available = self.available_space(product_code, silos);
        if available < net_weight {
            let deficit = net_weight - available;
            tracing::warn!(available, deficit, "筒仓剩余空间不足,拒绝入仓");
            return Err(AllocationError::CapacityShortfall {
                product_code: product_code.to_string(),
                net_weight,
                available,
                deficit,
            });
        }

        let mut remaining = net_weight;
        let mut shares = Vec::new();
        let mut updated_silos = Vec::with_capacity(silos.len());

        for silo in silos {
            let mut silo = silo.clone();
            if remaining > 0 && silo.assigned_product == product_code {
                let load = remaining.min(silo.free_space());
                if load > 0 {
                    silo.current_stock += load;
                    remaining -= load;
                    shares.push(SiloShare {
                        silo_id: silo.id.clone(),
                        silo_name: silo.name.clone(),
                        delta: load,
                    });
                }
            }
            updated_silos.push(silo);
        }

        debug_assert_eq!(remaining, 0);
        tracing::debug!(shares = shares.len(), "筒仓分配完成");

        Ok(SiloAllocation {
            product_code: product_code.to_string(),
            net_weight,
            updated_silos,
            shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_capacities_do_not_overflow() {
        let silos = vec![
            Silo::new("S01", "Norte", "X", 0, i64::MAX),
            Silo::new("S02", "Sur", "X", 0, i64::MAX),
        ];
        let allocator = SiloAllocator::new();
        assert_eq!(allocator.available_space("X", &silos), i64::MAX);

        let result = allocator.allocate("X", 500, &silos).unwrap();
        assert_eq!(result.updated_silos[0].current_stock, 500);
        assert_eq!(result.updated_silos[1].current_stock, 0);
        assert!(!result.is_split());
    }

    #[test]
    fn test_single_silo_receives_full_net() {
        let silos = vec![Silo::new("S01", "Norte", "X", 400, 1000)];
        let result = SiloAllocator::new().allocate("X", 500, &silos).unwrap();

        assert_eq!(result.updated_silos[0].current_stock, 900);
        assert_eq!(result.shares.len(), 1);
        assert!(!result.is_split());
    }

    #[test]
    fn test_shortfall_reports_exact_deficit() {
        let silos = vec![
            Silo::new("S01", "Norte", "X", 900, 1000),
            Silo::new("S02", "Sur", "X", 800, 1000),
        ];
        let err = SiloAllocator::new().allocate("X", 500, &silos).unwrap_err();

        match err {
            AllocationError::CapacityShortfall {
                available, deficit, ..
            } => {
                assert_eq!(available, 300);
                assert_eq!(deficit, 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // 输入不可变,库存保持原值
        assert_eq!(silos[0].current_stock, 900);
        assert_eq!(silos[1].current_stock, 800);
    }

    #[test]
    fn test_fills_in_collection_order_and_skips_other_products() {
        let silos = vec![
            Silo::new("S01", "Full", "X", 1000, 1000),
            Silo::new("S02", "Other", "Y", 0, 5000),
            Silo::new("S03", "A", "X", 0, 300),
            Silo::new("S04", "B", "X", 0, 1000),
            Silo::new("S05", "C", "X", 0, 1000),
        ];
        let result = SiloAllocator::new().allocate("X", 700, &silos).unwrap();

        let stocks: Vec<i64> = result.updated_silos.iter().map(|s| s.current_stock).collect();
        assert_eq!(stocks, vec![1000, 0, 300, 400, 0]);
        assert_eq!(
            result.shares.iter().map(|s| s.silo_id.as_str()).collect::<Vec<_>>(),
            vec!["S03", "S04"]
        );
        assert!(result.is_split());
        assert_eq!(result.total_allocated(), 700);
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let silos = vec![Silo::new("S01", "Norte", "X", 0, 500)];
        let result = SiloAllocator::new().allocate("X", 500, &silos).unwrap();
        assert_eq!(result.updated_silos[0].current_stock, 500);
    }

    #[test]
    fn test_no_eligible_silo_is_full_deficit() {
        let silos = vec![Silo::new("S01", "Norte", "Y", 0, 500)];
        let err = SiloAllocator::new().allocate("X", 120, &silos).unwrap_err();
        assert!(matches!(err, AllocationError::CapacityShortfall { deficit: 120, .. }));
    }

    #[test]
    fn test_zero_net_touches_nothing() {
        let silos = vec![Silo::new("S01", "Norte", "X", 10, 500)];
        let result = SiloAllocator::new().allocate("X", 0, &silos).unwrap();
        assert!(result.shares.is_empty());
        assert_eq!(result.updated_silos, silos);
    }
}
