// ==========================================
// 粮食接收系统 - 接收数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 五个业务集合的类型化读写 (整集合替换)
// ==========================================

use std::sync::Arc;

use crate::domain::operation::Operation;
use crate::domain::product::{Product, QualityParameter, QualityThreshold};
use crate::domain::silo::Silo;
use crate::repository::collection_store::{
    collection_keys, load_collection, save_collection, to_json, CollectionStore,
};
use crate::repository::error::RepositoryResult;

// ==========================================
// ReceptionRepository - 接收数据仓储
// ==========================================
#[derive(Clone)]
pub struct ReceptionRepository {
    store: Arc<dyn CollectionStore>,
}

impl ReceptionRepository {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    // ===== 产品 =====

    pub fn load_products(&self) -> RepositoryResult<Vec<Product>> {
        load_collection(self.store.as_ref(), collection_keys::PRODUCTS)
    }

    pub fn save_products(&self, products: &[Product]) -> RepositoryResult<()> {
        save_collection(self.store.as_ref(), collection_keys::PRODUCTS, products)
    }

    // ===== 质检参数 =====

    pub fn load_quality_parameters(&self) -> RepositoryResult<Vec<QualityParameter>> {
        load_collection(self.store.as_ref(), collection_keys::QUALITY_PARAMETERS)
    }

    pub fn save_quality_parameters(&self, parameters: &[QualityParameter]) -> RepositoryResult<()> {
        save_collection(self.store.as_ref(), collection_keys::QUALITY_PARAMETERS, parameters)
    }

    // ===== 质检阈值 =====

    pub fn load_thresholds(&self) -> RepositoryResult<Vec<QualityThreshold>> {
        load_collection(self.store.as_ref(), collection_keys::QUALITY_THRESHOLDS)
    }

    pub fn save_thresholds(&self, thresholds: &[QualityThreshold]) -> RepositoryResult<()> {
        save_collection(self.store.as_ref(), collection_keys::QUALITY_THRESHOLDS, thresholds)
    }

    // ===== 筒仓 =====

    pub fn load_silos(&self) -> RepositoryResult<Vec<Silo>> {
        load_collection(self.store.as_ref(), collection_keys::SILOS)
    }

    pub fn save_silos(&self, silos: &[Silo]) -> RepositoryResult<()> {
        save_collection(self.store.as_ref(), collection_keys::SILOS, silos)
    }

    // ===== 作业 =====

    pub fn load_operations(&self) -> RepositoryResult<Vec<Operation>> {
        load_collection(self.store.as_ref(), collection_keys::OPERATIONS)
    }

    pub fn save_operations(&self, operations: &[Operation]) -> RepositoryResult<()> {
        save_collection(self.store.as_ref(), collection_keys::OPERATIONS, operations)
    }

    /// 入仓提交: 作业与筒仓在同一批次内写入
    pub fn save_settlement(&self, operations: &[Operation], silos: &[Silo]) -> RepositoryResult<()> {
        let entries = [
            (
                collection_keys::OPERATIONS,
                to_json(collection_keys::OPERATIONS, operations)?,
            ),
            (collection_keys::SILOS, to_json(collection_keys::SILOS, silos)?),
        ];
        self.store.save_batch_raw(&entries)?;

        tracing::debug!(
            operation_count = operations.len(),
            silo_count = silos.len(),
            "入仓批次已提交"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ProductStatus;
    use crate::repository::collection_store::InMemoryCollectionStore;
    use chrono::NaiveDate;

    fn repo() -> ReceptionRepository {
        ReceptionRepository::new(Arc::new(InMemoryCollectionStore::new()))
    }

    #[test]
    fn test_empty_store_yields_empty_collections() {
        let repo = repo();
        assert!(repo.load_products().unwrap().is_empty());
        assert!(repo.load_operations().unwrap().is_empty());
        assert!(repo.load_silos().unwrap().is_empty());
    }

    #[test]
    fn test_settlement_writes_operations_and_silos() {
        let repo = repo();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut op = Operation::new_quota("ABC123", "P1", date);
        op.state = crate::domain::types::OperationState::Finished;
        op.gross_weight = 30_000;
        op.tare_weight = 12_000;

        repo.save_settlement(&[op.clone()], &[Silo::new("S01", "Norte", "P1", 18_000, 50_000)])
            .unwrap();

        assert_eq!(repo.load_operations().unwrap(), vec![op]);
        assert_eq!(repo.load_silos().unwrap()[0].current_stock, 18_000);
    }

    #[test]
    fn test_products_roundtrip_keeps_order() {
        let repo = repo();
        let products = vec![
            Product::new("P2", "Soja", ProductStatus::Inactive),
            Product::new("P1", "Trigo", ProductStatus::Active),
        ];
        repo.save_products(&products).unwrap();
        assert_eq!(repo.load_products().unwrap(), products);
    }
}
