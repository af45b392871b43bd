// ==========================================
// 粮食接收系统 - 基础数据维护 API
// ==========================================
// 职责: 产品、质检参数、质检阈值、筒仓的增删改查
// 约束: 代码唯一;阈值每个 (产品, 参数) 至多一条;库存不超容量
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::product::{Product, QualityParameter, QualityThreshold};
use crate::domain::silo::Silo;
use crate::domain::types::ProductStatus;
use crate::repository::reception_repo::ReceptionRepository;

// ==========================================
// CatalogApi - 基础数据维护 API
// ==========================================
pub struct CatalogApi {
    repo: Arc<ReceptionRepository>,
}

impl CatalogApi {
    pub fn new(repo: Arc<ReceptionRepository>) -> Self {
        Self { repo }
    }

    // ==========================================
    // 产品
    // ==========================================

    pub fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.repo.load_products()?)
    }

    /// 新增产品
    ///
    /// # 返回
    /// - Err(ApiError::BusinessRuleViolation): 产品代码已存在
    pub fn create_product(&self, code: &str, name: &str, status: ProductStatus) -> ApiResult<Product> {
        let code = validator::require_non_empty("产品代码", code)?;
        let name = validator::require_non_empty("产品名称", name)?;

        let mut products = self.repo.load_products()?;
        if products.iter().any(|p| p.code == code) {
            return Err(ApiError::BusinessRuleViolation(format!("产品代码已存在: {}", code)));
        }

        let product = Product::new(code, name, status);
        products.push(product.clone());
        self.repo.save_products(&products)?;

        tracing::info!(product_code = %product.code, "产品已新增");
        Ok(product)
    }

    /// 修改产品名称与状态
    pub fn update_product(&self, code: &str, name: &str, status: ProductStatus) -> ApiResult<Product> {
        let name = validator::require_non_empty("产品名称", name)?;

        let mut products = self.repo.load_products()?;
        let product = products
            .iter_mut()
            .find(|p| p.code == code.trim())
            .ok_or_else(|| ApiError::NotFound(format!("产品(code={})不存在", code)))?;
        product.name = name;
        product.status = status;
        let updated = product.clone();

        self.repo.save_products(&products)?;
        Ok(updated)
    }

    /// 删除产品
    ///
    /// 已分配筒仓或已配置阈值的产品不可删除
    pub fn delete_product(&self, code: &str) -> ApiResult<()> {
        let code = code.trim();
        let mut products = self.repo.load_products()?;
        let before = products.len();
        products.retain(|p| p.code != code);
        if products.len() == before {
            return Err(ApiError::NotFound(format!("产品(code={})不存在", code)));
        }

        if self.repo.load_silos()?.iter().any(|s| s.assigned_product == code) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "产品{}仍有筒仓分配,不可删除",
                code
            )));
        }
        if self.repo.load_thresholds()?.iter().any(|t| t.product_code == code) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "产品{}仍有质检阈值,不可删除",
                code
            )));
        }

        self.repo.save_products(&products)?;
        Ok(())
    }

    // ==========================================
    // 质检参数
    // ==========================================

    pub fn list_parameters(&self) -> ApiResult<Vec<QualityParameter>> {
        Ok(self.repo.load_quality_parameters()?)
    }

    /// 新增或修改质检参数 (按代码覆盖名称)
    pub fn upsert_parameter(&self, code: &str, name: &str) -> ApiResult<QualityParameter> {
        let code = validator::require_non_empty("参数代码", code)?;
        let name = validator::require_non_empty("参数名称", name)?;

        let mut parameters = self.repo.load_quality_parameters()?;
        let parameter = QualityParameter::new(code, name);
        match parameters.iter_mut().find(|p| p.code == parameter.code) {
            Some(existing) => *existing = parameter.clone(),
            None => parameters.push(parameter.clone()),
        }

        self.repo.save_quality_parameters(&parameters)?;
        Ok(parameter)
    }

    /// 删除质检参数 (仍被阈值引用时不可删除)
    pub fn delete_parameter(&self, code: &str) -> ApiResult<()> {
        let code = code.trim();
        if self.repo.load_thresholds()?.iter().any(|t| t.parameter_code == code) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "参数{}仍被质检阈值引用,不可删除",
                code
            )));
        }

        let mut parameters = self.repo.load_quality_parameters()?;
        let before = parameters.len();
        parameters.retain(|p| p.code != code);
        if parameters.len() == before {
            return Err(ApiError::NotFound(format!("质检参数(code={})不存在", code)));
        }

        self.repo.save_quality_parameters(&parameters)?;
        Ok(())
    }

    // ==========================================
    // 质检阈值
    // ==========================================

    /// 查询阈值 (可按产品过滤)
    pub fn list_thresholds(&self, product_code: Option<&str>) -> ApiResult<Vec<QualityThreshold>> {
        let thresholds = self.repo.load_thresholds()?;
        Ok(match product_code {
            Some(code) => thresholds
                .into_iter()
                .filter(|t| t.product_code == code.trim())
                .collect(),
            None => thresholds,
        })
    }

    /// 新增或替换阈值 (每个 产品×参数 至多一条)
    pub fn upsert_threshold(
        &self,
        product_code: &str,
        parameter_code: &str,
        min: f64,
        max: f64,
    ) -> ApiResult<QualityThreshold> {
        let product_code = validator::require_non_empty("产品代码", product_code)?;
        let parameter_code = validator::require_non_empty("参数代码", parameter_code)?;
        validator::validate_threshold_range(min, max)?;

        if !self.repo.load_products()?.iter().any(|p| p.code == product_code) {
            return Err(ApiError::NotFound(format!("产品(code={})不存在", product_code)));
        }
        if !self
            .repo
            .load_quality_parameters()?
            .iter()
            .any(|p| p.code == parameter_code)
        {
            return Err(ApiError::NotFound(format!(
                "质检参数(code={})不存在",
                parameter_code
            )));
        }

        let threshold = QualityThreshold::new(product_code, parameter_code, min, max);
        let mut thresholds = self.repo.load_thresholds()?;
        match thresholds.iter_mut().find(|t| {
            t.product_code == threshold.product_code && t.parameter_code == threshold.parameter_code
        }) {
            Some(existing) => *existing = threshold.clone(),
            None => thresholds.push(threshold.clone()),
        }

        self.repo.save_thresholds(&thresholds)?;
        Ok(threshold)
    }

    pub fn delete_threshold(&self, product_code: &str, parameter_code: &str) -> ApiResult<()> {
        let mut thresholds = self.repo.load_thresholds()?;
        let before = thresholds.len();
        thresholds.retain(|t| {
            !(t.product_code == product_code.trim() && t.parameter_code == parameter_code.trim())
        });
        if thresholds.len() == before {
            return Err(ApiError::NotFound(format!(
                "质检阈值(product={}, parameter={})不存在",
                product_code, parameter_code
            )));
        }

        self.repo.save_thresholds(&thresholds)?;
        Ok(())
    }

    // ==========================================
    // 筒仓
    // ==========================================

    pub fn list_silos(&self) -> ApiResult<Vec<Silo>> {
        Ok(self.repo.load_silos()?)
    }

    /// 新增筒仓 (追加到末尾,即最低装填优先级)
    pub fn create_silo(&self, silo: Silo) -> ApiResult<Silo> {
        let silo = self.validate_silo(silo)?;

        let mut silos = self.repo.load_silos()?;
        if silos.iter().any(|s| s.id == silo.id) {
            return Err(ApiError::BusinessRuleViolation(format!("筒仓编号已存在: {}", silo.id)));
        }
        silos.push(silo.clone());
        self.repo.save_silos(&silos)?;

        tracing::info!(silo_id = %silo.id, product = %silo.assigned_product, "筒仓已新增");
        Ok(silo)
    }

    /// 修改筒仓 (保持原有位置)
    pub fn update_silo(&self, silo: Silo) -> ApiResult<Silo> {
        let silo = self.validate_silo(silo)?;

        let mut silos = self.repo.load_silos()?;
        let existing = silos
            .iter_mut()
            .find(|s| s.id == silo.id)
            .ok_or_else(|| ApiError::NotFound(format!("筒仓(id={})不存在", silo.id)))?;
        *existing = silo.clone();

        self.repo.save_silos(&silos)?;
        Ok(silo)
    }

    pub fn delete_silo(&self, id: &str) -> ApiResult<()> {
        let mut silos = self.repo.load_silos()?;
        let before = silos.len();
        silos.retain(|s| s.id != id.trim());
        if silos.len() == before {
            return Err(ApiError::NotFound(format!("筒仓(id={})不存在", id)));
        }

        self.repo.save_silos(&silos)?;
        Ok(())
    }

    fn validate_silo(&self, mut silo: Silo) -> ApiResult<Silo> {
        silo.id = validator::require_non_empty("筒仓编号", &silo.id)?;
        silo.name = validator::require_non_empty("筒仓名称", &silo.name)?;
        silo.assigned_product = validator::require_non_empty("分配产品", &silo.assigned_product)?;
        validator::validate_silo_stock(silo.current_stock, silo.capacity)?;

        if !self
            .repo
            .load_products()?
            .iter()
            .any(|p| p.code == silo.assigned_product)
        {
            return Err(ApiError::NotFound(format!(
                "产品(code={})不存在",
                silo.assigned_product
            )));
        }
        Ok(silo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::collection_store::InMemoryCollectionStore;

    fn api() -> CatalogApi {
        CatalogApi::new(Arc::new(ReceptionRepository::new(Arc::new(
            InMemoryCollectionStore::new(),
        ))))
    }

    #[test]
    fn test_product_code_is_unique() {
        let api = api();
        api.create_product("P1", "Trigo", ProductStatus::Active).unwrap();
        assert!(matches!(
            api.create_product("P1", "Otro", ProductStatus::Active),
            Err(ApiError::BusinessRuleViolation(_))
        ));

        let updated = api.update_product("P1", "Trigo pan", ProductStatus::Inactive).unwrap();
        assert!(!updated.is_active());
    }

    #[test]
    fn test_threshold_upsert_replaces_pair() {
        let api = api();
        api.create_product("P1", "Trigo", ProductStatus::Active).unwrap();
        api.upsert_parameter("HUM", "Humedad").unwrap();

        api.upsert_threshold("P1", "HUM", 10.0, 20.0).unwrap();
        api.upsert_threshold("P1", "HUM", 11.0, 14.5).unwrap();

        let thresholds = api.list_thresholds(Some("P1")).unwrap();
        assert_eq!(thresholds.len(), 1);
        assert_eq!(thresholds[0].max, 14.5);

        assert!(matches!(
            api.upsert_threshold("P1", "HUM", 20.0, 10.0),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            api.upsert_threshold("P1", "PROT", 1.0, 2.0),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_silo_validation_and_order() {
        let api = api();
        api.create_product("P1", "Trigo", ProductStatus::Active).unwrap();

        api.create_silo(Silo::new("S01", "Norte", "P1", 0, 1000)).unwrap();
        api.create_silo(Silo::new("S02", "Sur", "P1", 0, 500)).unwrap();
        assert!(matches!(
            api.create_silo(Silo::new("S03", "Este", "P1", 600, 500)),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            api.create_silo(Silo::new("S04", "Oeste", "P9", 0, 500)),
            Err(ApiError::NotFound(_))
        ));

        api.update_silo(Silo::new("S01", "Norte", "P1", 400, 1000)).unwrap();
        let silos = api.list_silos().unwrap();
        assert_eq!(silos[0].id, "S01");
        assert_eq!(silos[0].current_stock, 400);
    }

    #[test]
    fn test_referenced_entries_cannot_be_deleted() {
        let api = api();
        api.create_product("P1", "Trigo", ProductStatus::Active).unwrap();
        api.upsert_parameter("HUM", "Humedad").unwrap();
        api.upsert_threshold("P1", "HUM", 10.0, 20.0).unwrap();

        assert!(matches!(api.delete_parameter("HUM"), Err(ApiError::BusinessRuleViolation(_))));
        assert!(matches!(api.delete_product("P1"), Err(ApiError::BusinessRuleViolation(_))));

        api.delete_threshold("P1", "HUM").unwrap();
        api.delete_parameter("HUM").unwrap();
        api.delete_product("P1").unwrap();
        assert!(api.list_products().unwrap().is_empty());
    }
}
