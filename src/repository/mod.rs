// ==========================================
// 粮食接收系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod collection_store;
pub mod error;
pub mod reception_repo;

// 重导出核心仓储
pub use collection_store::{
    collection_keys, load_collection, save_collection, CollectionStore, InMemoryCollectionStore,
    SqliteCollectionStore,
};
pub use error::{RepositoryError, RepositoryResult};
pub use reception_repo::ReceptionRepository;
