// ==========================================
// 粮食接收系统 - 集合存储
// ==========================================
// 存储契约: load(key) → 集合 | 默认值;save(key, 集合)
// 红线: 无局部更新接口,调用方总是 读全集 → 变换 → 写全集
// 红线: save_batch 在同一事务内写入多个集合 (入仓时作业与筒仓同时提交)
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 集合键
pub mod collection_keys {
    pub const PRODUCTS: &str = "products";
    pub const QUALITY_PARAMETERS: &str = "quality_parameters";
    pub const QUALITY_THRESHOLDS: &str = "quality_thresholds";
    pub const SILOS: &str = "silos";
    pub const OPERATIONS: &str = "operations";
}

// ==========================================
// Trait: CollectionStore
// ==========================================
// 以 JSON 文本为单位存取,类型化由 load_collection/save_collection 完成
pub trait CollectionStore: Send + Sync {
    /// 读取集合原文,不存在时返回 None
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 覆盖写入集合原文
    fn save_raw(&self, key: &str, value_json: &str) -> RepositoryResult<()>;

    /// 原子地覆盖写入多个集合
    fn save_batch_raw(&self, entries: &[(&str, String)]) -> RepositoryResult<()>;
}

/// 读取类型化集合,不存在时返回默认值
pub fn load_collection<T>(store: &dyn CollectionStore, key: &str) -> RepositoryResult<T>
where
    T: DeserializeOwned + Default,
{
    match store.load_raw(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| RepositoryError::SerializationError {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(T::default()),
    }
}

/// 写入类型化集合
pub fn save_collection<T>(store: &dyn CollectionStore, key: &str, value: &T) -> RepositoryResult<()>
where
    T: Serialize + ?Sized,
{
    store.save_raw(key, &to_json(key, value)?)
}

/// 序列化集合 (附带集合键便于定位)
pub fn to_json<T>(key: &str, value: &T) -> RepositoryResult<String>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value).map_err(|e| RepositoryError::SerializationError {
        key: key.to_string(),
        message: e.to_string(),
    })
}

// ==========================================
// SqliteCollectionStore - SQLite 实现
// ==========================================
// 对齐: collection_kv 表 (key, value_json, updated_at)
pub struct SqliteCollectionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCollectionStore {
    /// 打开数据库文件并创建存储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建存储实例 (schema 由调用方保证)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value_json FROM collection_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&self, key: &str, value_json: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO collection_kv (key, value_json, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value_json = ?2, updated_at = datetime('now')
            "#,
            params![key, value_json],
        )?;
        Ok(())
    }

    fn save_batch_raw(&self, entries: &[(&str, String)]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for (key, value_json) in entries {
            tx.execute(
                r#"
                INSERT INTO collection_kv (key, value_json, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET value_json = ?2, updated_at = datetime('now')
                "#,
                params![key, value_json],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}

// ==========================================
// InMemoryCollectionStore - 内存实现 (测试/演示)
// ==========================================
#[derive(Default)]
pub struct InMemoryCollectionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_entries(&self) -> RepositoryResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl CollectionStore for InMemoryCollectionStore {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.get_entries()?.get(key).cloned())
    }

    fn save_raw(&self, key: &str, value_json: &str) -> RepositoryResult<()> {
        self.get_entries()?
            .insert(key.to_string(), value_json.to_string());
        Ok(())
    }

    fn save_batch_raw(&self, entries: &[(&str, String)]) -> RepositoryResult<()> {
        // 持锁期间整体写入
        let mut guard = self.get_entries()?;
        for (key, value_json) in entries {
            guard.insert(key.to_string(), value_json.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::silo::Silo;

    fn setup_sqlite() -> SqliteCollectionStore {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        SqliteCollectionStore::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn silos() -> Vec<Silo> {
        vec![
            Silo::new("S01", "Norte", "P1", 100, 1000),
            Silo::new("S02", "Sur", "P1", 0, 500),
        ]
    }

    #[test]
    fn test_missing_collection_loads_default() {
        let store = setup_sqlite();
        let loaded: Vec<Silo> = load_collection(&store, collection_keys::SILOS).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load_replaces_whole_collection() {
        let store = setup_sqlite();
        save_collection(&store, collection_keys::SILOS, &silos()).unwrap();
        save_collection(&store, collection_keys::SILOS, &silos()[..1]).unwrap();

        let loaded: Vec<Silo> = load_collection(&store, collection_keys::SILOS).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "S01");
    }

    #[test]
    fn test_batch_writes_every_entry() {
        let store = setup_sqlite();
        store
            .save_batch_raw(&[
                (collection_keys::SILOS, to_json(collection_keys::SILOS, &silos()).unwrap()),
                (collection_keys::OPERATIONS, "[]".to_string()),
            ])
            .unwrap();

        assert!(store.load_raw(collection_keys::OPERATIONS).unwrap().is_some());
        let loaded: Vec<Silo> = load_collection(&store, collection_keys::SILOS).unwrap();
        assert_eq!(loaded, silos());
    }

    #[test]
    fn test_corrupt_collection_reports_key() {
        let store = InMemoryCollectionStore::new();
        store.save_raw(collection_keys::SILOS, "{not json").unwrap();

        let err = load_collection::<Vec<Silo>>(&store, collection_keys::SILOS).unwrap_err();
        assert!(matches!(err, RepositoryError::SerializationError { ref key, .. } if key == "silos"));
    }
}
