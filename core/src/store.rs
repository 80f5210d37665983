//! Key/value persistence for prediction data.
//!
//! Values are JSON documents. Two backends:
//! - `MemoryStore`: in-process map, used by tests and hosts without storage.
//! - `RedbStore`: a single-file `redb` database with one `kv` table.

use crate::corpus::CorpusError;
use redb::ReadableTable;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key under which the user corpus is stored.
pub const USER_CORPUS_KEY: &str = "user_corpus";
/// Key under which an imported base corpus snapshot is stored.
pub const BASE_CORPUS_KEY: &str = "base_corpus";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend: {0}")]
    Backend(#[from] redb::Error),
    #[error("stored value for {key:?} is not valid json: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding corpus: {0}")]
    Corpus(#[from] CorpusError),
    #[error("creating store directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is read-only")]
    ReadOnly,
}

pub trait Store {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: HashMap<String, Value>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail; reads still work.
    pub fn read_only() -> Self {
        Self {
            inner: HashMap::new(),
            read_only: true,
        }
    }

    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.inner.insert(key.to_string(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.inner.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        self.inner.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        self.inner.remove(key);
        Ok(())
    }
}

/// Redb-backed store. Each `set` is its own write transaction.
pub struct RedbStore {
    db: redb::Database,
    path: PathBuf,
}

impl RedbStore {
    const TABLE_DEF: redb::TableDefinition<'static, &'static str, &'static str> =
        redb::TableDefinition::new("kv");

    /// Create or open a database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path).map_err(redb::Error::from)?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored keys in order.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_keys()?)
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(Self::TABLE_DEF) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    fn read_keys(&self) -> Result<Vec<String>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(Self::TABLE_DEF) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for item in table.iter()? {
            let (k, _) = item?;
            out.push(k.value().to_string());
        }
        Ok(out)
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(Self::TABLE_DEF)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(Self::TABLE_DEF)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl Store for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let Some(raw) = self.read_raw(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        Ok(self.write_raw(key, &raw)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        Ok(self.remove_raw(key)?)
    }
}
