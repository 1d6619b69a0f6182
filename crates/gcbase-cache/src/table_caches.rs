//! 資料庫層級的快取集合

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::RowCache;

/// 所有資料表的快取（資料表名稱 → 快取資料列）
///
/// 沒有項目的資料表視為過期，下次存取時重建。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableCaches {
    tables: BTreeMap<String, RowCache>,
}

impl TableCaches {
    /// 創建空的快取集合
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str) -> Option<&RowCache> {
        self.tables.get(table)
    }

    /// 是否已有該資料表的快取
    pub fn is_cached(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// 以重建結果取代整個資料表的快取
    pub fn replace(&mut self, table: &str, cache: RowCache) {
        self.tables.insert(table.to_string(), cache);
    }

    /// 追加單筆資料列，資料表必須已有快取
    pub fn append(&mut self, table: &str, row: gcbase_core::CachedRow) -> bool {
        match self.tables.get_mut(table) {
            Some(cache) => {
                cache.append(row);
                true
            }
            None => false,
        }
    }

    /// 標記為過期
    pub fn invalidate(&mut self, table: &str) {
        self.tables.remove(table);
    }

    /// 只保留符合條件的快取
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &RowCache) -> bool) {
        self.tables.retain(|name, cache| keep(name, cache));
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// 已快取的資料表名稱
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
