//! 只能追加的快取資料列容器

use gcbase_core::CachedRow;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// 單一資料表的快取資料列
///
/// 與原始資料列逐筆對齊（`cache[i]` 由 `rows[i]` 轉換而來），
/// 因此只提供追加，不提供刪除、插入或重新排序。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowCache {
    rows: Vec<CachedRow>,
}

impl RowCache {
    /// 創建空的快取
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// 共用的空快取
    pub fn empty() -> &'static RowCache {
        static EMPTY: RowCache = RowCache::new();
        &EMPTY
    }

    /// 以完整重建的結果創建快取
    pub fn from_rows(rows: Vec<CachedRow>) -> Self {
        Self { rows }
    }

    /// 追加一筆資料列
    pub fn append(&mut self, row: CachedRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CachedRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CachedRow> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[CachedRow] {
        &self.rows
    }
}

impl Index<usize> for RowCache {
    type Output = CachedRow;

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a RowCache {
    type Item = &'a CachedRow;
    type IntoIter = std::slice::Iter<'a, CachedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbase_core::Cell;

    fn cached(title: &str) -> CachedRow {
        let mut row = CachedRow::new();
        row.insert("title".to_string(), Cell::from(title));
        row
    }

    #[test]
    fn test_append_keeps_order() {
        let mut cache = RowCache::new();
        cache.append(cached("a"));
        cache.append(cached("b"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache[0]["title"], Cell::from("a"));
        let titles: Vec<_> = cache.iter().map(|row| row["title"].clone()).collect();
        assert_eq!(titles, vec![Cell::from("a"), Cell::from("b")]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let cache = RowCache::from_rows(vec![cached("a")]);
        assert_eq!(serde_json::to_string(&cache).unwrap(), r#"[{"title":"a"}]"#);
    }
}
