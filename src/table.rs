//! 資料表檢視

use gcbase_cache::RowCache;
use gcbase_core::{Caption, RawRow, Result};
use std::collections::BTreeMap;

use crate::database::Database;

/// 綁定到資料表目前快取的檢視
///
/// 快取資料列只能讀取；新增資料列須經由 [`add`](TableView::add)
/// 或 [`add_many`](TableView::add_many)，以維持原始資料列與快取的對齊。
pub struct TableView<'a> {
    db: &'a mut Database,
    name: String,
}

impl<'a> TableView<'a> {
    pub(crate) fn new(db: &'a mut Database, name: &str) -> Self {
        Self {
            db,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 欄位定義的複本
    pub fn captions(&self) -> BTreeMap<String, Caption> {
        self.db.captions(&self.name).cloned().unwrap_or_default()
    }

    /// 快取資料列
    pub fn rows(&self) -> &RowCache {
        self.db
            .cached_rows(&self.name)
            .unwrap_or_else(|| RowCache::empty())
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// 新增單筆資料列
    pub fn add(&mut self, row: RawRow) -> Result<&mut Self> {
        self.db.insert_row(&self.name, row)?;
        Ok(self)
    }

    /// 依序新增多筆資料列
    pub fn add_many(&mut self, rows: Vec<RawRow>) -> Result<&mut Self> {
        self.db.insert_rows(&self.name, rows)?;
        Ok(self)
    }

    /// 強制重建此資料表的快取
    pub fn recache(&mut self) -> Result<&mut Self> {
        self.db.ensure_dependencies(&self.name)?;
        self.db.rebuild_table(&self.name, true)?;
        Ok(self)
    }

    /// 序列化快取資料列
    pub fn stringify(&self) -> Result<String> {
        Ok(serde_json::to_string(self.rows())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbase_core::{row, CaptionSpec, Cell, DatabaseMeta, GcError};

    fn tasks() -> Database {
        let mut db = Database::new(DatabaseMeta::new("todo", 1.0)).unwrap();
        db.add_table(
            "Tasks",
            [
                ("id", CaptionSpec::auto()),
                ("title", CaptionSpec::text()),
                ("done", CaptionSpec::flag()),
            ],
        )
        .unwrap();
        db
    }

    #[test]
    fn test_view_add_and_read() {
        let mut db = tasks();
        let mut view = db.table("Tasks", false).unwrap();
        assert!(view.is_empty());

        view.add(row! { "title" => "write", "done" => false })
            .unwrap()
            .add_many(vec![
                row! { "title" => "test", "done" => false },
                row! { "title" => "ship", "done" => true },
            ])
            .unwrap();

        assert_eq!(view.name(), "Tasks");
        assert_eq!(view.len(), 3);
        assert_eq!(view.rows()[2]["id"], Cell::from(2));
        assert_eq!(view.rows()[2]["done"], Cell::from(gcbase_core::Value::Bool(true)));
        assert_eq!(view.captions().len(), 3);
    }

    #[test]
    fn test_add_many_stops_at_first_error() {
        let mut db = tasks();
        let mut view = db.table("Tasks", false).unwrap();
        let result = view.add_many(vec![
            row! { "title" => "ok", "done" => false },
            row! { "title" => "bad" },
            row! { "title" => "never", "done" => true },
        ]);
        assert!(matches!(result, Err(GcError::RowShape { .. })));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_recache_and_stringify() {
        let mut db = tasks();
        let mut view = db.table("Tasks", false).unwrap();
        view.add(row! { "title" => "write", "done" => false }).unwrap();

        let before = view.stringify().unwrap();
        view.recache().unwrap();
        assert_eq!(view.stringify().unwrap(), before);
        assert_eq!(before, r#"[{"done":false,"id":0,"title":"write"}]"#);
    }
}
