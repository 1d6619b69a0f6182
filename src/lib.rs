//! # GCBase
//!
//! 記憶體內表格資料庫：欄位定義、型別轉換、跨表連結，
//! 以及依連結關係排序重建的快取。
//!
//! ```
//! use gcbase::{row, CaptionSpec, Database, DatabaseMeta};
//!
//! let mut db = Database::new(DatabaseMeta::new("library", 1.0))?;
//! db.add_table("Authors", [("name", CaptionSpec::text()), ("id", CaptionSpec::auto())])?;
//! db.add_table(
//!     "Books",
//!     [
//!         ("title", CaptionSpec::text()),
//!         ("authorId", CaptionSpec::link("Authors", "id", "name")),
//!     ],
//! )?;
//!
//! db.insert_row("Authors", row! { "name" => "Ada" })?;
//! db.insert_row("Books", row! { "title" => "X", "authorId" => 0 })?;
//! db.rebuild_all()?;
//!
//! let books = db.table("Books", false)?;
//! assert_eq!(books.stringify()?, r#"[{"authorId":{"source":0,"value":"Ada"},"title":"X"}]"#);
//! # Ok::<(), gcbase::GcError>(())
//! ```

pub mod database;
pub mod storage;
pub mod table;

// Re-export 主要類型
pub use database::{Database, DatabaseSource};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use table::TableView;

pub use gcbase_cache::RowCache;
pub use gcbase_calc::RebuildSummary;
pub use gcbase_core::{
    row, CachedRow, Caption, CaptionSpec, Cell, DatabaseMeta, DateFormat, FieldStyle, GcError,
    LinkData, RawRow, Result, StoreConfig, Value,
};
