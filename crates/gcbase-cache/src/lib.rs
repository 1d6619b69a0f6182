//! # GCBase Cache
//!
//! 快取資料列容器

pub mod row_cache;
pub mod table_caches;

// Re-export 主要類型
pub use row_cache::RowCache;
pub use table_caches::TableCaches;
