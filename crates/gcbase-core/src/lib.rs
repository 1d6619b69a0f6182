//! # GCBase Core
//!
//! 核心資料模型與類型定義

pub mod caption;
pub mod config;
pub mod date_format;
pub mod meta;
pub mod numeric;
pub mod table;
pub mod validator;
pub mod value;

// Re-export 主要類型
pub use caption::{
    AutoCaption, Caption, DateCaption, FlagCaption, LinkCaption, LinkData, NumberCaption,
    NumberFormat, RowdateCaption, TextCaption,
};
pub use config::StoreConfig;
pub use date_format::{DateFormat, FieldStyle};
pub use meta::DatabaseMeta;
pub use table::TableDef;
pub use validator::{CaptionSpec, CaptionValidator};
pub use value::{CachedRow, Cell, RawRow, Value};

/// GCBase 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum GcError {
    #[error("資料庫建構錯誤: {0}")]
    Construction(String),

    #[error("欄位定義錯誤: {0}")]
    Schema(String),

    #[error("資料表 {table} 沒有欄位: {column}")]
    UnknownColumn { table: String, column: String },

    #[error("資料表 {table} 欄位數量不符: 應為 {expected}，實際 {actual}")]
    RowShape {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("資料列轉換錯誤: {0}")]
    Row(String),

    #[error("無法排序的連結: 資料表 {table} 連結到 {target}")]
    CyclicOrUnresolvedLink { table: String, target: String },

    #[error("找不到資料表: {0}")]
    MissingTable(String),

    #[error("資料表已存在: {0}")]
    DuplicateTable(String),

    #[error("儲存區錯誤: {0}")]
    Persistence(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("檔案存取錯誤: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GcError>;
