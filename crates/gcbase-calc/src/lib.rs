//! # GCBase Calculation Engine
//!
//! 快取重建引擎：資料列轉換、連結解析與重建順序

pub mod coercer;
pub mod link;
pub mod number;
pub mod ordering;

// Re-export 主要類型
pub use coercer::{LinkLookup, RowCoercer};
pub use link::LinkResolver;
pub use number::NumberCoercer;
pub use ordering::RebuildScheduler;

/// 全部重建的結果
#[derive(Debug, Clone, Default)]
pub struct RebuildSummary {
    /// 實際重建順序
    pub order: Vec<String>,

    /// 每個資料表重建後的資料列數
    pub rows: Vec<(String, usize)>,

    /// 重建耗時（毫秒）
    pub elapsed_ms: Option<u128>,
}

impl RebuildSummary {
    /// 創建空的重建結果
    pub fn empty() -> Self {
        Self::default()
    }

    /// 記錄一個已重建的資料表
    pub fn record(&mut self, table: &str, rows: usize) {
        self.order.push(table.to_string());
        self.rows.push((table.to_string(), rows));
    }

    /// 所有資料表的資料列總數
    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(|(_, count)| count).sum()
    }
}
