//! 儲存區配置

use serde::{Deserialize, Serialize};

/// 儲存區參數配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 鍵值前綴，完整鍵為 `<namespace>:<資料庫名稱>`
    pub namespace: String,

    /// 儲存時是否包含快取
    pub save_with_cache: bool,

    /// 載入的快照沒有快取時是否自動重建
    pub rebuild_on_load: bool,
}

impl StoreConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            namespace: "GCBase".to_string(),
            save_with_cache: true,
            rebuild_on_load: true,
        }
    }

    /// 建構器模式：設置鍵值前綴
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// 建構器模式：設置儲存時是否包含快取
    pub fn with_save_with_cache(mut self, save_with_cache: bool) -> Self {
        self.save_with_cache = save_with_cache;
        self
    }

    /// 建構器模式：設置載入後是否自動重建快取
    pub fn with_rebuild_on_load(mut self, rebuild_on_load: bool) -> Self {
        self.rebuild_on_load = rebuild_on_load;
        self
    }

    /// 資料庫在儲存區中的鍵
    pub fn key_for(&self, database_name: &str) -> String {
        format!("{}:{}", self.namespace, database_name)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
