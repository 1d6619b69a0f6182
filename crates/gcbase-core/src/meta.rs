//! 資料庫描述資料

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::{GcError, Result};

/// 資料庫描述（名稱、版本、說明）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMeta {
    /// 資料庫名稱，同時作為儲存區鍵值的一部分
    pub name: String,

    /// 版本號
    pub version: f64,

    /// 說明
    #[serde(default)]
    pub description: String,

    /// 其他自訂欄位
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl DatabaseMeta {
    /// 創建新的資料庫描述
    pub fn new(name: &str, version: f64) -> Self {
        Self {
            name: name.to_string(),
            version,
            description: String::new(),
            extra: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置說明
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// 建構器模式：添加自訂欄位
    pub fn with_extra(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// 檢查名稱與版本
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GcError::Construction("缺少資料庫名稱".to_string()));
        }
        if !self.version.is_finite() || self.version == 0.0 {
            return Err(GcError::Construction(format!(
                "資料庫 {} 的版本號無效: {}",
                self.name, self.version
            )));
        }
        Ok(())
    }
}

impl fmt::Display for DatabaseMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}: {}", self.name, self.version, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_string() {
        let meta = DatabaseMeta::new("library", 2.0).with_description("books and authors");
        assert_eq!(meta.to_string(), "library v2: books and authors");
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_invalid_meta() {
        assert!(DatabaseMeta::new("", 1.0).validate().is_err());
        assert!(DatabaseMeta::new("library", 0.0).validate().is_err());
        assert!(DatabaseMeta::new("library", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_extra_fields_round_trip_json() {
        let meta: DatabaseMeta =
            serde_json::from_str(r#"{"name":"lib","version":1,"description":"d","owner":"ops"}"#)
                .unwrap();
        assert_eq!(meta.extra.get("owner"), Some(&JsonValue::from("ops")));

        // 版本號必須是數字
        assert!(serde_json::from_str::<DatabaseMeta>(r#"{"name":"lib","version":"1"}"#).is_err());
    }
}
