//! 鍵值儲存區

use gcbase_core::{GcError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 以字串為值的鍵值儲存區
pub trait KeyValueStore {
    /// 讀取；不存在時回傳 `None`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 寫入或覆蓋
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// 記憶體內儲存區
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// 目錄儲存區，每個鍵一個 JSON 檔
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// 開啟目錄，不存在時建立
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// 鍵對應的檔案路徑
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(GcError::Persistence("鍵值不可為空".to_string()));
        }
        let file_name: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Ok(self.root.join(format!("{}.json", file_name)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        fs::write(self.path_for(key)?, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("GCBase:lib").unwrap(), None);

        store.set("GCBase:lib", "{}".to_string()).unwrap();
        assert_eq!(store.get("GCBase:lib").unwrap(), Some("{}".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("GCBase:lib").unwrap(), None);
        store.set("GCBase:lib", "{\"a\":1}".to_string()).unwrap();
        assert_eq!(store.get("GCBase:lib").unwrap(), Some("{\"a\":1}".to_string()));
        assert!(dir.path().join("data").join("GCBase_lib.json").exists());

        assert!(store.set("", String::new()).is_err());
    }
}
