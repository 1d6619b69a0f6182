//! 資料庫與快取排程

use gcbase_cache::{RowCache, TableCaches};
use gcbase_calc::{LinkResolver, RebuildScheduler, RebuildSummary, RowCoercer};
use gcbase_core::{
    CachedRow, Caption, CaptionSpec, CaptionValidator, Cell, DatabaseMeta, GcError, LinkCaption,
    RawRow, Result, StoreConfig, TableDef, Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::storage::KeyValueStore;
use crate::table::TableView;

/// 建構資料庫的來源
#[derive(Debug)]
pub enum DatabaseSource<'a> {
    /// 序列化的快照
    Snapshot(&'a str),
    /// 新資料庫的描述
    Meta(DatabaseMeta),
    /// 複製既有資料庫（不含快取）
    Existing(&'a Database),
}

/// 序列化時借用的快照
#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(rename = "__data")]
    meta: &'a DatabaseMeta,
    #[serde(rename = "__tables")]
    tables: &'a BTreeMap<String, TableDef>,
    #[serde(rename = "cachedTables", skip_serializing_if = "Option::is_none")]
    caches: Option<&'a TableCaches>,
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(rename = "__data")]
    meta: DatabaseMeta,
    #[serde(rename = "__tables", default)]
    tables: BTreeMap<String, TableDef>,
    #[serde(rename = "cachedTables", default)]
    caches: TableCaches,
}

/// 記憶體內資料庫
///
/// 擁有所有資料表、各表快取與記憶化的重建順序。
#[derive(Debug, Clone)]
pub struct Database {
    meta: DatabaseMeta,
    tables: BTreeMap<String, TableDef>,
    caches: TableCaches,
    rebuild_order: Option<Vec<String>>,
}

impl Database {
    /// 由描述創建空資料庫
    pub fn new(meta: DatabaseMeta) -> Result<Self> {
        meta.validate()?;
        Ok(Self {
            meta,
            tables: BTreeMap::new(),
            caches: TableCaches::new(),
            rebuild_order: None,
        })
    }

    /// 依來源建構資料庫
    pub fn open(source: DatabaseSource<'_>) -> Result<Self> {
        match source {
            DatabaseSource::Snapshot(text) => Self::from_snapshot(text),
            DatabaseSource::Meta(meta) => Self::new(meta),
            DatabaseSource::Existing(other) => Ok(Self::from_database(other)),
        }
    }

    /// 解析序列化的快照
    ///
    /// 與原始資料列筆數不符的快取會被捨棄，待下次存取時重建。
    pub fn from_snapshot(text: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(text)
            .map_err(|e| GcError::Construction(format!("無法解析快照: {}", e)))?;
        snapshot.meta.validate()?;

        let tables = snapshot.tables;
        let mut caches = snapshot.caches;
        caches.retain(|name, cache| {
            let aligned = tables
                .get(name)
                .map(|table| table.rows.len() == cache.len())
                .unwrap_or(false);
            if !aligned {
                tracing::debug!("捨棄未對齊的快取: {}", name);
            }
            aligned
        });
        tracing::debug!("快照中的快取: {:?}", caches.table_names());

        Ok(Self {
            meta: snapshot.meta,
            tables,
            caches,
            rebuild_order: None,
        })
    }

    /// 複製欄位定義與原始資料列，快取留待重建
    pub fn from_database(other: &Database) -> Self {
        Self {
            meta: other.meta.clone(),
            tables: other.tables.clone(),
            caches: TableCaches::new(),
            rebuild_order: None,
        }
    }

    /// 從儲存區載入
    pub fn load(store: &dyn KeyValueStore, name: &str, config: &StoreConfig) -> Result<Self> {
        let key = config.key_for(name);
        let text = store
            .get(&key)?
            .ok_or_else(|| GcError::Persistence(format!("儲存區中沒有資料庫: {}", name)))?;

        let mut db = Self::from_snapshot(&text)?;
        tracing::info!(
            "載入資料庫 {} ({} 個資料表，{} 個已快取)",
            name,
            db.tables.len(),
            db.caches.len()
        );

        if config.rebuild_on_load && db.caches.is_empty() {
            db.rebuild_all()?;
        }
        Ok(db)
    }

    /// 以儲存區中的同名資料重新載入
    pub fn reload(&mut self, store: &dyn KeyValueStore, config: &StoreConfig) -> Result<()> {
        let name = self.meta.name.clone();
        *self = Self::load(store, &name, config)?;
        Ok(())
    }

    /// 寫入儲存區
    pub fn save(&self, store: &mut dyn KeyValueStore, config: &StoreConfig) -> Result<()> {
        let key = config.key_for(&self.meta.name);
        store.set(&key, self.stringify(config.save_with_cache)?)?;
        tracing::info!("儲存資料庫 {} 至 {}", self.meta.name, key);
        Ok(())
    }

    /// 序列化整個資料庫，可選擇是否包含快取
    pub fn stringify(&self, with_cache: bool) -> Result<String> {
        let snapshot = SnapshotRef {
            meta: &self.meta,
            tables: &self.tables,
            caches: with_cache.then_some(&self.caches),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// 只序列化快取
    pub fn stringify_cache(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.caches)?)
    }

    pub fn meta(&self) -> &DatabaseMeta {
        &self.meta
    }

    /// `<名稱> v<版本>: <說明>`
    pub fn about(&self) -> String {
        self.meta.to_string()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .map(|t| t.has_column(column))
            .unwrap_or(false)
    }

    /// 資料表的欄位定義
    pub fn captions(&self, table: &str) -> Option<&BTreeMap<String, Caption>> {
        self.tables.get(table).map(|t| &t.captions)
    }

    /// 資料表的原始資料列
    pub fn raw_rows(&self, table: &str) -> Option<&[RawRow]> {
        self.tables.get(table).map(|t| t.rows.as_slice())
    }

    /// 資料表目前的快取
    pub fn cached_rows(&self, table: &str) -> Option<&RowCache> {
        self.caches.get(table)
    }

    /// 資料表的快取是否需要重建
    pub fn is_stale(&self, table: &str) -> bool {
        self.has_table(table) && !self.caches.is_cached(table)
    }

    /// 新增資料表
    ///
    /// 連結欄位只能指向已存在的資料表，因此不會形成自我連結。
    pub fn add_table<K, I>(&mut self, name: &str, captions: I) -> Result<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CaptionSpec)>,
    {
        if name.trim().is_empty() {
            return Err(GcError::Schema("資料表名稱不可為空".to_string()));
        }
        if self.has_table(name) {
            return Err(GcError::DuplicateTable(name.to_string()));
        }

        let specs: BTreeMap<String, CaptionSpec> = captions
            .into_iter()
            .map(|(column, spec)| (column.into(), spec))
            .collect();
        let captions = CaptionValidator::validate_all(&specs, &self.tables)?;

        self.tables.insert(name.to_string(), TableDef::new(captions));
        self.caches.invalidate(name);
        self.rebuild_order = None;

        tracing::info!("新增資料表 {} ({} 個欄位)", name, specs.len());
        Ok(())
    }

    /// 取得資料表檢視；`recache` 為 true 時先重建該表快取
    pub fn table(&mut self, name: &str, recache: bool) -> Result<TableView<'_>> {
        if !self.has_table(name) {
            return Err(GcError::MissingTable(name.to_string()));
        }
        if recache || !self.caches.is_cached(name) {
            self.ensure_dependencies(name)?;
            self.rebuild_table(name, recache)?;
        }
        Ok(TableView::new(self, name))
    }

    /// 記憶化的重建順序
    pub fn rebuild_order(&mut self) -> Result<&[String]> {
        if self.rebuild_order.is_none() {
            self.rebuild_order = Some(RebuildScheduler::compute(&self.tables)?);
        }
        Ok(self.rebuild_order.as_deref().unwrap_or_default())
    }

    /// 依重建順序重建所有資料表的快取
    pub fn rebuild_all(&mut self) -> Result<RebuildSummary> {
        let start_time = std::time::Instant::now();
        let order = self.rebuild_order()?.to_vec();
        tracing::info!("開始重建快取：{} 個資料表", order.len());

        let mut summary = RebuildSummary::empty();
        for name in &order {
            self.rebuild_table(name, true)?;
            let rows = self.caches.get(name).map(RowCache::len).unwrap_or(0);
            summary.record(name, rows);
        }
        summary.elapsed_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "快取重建完成，{} 筆資料列，耗時 {:?}",
            summary.total_rows(),
            start_time.elapsed()
        );
        Ok(summary)
    }

    /// 新增單筆資料列
    ///
    /// 自動欄位由計數器填入；檢查與轉換都成功後才一併寫入計數器、原始資料列與快取。
    pub fn insert_row(&mut self, name: &str, mut row: RawRow) -> Result<()> {
        if !self.has_table(name) {
            return Err(GcError::MissingTable(name.to_string()));
        }
        self.ensure_dependencies(name)?;
        self.rebuild_table(name, false)?;

        let table = self
            .tables
            .get(name)
            .ok_or_else(|| GcError::MissingTable(name.to_string()))?;

        if let Some(column) = row.keys().find(|column| !table.has_column(column)) {
            return Err(GcError::UnknownColumn {
                table: name.to_string(),
                column: column.clone(),
            });
        }

        for (column, caption) in &table.captions {
            if let Caption::Auto(auto) = caption {
                row.insert(column.clone(), Value::from(auto.next));
            }
        }

        if row.len() != table.captions.len() {
            return Err(GcError::RowShape {
                table: name.to_string(),
                expected: table.captions.len(),
                actual: row.len(),
            });
        }

        let cached = RowCoercer::coerce(&row, &table.captions, &|link, key| {
            self.resolve_link(link, key)
        })?;

        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| GcError::MissingTable(name.to_string()))?;
        for caption in table.captions.values_mut() {
            if let Caption::Auto(auto) = caption {
                auto.advance();
            }
        }
        table.rows.push(row);
        self.caches.append(name, cached);

        tracing::debug!("資料表 {} 新增第 {} 筆資料列", name, table.rows.len());
        Ok(())
    }

    /// 依序新增多筆資料列，回傳新增筆數
    ///
    /// 遇到錯誤即停止，之前的資料列已寫入。
    pub fn insert_rows(&mut self, name: &str, rows: Vec<RawRow>) -> Result<usize> {
        let mut inserted = 0;
        for row in rows {
            self.insert_row(name, row)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// 重建單一資料表；`force` 為 false 且已有快取時沿用
    pub(crate) fn rebuild_table(&mut self, name: &str, force: bool) -> Result<()> {
        if !force && self.caches.is_cached(name) {
            return Ok(());
        }

        let table = self
            .tables
            .get(name)
            .ok_or_else(|| GcError::MissingTable(name.to_string()))?;
        let rows: Vec<CachedRow> = RowCoercer::coerce_rows(&table.rows, &table.captions, &|link, key| {
            self.resolve_link(link, key)
        })?;

        tracing::debug!("重建資料表 {}: {} 筆", name, rows.len());
        self.caches.replace(name, RowCache::from_rows(rows));
        Ok(())
    }

    /// 確保遞移連結目標的快取都已建立，不觸及無關的資料表
    pub(crate) fn ensure_dependencies(&mut self, name: &str) -> Result<()> {
        let targets = RebuildScheduler::dependencies_of(&self.tables, name)?;
        for table in &targets {
            self.rebuild_table(table, false)?;
        }
        Ok(())
    }

    /// 以目標資料表已重建的快取解析連結
    fn resolve_link(&self, link: &LinkCaption, key: &Value) -> Result<Cell> {
        let target = self
            .tables
            .get(&link.table)
            .ok_or_else(|| GcError::MissingTable(link.table.clone()))?;
        let target_caption = target.captions.get(&link.to).ok_or_else(|| {
            GcError::Row(format!("連結目標欄位不存在 ({}:{})", link.table, link.to))
        })?;
        let rows = self
            .caches
            .get(&link.table)
            .ok_or_else(|| GcError::Row(format!("資料表 {} 尚未建立快取", link.table)))?;

        Ok(LinkResolver::resolve(link, key, target_caption, rows.as_slice()))
    }
}
