//! 資料表定義

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::caption::{Caption, LinkCaption};
use crate::value::RawRow;

/// 資料表：欄位定義與原始資料列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    #[serde(rename = "__captions")]
    pub captions: BTreeMap<String, Caption>,

    /// 依插入順序排列，只會追加
    #[serde(rename = "__rows", default)]
    pub rows: Vec<RawRow>,
}

impl TableDef {
    /// 以已正規化的欄位定義建立空資料表
    pub fn new(captions: BTreeMap<String, Caption>) -> Self {
        Self {
            captions,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.captions.contains_key(column)
    }

    /// 所有連結欄位
    pub fn links(&self) -> impl Iterator<Item = (&String, &LinkCaption)> {
        self.captions
            .iter()
            .filter_map(|(name, caption)| caption.as_link().map(|link| (name, link)))
    }
}
