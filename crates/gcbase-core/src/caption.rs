//! 欄位定義（caption）模型
//!
//! 已通過 [`CaptionValidator`](crate::CaptionValidator) 正規化的欄位定義。

use serde::{Deserialize, Serialize};

use crate::date_format::DateFormat;

/// 欄位定義，依 `type` 區分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Caption {
    /// 文字
    Text(TextCaption),
    /// 自動遞增整數
    Auto(AutoCaption),
    /// 連結到其他資料表
    Link(LinkCaption),
    /// 日期
    Date(DateCaption),
    /// 資料列日期
    Rowdate(RowdateCaption),
    /// 布林旗標
    Flag(FlagCaption),
    /// 數值
    Number(NumberCaption),
}

impl Caption {
    /// 欄位值是否唯一
    pub fn is_unique(&self) -> bool {
        match self {
            Caption::Text(c) => c.unique,
            Caption::Auto(_) => true,
            Caption::Link(c) => c.unique,
            Caption::Date(_) => false,
            Caption::Rowdate(c) => c.unique,
            Caption::Flag(_) => false,
            Caption::Number(c) => c.unique,
        }
    }

    pub fn as_link(&self) -> Option<&LinkCaption> {
        match self {
            Caption::Link(link) => Some(link),
            _ => None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCaption {
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

/// 自動遞增欄位，`next` 為下一筆資料列的值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCaption {
    #[serde(default)]
    pub next: u64,
}

impl AutoCaption {
    /// 取出目前計數並遞增
    pub fn advance(&mut self) -> u64 {
        let current = self.next;
        self.next += 1;
        current
    }
}

/// 連結欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCaption {
    /// 目標資料表
    pub table: String,
    /// 目標資料表中用於比對鍵值的欄位
    pub to: String,
    /// 要取回的資料
    pub data: LinkData,
    /// 鍵值是否為集合
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiply: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

/// 連結投影
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LinkDataRepr", into = "LinkDataRepr")]
pub enum LinkData {
    /// `":all"`：取回整列
    All,
    /// 單一欄位的值
    Column(String),
    /// 多個欄位組成的子物件
    Columns(Vec<String>),
}

impl LinkData {
    pub const ALL: &'static str = ":all";

    pub fn is_multi(&self) -> bool {
        matches!(self, LinkData::Columns(_))
    }

    /// 投影引用到的欄位
    pub fn columns(&self) -> Vec<&str> {
        match self {
            LinkData::All => Vec::new(),
            LinkData::Column(column) => vec![column.as_str()],
            LinkData::Columns(columns) => columns.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for LinkData {
    fn from(column: &str) -> Self {
        LinkDataRepr::One(column.to_string()).into()
    }
}

impl From<Vec<&str>> for LinkData {
    fn from(columns: Vec<&str>) -> Self {
        LinkData::Columns(columns.into_iter().map(String::from).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LinkDataRepr {
    One(String),
    Many(Vec<String>),
}

impl From<LinkDataRepr> for LinkData {
    fn from(repr: LinkDataRepr) -> Self {
        match repr {
            LinkDataRepr::One(column) if column == LinkData::ALL => LinkData::All,
            LinkDataRepr::One(column) => LinkData::Column(column),
            LinkDataRepr::Many(columns) => LinkData::Columns(columns),
        }
    }
}

impl From<LinkData> for LinkDataRepr {
    fn from(data: LinkData) -> Self {
        match data {
            LinkData::All => LinkDataRepr::One(LinkData::ALL.to_string()),
            LinkData::Column(column) => LinkDataRepr::One(column),
            LinkData::Columns(columns) => LinkDataRepr::Many(columns),
        }
    }
}

/// 日期欄位；`format` 與 `language` 必須同時存在或同時省略
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCaption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DateFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowdateCaption {
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCaption {}

/// 數值格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// 截斷為整數
    #[default]
    Integer,
    /// 浮點數
    Float,
    /// 四捨五入到 `precision` 位小數
    Precision,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberCaption {
    #[serde(default)]
    pub format: NumberFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}
