//! 資料值模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// 原始資料列（欄位名 → 輸入值）
pub type RawRow = BTreeMap<String, Value>;

/// 快取資料列（欄位名 → 轉換後的值）
pub type CachedRow = BTreeMap<String, Cell>;

/// 輸入值
///
/// JSON 反序列化時字串一律成為 `Text`，日期在轉換階段才重新解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Date(DateTime<Utc>),
    /// 多值連結的鍵集合
    List(Vec<Value>),
}

impl Value {
    /// 由浮點數建立數值，NaN 與無窮大回傳 `None`
    ///
    /// 整數值會以整數形式保存，`3.0` 與 `3` 比較時相等。
    pub fn from_f64(number: f64) -> Option<Self> {
        number_from_f64(number).map(Value::Number)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// 將浮點數正規化為 JSON 數值
pub fn number_from_f64(number: f64) -> Option<Number> {
    if !number.is_finite() {
        return None;
    }
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        return Some(Number::from(number as i64));
    }
    Number::from_f64(number)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::from_f64(value).unwrap_or(Value::Null)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// 快取中的單一欄位值
///
/// 反序列化時依宣告順序嘗試，無法區分的日期字串會回到 `Scalar`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// 唯一目標欄位查無資料
    Missing,
    /// 已格式化的日期
    Date {
        source: DateTime<Utc>,
        value: String,
    },
    /// 已解析的連結
    Link { source: Value, value: Box<Cell> },
    /// 連結投影出的子物件或整列
    Row(CachedRow),
    /// 連結的多筆結果
    List(Vec<Cell>),
    Scalar(Value),
    /// 未設定格式的日期
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// 可參與連結鍵比對的純量值
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Cell::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Cell]> {
        match self {
            Cell::List(items) => Some(items),
            _ => None,
        }
    }

    /// 連結欄位解析後的值
    pub fn link_value(&self) -> Option<&Cell> {
        match self {
            Cell::Link { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Scalar(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Scalar(Value::from(value))
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Scalar(Value::from(value))
    }
}

/// 建立原始資料列
///
/// ```
/// use gcbase_core::row;
/// let book = row! { "title" => "Dune", "authorId" => 0 };
/// assert_eq!(book.len(), 2);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::RawRow::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::RawRow::new();
        $(row.insert(::std::string::String::from($column), $crate::Value::from($value));)+
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_float_is_integer() {
        assert_eq!(Value::from(3.0), Value::from(3));
        assert_eq!(serde_json::to_string(&Value::from(3.0)).unwrap(), "3");
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn test_raw_value_from_json() {
        let row: RawRow =
            serde_json::from_str(r#"{"name":"Ada","age":36,"tags":["x","y"],"alive":false}"#)
                .unwrap();

        assert_eq!(row["name"], Value::from("Ada"));
        assert_eq!(row["age"], Value::from(36));
        assert_eq!(row["tags"], Value::from(vec!["x", "y"]));
        assert_eq!(row["alive"], Value::Bool(false));
    }

    #[test]
    fn test_link_cell_json_shape() {
        let cell = Cell::Link {
            source: Value::from(0),
            value: Box::new(Cell::from("Ada")),
        };
        assert_eq!(
            serde_json::to_string(&cell).unwrap(),
            r#"{"source":0,"value":"Ada"}"#
        );

        let back: Cell = serde_json::from_str(r#"{"source":0,"value":"Ada"}"#).unwrap();
        assert_eq!(back, cell);
        assert_eq!(serde_json::to_string(&Cell::Missing).unwrap(), "null");
    }

    #[test]
    fn test_row_macro() {
        let row = row! { "title" => "X", "authorId" => 0 };
        assert_eq!(row["title"], Value::from("X"));
        assert_eq!(row["authorId"], Value::from(0));
    }
}
