//! 資料列轉換

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use gcbase_core::{
    CachedRow, Caption, Cell, DateCaption, GcError, LinkCaption, RawRow, Value,
};
use std::collections::BTreeMap;

use crate::number::NumberCoercer;

/// 連結解析回呼：由呼叫端綁定到已重建的目標資料表快取
pub type LinkLookup<'a> = dyn Fn(&LinkCaption, &Value) -> gcbase_core::Result<Cell> + 'a;

/// 資料列轉換器
pub struct RowCoercer;

impl RowCoercer {
    /// 逐列轉換，保持原始順序
    pub fn coerce_rows(
        rows: &[RawRow],
        captions: &BTreeMap<String, Caption>,
        resolve: &LinkLookup<'_>,
    ) -> gcbase_core::Result<Vec<CachedRow>> {
        rows.iter()
            .map(|row| Self::coerce(row, captions, resolve))
            .collect()
    }

    /// 依欄位定義轉換單一資料列
    pub fn coerce(
        row: &RawRow,
        captions: &BTreeMap<String, Caption>,
        resolve: &LinkLookup<'_>,
    ) -> gcbase_core::Result<CachedRow> {
        let mut fixed = CachedRow::new();

        for (column, value) in row {
            let caption = captions
                .get(column)
                .ok_or_else(|| GcError::Row(format!("未定義的欄位: {}", column)))?;

            let cell = match caption {
                Caption::Link(link) => Cell::Link {
                    source: value.clone(),
                    value: Box::new(resolve(link, value)?),
                },
                Caption::Date(date) => Self::coerce_date(column, value, date)?,
                Caption::Number(number) => NumberCoercer::coerce(value, number)
                    .map(Cell::Scalar)
                    .ok_or_else(|| {
                        GcError::Row(format!("{}: 無效的數值: {}", column, value))
                    })?,
                Caption::Text(_)
                | Caption::Auto(_)
                | Caption::Rowdate(_)
                | Caption::Flag(_) => Cell::Scalar(value.clone()),
            };

            fixed.insert(column.clone(), cell);
        }

        Ok(fixed)
    }

    fn coerce_date(column: &str, value: &Value, caption: &DateCaption) -> gcbase_core::Result<Cell> {
        let parsed = Self::parse_date(value)
            .ok_or_else(|| GcError::Row(format!("{}: 無效的日期: {}", column, value)))?;

        match (&caption.format, &caption.language) {
            (Some(format), Some(language)) => {
                let text = format.render(&parsed, language).ok_or_else(|| {
                    GcError::Row(format!("{}: 無法辨識的語言: {}", column, language))
                })?;
                Ok(Cell::Date {
                    source: parsed,
                    value: text,
                })
            }
            (None, None) => Ok(Cell::Timestamp(parsed)),
            _ => Err(GcError::Row(format!(
                "{}: 日期的 format 與 language 必須同時設定",
                column
            ))),
        }
    }

    /// 解析日期
    ///
    /// 接受日期值、毫秒時間戳，以及 RFC 3339 或 `YYYY-MM-DD[ HH:MM[:SS]]` 字串（視為 UTC）。
    pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Date(date) => Some(*date),
            Value::Number(n) => {
                let millis = n.as_f64().filter(|n| n.is_finite())?;
                Utc.timestamp_millis_opt(millis.trunc() as i64).single()
            }
            Value::Text(text) => {
                let text = text.trim();
                if let Ok(date) = DateTime::parse_from_rfc3339(text) {
                    return Some(date.with_timezone(&Utc));
                }
                for pattern in [
                    "%Y-%m-%dT%H:%M:%S%.f",
                    "%Y-%m-%d %H:%M:%S%.f",
                    "%Y-%m-%dT%H:%M",
                    "%Y-%m-%d %H:%M",
                ] {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                        return Some(Utc.from_utc_datetime(&naive));
                    }
                }
                for pattern in ["%Y-%m-%d", "%Y/%m/%d"] {
                    if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
                        return date
                            .and_hms_opt(0, 0, 0)
                            .map(|naive| Utc.from_utc_datetime(&naive));
                    }
                }
                None
            }
            _ => None,
        }
    }
}
