//! 數值欄位轉換

use gcbase_core::numeric::{parse_float_prefix, parse_int_prefix};
use gcbase_core::{NumberCaption, NumberFormat, Value};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// 數值轉換器
pub struct NumberCoercer;

impl NumberCoercer {
    /// 依欄位格式轉換數值，無法轉換時回傳 `None`
    pub fn coerce(value: &Value, caption: &NumberCaption) -> Option<Value> {
        let number = match caption.format {
            NumberFormat::Integer => Self::integer(value),
            NumberFormat::Float => Self::float(value),
            NumberFormat::Precision => Self::precision(value, caption.precision.unwrap_or(0)),
        }?;
        Value::from_f64(number)
    }

    /// 截斷為整數；文字取整數前綴
    fn integer(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64().map(f64::trunc),
            Value::Text(text) => parse_int_prefix(text).map(|n| n as f64),
            _ => None,
        }
    }

    /// 浮點數；文字取浮點數前綴
    fn float(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::Text(text) => parse_float_prefix(text),
            _ => None,
        }
    }

    /// 四捨五入到指定小數位數
    ///
    /// 以輸入的十進位形式取捨（`1.005` → `1.01`）。文字必須整段都是數字，空白字串視為 0。
    fn precision(value: &Value, digits: u32) -> Option<f64> {
        let decimal = match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Decimal::from(i)
                } else {
                    Decimal::from_f64(n.as_f64()?)?
                }
            }
            Value::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Decimal::ZERO
                } else {
                    Decimal::from_str(trimmed)
                        .or_else(|_| Decimal::from_scientific(trimmed))
                        .ok()?
                }
            }
            _ => return None,
        };

        decimal
            .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
    }
}
