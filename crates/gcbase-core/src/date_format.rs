//! 日期在地化格式

use chrono::{DateTime, Locale, Utc};
use serde::{Deserialize, Serialize};

/// 日期各部分的呈現方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStyle {
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    Long,
    Short,
    Narrow,
}

/// 日期格式選項
///
/// 全部省略時視同 `year`、`month`、`day` 皆為 `numeric`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<FieldStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<FieldStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<FieldStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<FieldStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<FieldStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<FieldStyle>,
}

impl DateFormat {
    /// 建構器模式：年月日
    pub fn date(year: FieldStyle, month: FieldStyle, day: FieldStyle) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            ..Self::default()
        }
    }

    /// 建構器模式：設置星期
    pub fn with_weekday(mut self, style: FieldStyle) -> Self {
        self.weekday = Some(style);
        self
    }

    /// 建構器模式：設置時分
    pub fn with_time(mut self, style: FieldStyle) -> Self {
        self.hour = Some(style);
        self.minute = Some(FieldStyle::TwoDigit);
        self
    }

    fn is_empty(&self) -> bool {
        self.weekday.is_none()
            && self.year.is_none()
            && self.month.is_none()
            && self.day.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
    }

    /// 依語言標籤（如 `en-US`、`ru`）輸出日期字串
    ///
    /// 語言無法辨識時回傳 `None`。
    pub fn render(&self, date: &DateTime<Utc>, language: &str) -> Option<String> {
        let locale = resolve_locale(language)?;
        let english = language.to_ascii_lowercase().starts_with("en");
        let pattern = self.pattern(english);
        Some(date.format_localized(&pattern, locale).to_string())
    }

    /// 組出 strftime 樣式
    fn pattern(&self, month_first: bool) -> String {
        let defaults;
        let format = if self.is_empty() {
            defaults = Self::date(FieldStyle::Numeric, FieldStyle::Numeric, FieldStyle::Numeric);
            &defaults
        } else {
            self
        };

        let year = format.year.map(|style| match style {
            FieldStyle::TwoDigit => "%y",
            _ => "%Y",
        });
        let day = format.day.map(|style| match style {
            FieldStyle::TwoDigit => "%d",
            _ => "%-d",
        });
        let textual_month = matches!(
            format.month,
            Some(FieldStyle::Long | FieldStyle::Short | FieldStyle::Narrow)
        );
        let month = format.month.map(|style| match style {
            FieldStyle::Numeric => "%-m",
            FieldStyle::TwoDigit => "%m",
            FieldStyle::Long => "%B",
            FieldStyle::Short | FieldStyle::Narrow => "%b",
        });

        let mut date_part = String::new();
        if textual_month {
            // 英文：January 5, 2024；其他：5 January 2024
            if month_first {
                let head: Vec<&str> = [month, day].into_iter().flatten().collect();
                date_part.push_str(&head.join(" "));
                if let Some(year) = year {
                    if !date_part.is_empty() {
                        date_part.push_str(if day.is_some() { ", " } else { " " });
                    }
                    date_part.push_str(year);
                }
            } else {
                let parts: Vec<&str> = [day, month, year].into_iter().flatten().collect();
                date_part.push_str(&parts.join(" "));
            }
        } else {
            let (parts, separator): (Vec<&str>, &str) = if month_first {
                ([month, day, year].into_iter().flatten().collect(), "/")
            } else {
                ([day, month, year].into_iter().flatten().collect(), ".")
            };
            date_part.push_str(&parts.join(separator));
        }

        let mut pattern = String::new();
        if let Some(style) = format.weekday {
            pattern.push_str(match style {
                FieldStyle::Long => "%A",
                _ => "%a",
            });
            if !date_part.is_empty() {
                pattern.push_str(", ");
            }
        }
        pattern.push_str(&date_part);

        // 英文使用 12 小時制：2:07 PM
        if let Some(style) = format.hour {
            if !pattern.is_empty() {
                pattern.push(' ');
            }
            pattern.push_str(match (style, month_first) {
                (FieldStyle::TwoDigit, true) => "%I",
                (_, true) => "%-I",
                (FieldStyle::TwoDigit, false) => "%H",
                (_, false) => "%-H",
            });
            if format.minute.is_some() {
                pattern.push_str(":%M");
            }
            if month_first {
                pattern.push_str(" %p");
            }
        }

        pattern
    }
}

/// 語言標籤轉為 chrono 的 Locale
pub fn resolve_locale(language: &str) -> Option<Locale> {
    let tag = language.trim().replace('-', "_");
    if tag.is_empty() {
        return None;
    }
    if let Ok(locale) = Locale::try_from(tag.as_str()) {
        return Some(locale);
    }
    if tag.contains('_') {
        return None;
    }

    // 只有語言碼時補上預設地區
    let lower = tag.to_ascii_lowercase();
    let region = match lower.as_str() {
        "en" => "US",
        "uk" => "UA",
        "ja" => "JP",
        "zh" => "TW",
        "ko" => "KR",
        "cs" => "CZ",
        "da" => "DK",
        "sv" => "SE",
        "el" => "GR",
        other => return Locale::try_from(format!("{}_{}", other, other.to_ascii_uppercase()).as_str()).ok(),
    };
    Locale::try_from(format!("{}_{}", lower, region).as_str()).ok()
}
