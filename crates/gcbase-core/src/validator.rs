//! 欄位定義驗證與正規化

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::caption::{
    AutoCaption, Caption, DateCaption, FlagCaption, LinkCaption, LinkData, NumberCaption,
    NumberFormat, RowdateCaption, TextCaption,
};
use crate::date_format::{resolve_locale, DateFormat};
use crate::numeric::parse_int_prefix;
use crate::table::TableDef;
use crate::{GcError, Result};

/// 尚未驗證的欄位描述（使用者輸入）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionSpec {
    /// 欄位類型：text、auto、link、date、rowdate、flag、number
    #[serde(rename = "type")]
    pub kind: String,

    /// number 為字串，date 為格式物件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LinkData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiply: Option<bool>,

    /// precision 格式的小數位數，可為數字或字串
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<JsonValue>,
}

impl CaptionSpec {
    /// 創建指定類型的欄位描述
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    pub fn text() -> Self {
        Self::new("text")
    }

    pub fn auto() -> Self {
        Self::new("auto")
    }

    pub fn rowdate() -> Self {
        Self::new("rowdate")
    }

    pub fn flag() -> Self {
        Self::new("flag")
    }

    pub fn number() -> Self {
        Self::new("number")
    }

    pub fn date() -> Self {
        Self::new("date")
    }

    /// 連結到 `table` 的 `to` 欄位，取回 `data`
    pub fn link(table: &str, to: &str, data: impl Into<LinkData>) -> Self {
        Self {
            table: Some(table.to_string()),
            to: Some(to.to_string()),
            data: Some(data.into()),
            ..Self::new("link")
        }
    }

    /// 建構器模式：設置唯一
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    /// 建構器模式：設置多值連結
    pub fn with_multiply(mut self, multiply: bool) -> Self {
        self.multiply = Some(multiply);
        self
    }

    /// 建構器模式：設置數值格式（integer、float、precision）
    pub fn with_number_format(mut self, format: &str) -> Self {
        self.format = Some(JsonValue::String(format.to_string()));
        self
    }

    /// 建構器模式：設置小數位數
    pub fn with_precision(mut self, precision: impl Into<JsonValue>) -> Self {
        self.precision = Some(precision.into());
        self
    }

    /// 建構器模式：設置日期格式與語言
    pub fn with_date_format(mut self, format: DateFormat, language: &str) -> Self {
        self.format = serde_json::to_value(format).ok();
        self.language = Some(language.to_string());
        self
    }
}

/// 欄位定義驗證器
pub struct CaptionValidator;

impl CaptionValidator {
    /// 驗證整組欄位定義
    ///
    /// 連結欄位只能指向 `tables` 中已存在的資料表。
    pub fn validate_all(
        specs: &BTreeMap<String, CaptionSpec>,
        tables: &BTreeMap<String, TableDef>,
    ) -> Result<BTreeMap<String, Caption>> {
        specs
            .iter()
            .map(|(column, spec)| Ok((column.clone(), Self::validate(column, spec, tables)?)))
            .collect()
    }

    /// 驗證並正規化單一欄位，回傳新的欄位定義
    pub fn validate(
        column: &str,
        spec: &CaptionSpec,
        tables: &BTreeMap<String, TableDef>,
    ) -> Result<Caption> {
        let unique = spec.unique.unwrap_or(false);

        let caption = match spec.kind.as_str() {
            "text" => Caption::Text(TextCaption { unique }),

            "auto" => Caption::Auto(AutoCaption { next: 0 }),

            "link" => Caption::Link(Self::validate_link(column, spec, tables)?),

            "date" => {
                let has_format = spec.format.is_some();
                let has_language = spec.language.is_some();
                if has_format != has_language {
                    return Err(schema_error(
                        column,
                        "日期的 format 與 language 必須同時設定",
                    ));
                }
                if unique {
                    return Err(schema_error(column, "日期欄位不可設為 unique"));
                }

                let format = spec
                    .format
                    .as_ref()
                    .map(|value| {
                        if !value.is_object() {
                            return Err(schema_error(column, "日期 format 必須是物件"));
                        }
                        serde_json::from_value::<DateFormat>(value.clone())
                            .map_err(|e| schema_error(column, &format!("無效的日期格式: {}", e)))
                    })
                    .transpose()?;

                if let Some(language) = &spec.language {
                    if resolve_locale(language).is_none() {
                        return Err(schema_error(
                            column,
                            &format!("無法辨識的語言: {}", language),
                        ));
                    }
                }

                Caption::Date(DateCaption {
                    format,
                    language: spec.language.clone(),
                })
            }

            "rowdate" => Caption::Rowdate(RowdateCaption { unique }),

            "flag" => {
                if unique {
                    return Err(schema_error(column, "旗標欄位不可設為 unique"));
                }
                Caption::Flag(FlagCaption {})
            }

            "number" => Caption::Number(Self::validate_number(column, spec, unique)?),

            other => {
                return Err(schema_error(column, &format!("未知的欄位類型: {}", other)));
            }
        };

        Ok(caption)
    }

    fn validate_link(
        column: &str,
        spec: &CaptionSpec,
        tables: &BTreeMap<String, TableDef>,
    ) -> Result<LinkCaption> {
        let (Some(data), Some(to), Some(table)) = (&spec.data, &spec.to, &spec.table) else {
            return Err(schema_error(column, "連結欄位需要 data、to、table"));
        };

        let multiply = spec.multiply.unwrap_or(false);
        if !multiply && data.is_multi() {
            return Err(schema_error(
                column,
                "multiply 未開啟時 data 不可包含多個欄位",
            ));
        }

        let target = tables
            .get(table)
            .filter(|target| target.has_column(to))
            .ok_or_else(|| {
                schema_error(
                    column,
                    &format!("連結目標不存在 ({}:{})", table, to),
                )
            })?;

        if let Some(missing) = data.columns().into_iter().find(|c| !target.has_column(c)) {
            return Err(schema_error(
                column,
                &format!("連結投影欄位不存在 ({}:{})", table, missing),
            ));
        }

        Ok(LinkCaption {
            table: table.clone(),
            to: to.clone(),
            data: data.clone(),
            multiply,
            unique: spec.unique.unwrap_or(false),
        })
    }

    fn validate_number(column: &str, spec: &CaptionSpec, unique: bool) -> Result<NumberCaption> {
        let format = match &spec.format {
            None => NumberFormat::Integer,
            Some(JsonValue::String(name)) => match name.as_str() {
                "integer" => NumberFormat::Integer,
                "float" => NumberFormat::Float,
                "precision" => NumberFormat::Precision,
                other => {
                    return Err(schema_error(column, &format!("未知的數值格式: {}", other)));
                }
            },
            Some(other) => {
                return Err(schema_error(column, &format!("未知的數值格式: {}", other)));
            }
        };

        let precision = if format == NumberFormat::Precision {
            let digits = spec.precision.as_ref().and_then(|value| match value {
                JsonValue::Number(n) => n.as_f64().filter(|n| n.is_finite()).map(|n| n.trunc() as i64),
                JsonValue::String(s) => parse_int_prefix(s),
                _ => None,
            });
            match digits {
                Some(digits) if digits >= 0 => Some(digits as u32),
                _ => {
                    return Err(schema_error(
                        column,
                        &format!(
                            "precision 格式需要非負整數的小數位數，收到: {}",
                            spec.precision
                                .as_ref()
                                .map(ToString::to_string)
                                .unwrap_or_else(|| "無".to_string())
                        ),
                    ));
                }
            }
        } else {
            None
        };

        Ok(NumberCaption {
            format,
            precision,
            unique,
        })
    }
}

fn schema_error(column: &str, message: &str) -> GcError {
    GcError::Schema(format!("{}: {}", column, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_format::FieldStyle;
    use rstest::rstest;

    fn authors() -> BTreeMap<String, TableDef> {
        let mut captions = BTreeMap::new();
        captions.insert("id".to_string(), Caption::Auto(AutoCaption::default()));
        captions.insert("name".to_string(), Caption::Text(TextCaption::default()));
        let mut tables = BTreeMap::new();
        tables.insert("Authors".to_string(), TableDef::new(captions));
        tables
    }

    #[test]
    fn test_text_and_auto_normalization() {
        let tables = BTreeMap::new();
        let text = CaptionValidator::validate("name", &CaptionSpec::text(), &tables).unwrap();
        assert_eq!(text, Caption::Text(TextCaption { unique: false }));

        let auto = CaptionValidator::validate("id", &CaptionSpec::auto(), &tables).unwrap();
        assert_eq!(auto, Caption::Auto(AutoCaption { next: 0 }));
        assert!(auto.is_unique());
    }

    #[test]
    fn test_link_validation() {
        let tables = authors();

        let link = CaptionValidator::validate(
            "author",
            &CaptionSpec::link("Authors", "id", "name"),
            &tables,
        )
        .unwrap();
        assert_eq!(link.as_link().unwrap().table, "Authors");

        let missing_column = CaptionSpec::link("Authors", "nope", "name");
        assert!(matches!(
            CaptionValidator::validate("author", &missing_column, &tables),
            Err(GcError::Schema(_))
        ));

        let missing_table = CaptionSpec::link("Publishers", "id", "name");
        assert!(CaptionValidator::validate("publisher", &missing_table, &tables).is_err());

        let incomplete = CaptionSpec {
            to: None,
            ..CaptionSpec::link("Authors", "id", "name")
        };
        assert!(CaptionValidator::validate("author", &incomplete, &tables).is_err());
    }

    #[test]
    fn test_link_multi_projection_requires_multiply() {
        let tables = authors();
        let spec = CaptionSpec::link("Authors", "id", vec!["id", "name"]);
        assert!(CaptionValidator::validate("authors", &spec, &tables).is_err());

        let spec = spec.with_multiply(true);
        let caption = CaptionValidator::validate("authors", &spec, &tables).unwrap();
        assert!(caption.as_link().unwrap().multiply);
    }

    #[test]
    fn test_link_projection_columns_exist() {
        let tables = authors();
        let spec = CaptionSpec::link("Authors", "id", "email");
        assert!(CaptionValidator::validate("author", &spec, &tables).is_err());

        let spec = CaptionSpec::link("Authors", "id", ":all");
        assert!(CaptionValidator::validate("author", &spec, &tables).is_ok());
    }

    #[test]
    fn test_date_pairing() {
        let tables = BTreeMap::new();
        assert!(CaptionValidator::validate("born", &CaptionSpec::date(), &tables).is_ok());

        let only_language = CaptionSpec {
            language: Some("en-US".to_string()),
            ..CaptionSpec::date()
        };
        assert!(CaptionValidator::validate("born", &only_language, &tables).is_err());

        let format = DateFormat::date(FieldStyle::Numeric, FieldStyle::Long, FieldStyle::Numeric);
        let full = CaptionSpec::date().with_date_format(format.clone(), "en-US");
        let caption = CaptionValidator::validate("born", &full, &tables).unwrap();
        assert_eq!(
            caption,
            Caption::Date(DateCaption {
                format: Some(format),
                language: Some("en-US".to_string()),
            })
        );

        let unique = CaptionSpec::date().with_unique(true);
        assert!(CaptionValidator::validate("born", &unique, &tables).is_err());

        let not_object = CaptionSpec {
            format: Some(JsonValue::String("long".to_string())),
            language: Some("en".to_string()),
            ..CaptionSpec::date()
        };
        assert!(CaptionValidator::validate("born", &not_object, &tables).is_err());
    }

    #[test]
    fn test_flag_rejects_unique() {
        let tables = BTreeMap::new();
        assert!(CaptionValidator::validate("done", &CaptionSpec::flag(), &tables).is_ok());
        assert!(
            CaptionValidator::validate("done", &CaptionSpec::flag().with_unique(true), &tables)
                .is_err()
        );
    }

    #[rstest]
    #[case(CaptionSpec::number(), Some((NumberFormat::Integer, None)))]
    #[case(CaptionSpec::number().with_number_format("float"), Some((NumberFormat::Float, None)))]
    #[case(
        CaptionSpec::number().with_number_format("precision").with_precision(2),
        Some((NumberFormat::Precision, Some(2)))
    )]
    #[case(
        CaptionSpec::number().with_number_format("precision").with_precision("3 digits"),
        Some((NumberFormat::Precision, Some(3)))
    )]
    #[case(CaptionSpec::number().with_number_format("precision"), None)]
    #[case(CaptionSpec::number().with_number_format("precision").with_precision("x"), None)]
    #[case(CaptionSpec::number().with_number_format("precision").with_precision(-1), None)]
    #[case(CaptionSpec::number().with_number_format("decimal"), None)]
    fn test_number_formats(
        #[case] spec: CaptionSpec,
        #[case] expected: Option<(NumberFormat, Option<u32>)>,
    ) {
        let result = CaptionValidator::validate("amount", &spec, &BTreeMap::new());
        match expected {
            Some((format, precision)) => {
                let caption = result.unwrap();
                assert_eq!(
                    caption,
                    Caption::Number(NumberCaption {
                        format,
                        precision,
                        unique: false,
                    })
                );
            }
            None => assert!(matches!(result, Err(GcError::Schema(_)))),
        }
    }

    #[test]
    fn test_unknown_type() {
        let spec = CaptionSpec::new("currency");
        assert!(matches!(
            CaptionValidator::validate("price", &spec, &BTreeMap::new()),
            Err(GcError::Schema(_))
        ));
    }

    #[test]
    fn test_caption_spec_from_json() {
        let spec: CaptionSpec = serde_json::from_str(
            r#"{"type":"link","table":"Authors","to":"id","data":["id","name"],"multiply":true}"#,
        )
        .unwrap();
        let caption = CaptionValidator::validate("authors", &spec, &authors()).unwrap();
        assert_eq!(
            caption.as_link().unwrap().data,
            LinkData::Columns(vec!["id".to_string(), "name".to_string()])
        );
    }
}
