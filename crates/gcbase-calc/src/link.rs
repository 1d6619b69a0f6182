//! 連結解析

use gcbase_core::{CachedRow, Caption, Cell, LinkCaption, LinkData, Value};

/// 連結解析器
///
/// 只讀取目標資料表已重建的快取，不會觸及正在重建的資料表。
pub struct LinkResolver;

impl LinkResolver {
    /// 解析單一鍵值
    ///
    /// # 參數
    /// * `caption` - 連結欄位定義
    /// * `key` - 原始鍵值；`multiply` 時為鍵值集合
    /// * `target_caption` - 目標資料表 `caption.to` 欄位的定義
    /// * `target_rows` - 目標資料表的快取資料列
    ///
    /// 目標欄位唯一時回傳第一筆結果（查無資料為 [`Cell::Missing`]），
    /// 否則回傳依目標資料列順序排列的清單。
    pub fn resolve(
        caption: &LinkCaption,
        key: &Value,
        target_caption: &Caption,
        target_rows: &[CachedRow],
    ) -> Cell {
        let matching = target_rows
            .iter()
            .filter(|row| Self::matches(caption, key, row));

        let results: Vec<Cell> = match &caption.data {
            LinkData::All => matching.map(|row| Cell::Row(row.clone())).collect(),
            LinkData::Columns(columns) => matching
                .map(|row| {
                    let projected: CachedRow = columns
                        .iter()
                        .filter_map(|column| {
                            row.get(column).map(|cell| (column.clone(), cell.clone()))
                        })
                        .collect();
                    Cell::Row(projected)
                })
                .collect(),
            LinkData::Column(column) => matching
                .map(|row| row.get(column).cloned().unwrap_or(Cell::Missing))
                .collect(),
        };

        if target_caption.is_unique() {
            results.into_iter().next().unwrap_or(Cell::Missing)
        } else {
            Cell::List(results)
        }
    }

    /// 目標資料列的 `to` 欄位是否符合鍵值
    fn matches(caption: &LinkCaption, key: &Value, row: &CachedRow) -> bool {
        let Some(candidate) = row.get(&caption.to).and_then(Cell::as_scalar) else {
            return false;
        };

        if caption.multiply {
            match key {
                Value::List(keys) => keys.iter().any(|k| k == candidate),
                single => single == candidate,
            }
        } else {
            key == candidate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbase_core::{AutoCaption, TextCaption};

    fn link(to: &str, data: LinkData, multiply: bool) -> LinkCaption {
        LinkCaption {
            table: "Codes".to_string(),
            to: to.to_string(),
            data,
            multiply,
            unique: false,
        }
    }

    fn code_rows() -> Vec<CachedRow> {
        [("x", "Ex", 0), ("y", "Why", 1), ("z", "Zed", 2), ("x", "Ex again", 3)]
            .into_iter()
            .map(|(code, label, id)| {
                let mut row = CachedRow::new();
                row.insert("code".to_string(), Cell::from(code));
                row.insert("label".to_string(), Cell::from(label));
                row.insert("id".to_string(), Cell::from(id));
                row
            })
            .collect()
    }

    #[test]
    fn test_unique_target_returns_scalar() {
        let unique = Caption::Text(TextCaption { unique: true });
        let caption = link("code", LinkData::Column("code".to_string()), false);

        let found = LinkResolver::resolve(&caption, &Value::from("y"), &unique, &code_rows());
        assert_eq!(found, Cell::from("y"));

        let absent = LinkResolver::resolve(&caption, &Value::from("w"), &unique, &code_rows());
        assert_eq!(absent, Cell::Missing);
    }

    #[test]
    fn test_non_unique_target_returns_list() {
        let plain = Caption::Text(TextCaption::default());
        let caption = link("code", LinkData::Column("label".to_string()), false);

        let found = LinkResolver::resolve(&caption, &Value::from("x"), &plain, &code_rows());
        assert_eq!(found, Cell::List(vec![Cell::from("Ex"), Cell::from("Ex again")]));

        let none = LinkResolver::resolve(&caption, &Value::from("w"), &plain, &code_rows());
        assert_eq!(none, Cell::List(Vec::new()));
    }

    #[test]
    fn test_multiply_matches_any_key() {
        let plain = Caption::Text(TextCaption::default());
        let caption = link("code", LinkData::Column("id".to_string()), true);

        let found = LinkResolver::resolve(
            &caption,
            &Value::from(vec!["x", "y"]),
            &plain,
            &code_rows(),
        );
        assert_eq!(
            found,
            Cell::List(vec![Cell::from(0), Cell::from(1), Cell::from(3)])
        );
    }

    #[test]
    fn test_projection_and_all() {
        let auto = Caption::Auto(AutoCaption::default());
        let rows = code_rows();

        let projected = LinkResolver::resolve(
            &link("id", LinkData::Columns(vec!["code".to_string(), "label".to_string()]), true),
            &Value::from(vec![2]),
            &auto,
            &rows,
        );
        let mut expected = CachedRow::new();
        expected.insert("code".to_string(), Cell::from("z"));
        expected.insert("label".to_string(), Cell::from("Zed"));
        assert_eq!(projected, Cell::Row(expected));

        let whole = LinkResolver::resolve(&link("id", LinkData::All, false), &Value::from(1), &auto, &rows);
        assert_eq!(whole, Cell::Row(rows[1].clone()));
    }

    #[test]
    fn test_strict_equality() {
        let auto = Caption::Auto(AutoCaption::default());
        let caption = link("id", LinkData::Column("label".to_string()), false);

        // 文字 "1" 不等於數值 1
        let result = LinkResolver::resolve(&caption, &Value::from("1"), &auto, &code_rows());
        assert_eq!(result, Cell::Missing);
    }
}
