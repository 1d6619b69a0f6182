//! 寬鬆的數字前綴解析
//!
//! 與表單輸入的慣例一致：忽略前導空白，讀取最長的合法數字前綴，
//! 後面的字元直接捨棄（`"42px"` → 42）。

/// 讀取整數前綴
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    trimmed[..end].parse().ok()
}

/// 讀取浮點數前綴（含小數點與指數）
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // 指數部分必須完整才採用
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", Some(42))]
    #[case("  -7 apples", Some(-7))]
    #[case("3.9", Some(3))]
    #[case("+12", Some(12))]
    #[case("abc", None)]
    #[case("-", None)]
    #[case("", None)]
    fn test_parse_int_prefix(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_int_prefix(input), expected);
    }

    #[rstest]
    #[case("3.14159", Some(3.14159))]
    #[case(".5", Some(0.5))]
    #[case("1e3kg", Some(1000.0))]
    #[case("2e", Some(2.0))]
    #[case("-0.25x", Some(-0.25))]
    #[case(".", None)]
    #[case("x1", None)]
    fn test_parse_float_prefix(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_float_prefix(input), expected);
    }
}
