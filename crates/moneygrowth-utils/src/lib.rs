//! Utility functions and helpers

use std::collections::BTreeMap;

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;
    for c in s.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Parse a modifier string such as `"id=20;is_internal=true"` into key/value pairs.
///
/// Segments without `=` are ignored. Keys and values are trimmed; the value
/// keeps everything after the first `=`.
pub fn normalize_modify(modify: &str) -> BTreeMap<String, String> {
    modify
        .split(';')
        .filter_map(|item| item.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Split a comma separated column list, dropping blanks
pub fn split_columns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(7), "7");
        assert_eq!(format_number(100), "100");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_normalize_modify() {
        let pairs = normalize_modify("id=20; is_internal = true");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get("id").map(String::as_str), Some("20"));
        assert_eq!(pairs.get("is_internal").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_normalize_modify_skips_garbage() {
        assert!(normalize_modify("").is_empty());
        assert!(normalize_modify("   ").is_empty());

        let pairs = normalize_modify("noequals;note=a=b;=orphan");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("note").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_split_columns() {
        assert_eq!(split_columns("id, date ,,amount"), vec!["id", "date", "amount"]);
        assert!(split_columns("").is_empty());
    }
}
