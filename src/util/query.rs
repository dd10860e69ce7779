use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Default)]
pub struct QueryParams {
    map: HashMap<String, String>,
}

impl<'de> Deserialize<'de> for QueryParams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(QueryParams { map })
    }
}

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(val) = self.map.get(key) {
            return Some(val);
        }

        // Retry with the first letter uppercased ("count" -> "Count").
        let mut chars = key.chars();
        let first = chars.next()?;
        if first.is_ascii_lowercase() {
            let key2: String = first.to_ascii_uppercase().to_string() + chars.as_str();
            return self.map.get(&key2).map(|x| x.as_str());
        }
        None
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        QueryParams {
            map: iter.into_iter().collect(),
        }
    }
}

/// Batch size from a query value. Reads the leading integer like a lenient
/// `parseInt` ("12abc" is 12, "2.5" is 2). Absent or non-numeric falls back
/// to `default`, negative numbers clamp to zero.
pub fn parse_count(value: Option<&str>, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return default;
    }
    if negative {
        return 0;
    }
    // All digits, so the only possible failure is overflow.
    rest[..digits].parse::<usize>().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_with_capitalized_fallback() {
        let p = params(&[("Count", "5"), ("genre", "drama")]);
        assert_eq!(p.get("count"), Some("5"));
        assert_eq!(p.get("genre"), Some("drama"));
        assert_eq!(p.get("missing"), None);
        assert_eq!(p.get(""), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(None, 20), 20);
        assert_eq!(parse_count(Some("abc"), 20), 20);
        assert_eq!(parse_count(Some(""), 20), 20);
        assert_eq!(parse_count(Some("7"), 20), 7);
        assert_eq!(parse_count(Some(" 12 "), 20), 12);
        assert_eq!(parse_count(Some("0"), 20), 0);
        assert_eq!(parse_count(Some("-3"), 20), 0);
        assert_eq!(parse_count(Some("-"), 20), 20);
        assert_eq!(parse_count(Some("+4"), 20), 4);
    }

    #[test]
    fn test_parse_count_reads_leading_integer() {
        assert_eq!(parse_count(Some("2.5"), 20), 2);
        assert_eq!(parse_count(Some("12abc"), 20), 12);
        assert_eq!(parse_count(Some(" 7x"), 20), 7);
        assert_eq!(parse_count(Some("-3.9"), 20), 0);
        assert_eq!(parse_count(Some("x12"), 20), 20);
        assert_eq!(parse_count(Some("99999999999999999999999"), 20), usize::MAX);
    }
}
