use std::collections::HashSet;
use std::str::FromStr;

use regex::Regex;
use reqwest::header::{HeaderName, HeaderValue};

pub const DEFAULT_PROFILE_BASE: &str = "https://www.horseracingnation.com/horse";

/// Parses a `Key: Value` header.
pub fn parse_header(value: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (key, val) = value
        .split_once(':')
        .ok_or_else(|| "expected format 'Key: Value'".to_string())?;
    let name = HeaderName::from_str(key.trim())
        .map_err(|_| format!("invalid header name '{}'", key.trim()))?;
    let value =
        HeaderValue::from_str(val.trim()).map_err(|_| "invalid header value".to_string())?;
    Ok((name, value))
}

/// Splits a comma/whitespace separated id list, dropping blanks and duplicates while keeping order.
pub fn parse_ids_csv(value: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for part in value.split(|c: char| c == ',' || c.is_whitespace()) {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_string()) {
            out.push(item.to_string());
        }
    }
    out
}

/// Readable name from a horse id: `Silver_Arrow_12` -> `Silver Arrow`.
pub fn clean_horse_name(horse_id: &str) -> String {
    let spaced = horse_id.replace('_', " ");
    let stripped = match Regex::new(r"\s*\d+$") {
        Ok(re) => re.replace(&spaced, "").to_string(),
        Err(_) => spaced,
    };
    stripped.trim().to_string()
}

pub fn horse_profile_url(base: &str, horse_id: &str) -> String {
    format!("{}/{}", base.trim().trim_end_matches('/'), horse_id.trim())
}

/// True when `value` parses as an absolute http(s) URL.
pub fn is_http_url(value: &str) -> bool {
    match reqwest::Url::parse(value.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_splits_on_first_colon() {
        let (name, value) = parse_header("X-Token: a:b").unwrap();
        assert_eq!(name.as_str(), "x-token");
        assert_eq!(value.to_str().unwrap(), "a:b");
        assert!(parse_header("no separator").is_err());
        assert!(parse_header("bad name: v").is_err());
    }

    #[test]
    fn parse_ids_csv_dedupes_in_order() {
        assert_eq!(parse_ids_csv("3, 1 3,,2"), vec!["3", "1", "2"]);
        assert!(parse_ids_csv(" , ").is_empty());
    }

    #[test]
    fn clean_horse_name_drops_trailing_number() {
        assert_eq!(clean_horse_name("Silver_Arrow_12"), "Silver Arrow");
        assert_eq!(clean_horse_name("Secretariat"), "Secretariat");
        assert_eq!(clean_horse_name("Route_66_Star"), "Route 66 Star");
    }

    #[test]
    fn profile_url_joins_once() {
        assert_eq!(
            horse_profile_url("https://site/horse/", "Flash_2"),
            "https://site/horse/Flash_2"
        );
    }

    #[test]
    fn http_url_check() {
        assert!(is_http_url("https://example.com/entries"));
        assert!(!is_http_url("example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url(""));
    }
}
