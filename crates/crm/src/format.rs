//! Display helpers for lead origin data.
//!
//! Every helper joins entries as `key: value` with [`SEPARATOR`], and renders
//! missing data as [`PLACEHOLDER`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const PLACEHOLDER: &str = "—";
pub const SEPARATOR: &str = " • ";

/// UTM keys rendered first, in this order.
const UTM_KEY_ORDER: [&str; 5] = ["source", "medium", "campaign", "content", "term"];

const MAX_VALUE_CHARS: usize = 64;
const TRUNCATED_VALUE_CHARS: usize = 61;
const ELLIPSIS: char = '…';

/// Render UTM parameters on one line.
///
/// Known keys come first in `source, medium, campaign, content, term` order,
/// then any other keys in map order. Empty values are skipped and values
/// over 64 characters are cut to 61 plus `…`.
pub fn format_utm(utm: Option<&BTreeMap<String, String>>) -> String {
    let Some(utm) = utm else {
        return PLACEHOLDER.to_string();
    };

    let known = UTM_KEY_ORDER
        .iter()
        .filter_map(|&key| utm.get_key_value(key));
    let extra = utm
        .iter()
        .filter(|(key, _)| !UTM_KEY_ORDER.contains(&key.as_str()));

    let entries: Vec<String> = known
        .chain(extra)
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}: {}", truncate_value(value)))
        .collect();

    if entries.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        entries.join(SEPARATOR)
    }
}

/// Render event metadata as `key: value` pairs; strings are shown unquoted.
/// Returns an empty string when there is nothing to show.
pub fn format_metadata(meta: Option<&Map<String, Value>>) -> String {
    let Some(meta) = meta else {
        return String::new();
    };
    meta.iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// `2024-05-10 14:03 UTC`
pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn truncate_value(value: &str) -> String {
    if value.chars().count() > MAX_VALUE_CHARS {
        let mut cut: String = value.chars().take(TRUNCATED_VALUE_CHARS).collect();
        cut.push(ELLIPSIS);
        cut
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utm(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_or_empty_utm() {
        assert_eq!(format_utm(None), "—");
        assert_eq!(format_utm(Some(&BTreeMap::new())), "—");
        assert_eq!(format_utm(Some(&utm(&[("source", ""), ("term", "")]))), "—");
    }

    #[test]
    fn test_known_keys_first_then_extras() {
        let params = utm(&[
            ("extra", "x"),
            ("campaign", "brand"),
            ("medium", "cpc"),
            ("source", "google"),
        ]);
        let s = format_utm(Some(&params));
        assert_eq!(s, "source: google • medium: cpc • campaign: brand • extra: x");

        for piece in ["source: google", "medium: cpc", "campaign: brand", "extra: x"] {
            assert!(s.contains(piece));
        }
    }

    #[test]
    fn test_extras_follow_map_order_and_skip_empty() {
        let params = utm(&[
            ("term", "clinica"),
            ("zeta", "z"),
            ("alpha", "a"),
            ("content", ""),
            ("gclid", ""),
        ]);
        assert_eq!(
            format_utm(Some(&params)),
            "term: clinica • alpha: a • zeta: z"
        );
    }

    #[test]
    fn test_long_values_truncated() {
        let long = "c".repeat(80);
        let s = format_utm(Some(&utm(&[("campaign", long.as_str())])));
        let value = s.strip_prefix("campaign: ").unwrap();
        assert_eq!(value.chars().count(), 62);
        assert!(value.ends_with('…'));
        assert_eq!(&value[..61], "c".repeat(61));

        // Exactly 64 characters is left alone.
        let edge = "d".repeat(64);
        let s = format_utm(Some(&utm(&[("source", edge.as_str())])));
        assert_eq!(s, format!("source: {edge}"));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let accented = "é".repeat(70);
        let s = format_utm(Some(&utm(&[("content", accented.as_str())])));
        let value = s.strip_prefix("content: ").unwrap();
        assert_eq!(value.chars().count(), 62);
    }

    #[test]
    fn test_format_metadata() {
        let meta = json!({ "provider": "asaas", "amount": 1990, "method": "pix" });
        let meta = meta.as_object().unwrap();
        assert_eq!(
            format_metadata(Some(meta)),
            "amount: 1990 • method: pix • provider: asaas"
        );
        assert_eq!(format_metadata(None), "");
        assert_eq!(format_metadata(Some(&Map::new())), "");
    }

    #[test]
    fn test_format_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 10, 14, 3, 59).unwrap();
        assert_eq!(format_utc(ts), "2024-05-10 14:03 UTC");
    }
}
