//! Freshness policy derived from stored metadata
//!
//! The stored `expires` header is treated as the instant the artifact was
//! last validated. The cache adds its own TTL on top of it to get the
//! deadline, so an entry stays fresh until `expires + ttl`.

use crate::meta::{HeaderMap, HeaderValue};
use chrono::{DateTime, TimeDelta, Utc};

/// Parse an `expires` header value. Returns `None` for anything that is
/// not a recognizable date.
pub fn parse_expires(value: &HeaderValue) -> Option<DateTime<Utc>> {
    match value {
        HeaderValue::Text(text) => parse_date(text),
        // Numbers are milliseconds since the Unix epoch
        HeaderValue::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        HeaderValue::List(items) => match items.as_slice() {
            [single] => parse_date(single),
            _ => None,
        },
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Instant the entry was last validated, falling back to the epoch when
/// there is no usable `expires` header.
pub fn last_validated(meta: Option<&HeaderMap>) -> DateTime<Utc> {
    meta.and_then(HeaderMap::expires)
        .and_then(parse_expires)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Instant after which the entry is expired. Saturates instead of
/// overflowing for very large TTLs.
pub fn deadline(meta: Option<&HeaderMap>, ttl_secs: u64) -> DateTime<Utc> {
    let ttl = i64::try_from(ttl_secs)
        .ok()
        .and_then(TimeDelta::try_seconds);

    ttl.and_then(|ttl| last_validated(meta).checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn is_fresh(meta: Option<&HeaderMap>, ttl_secs: u64, now: DateTime<Utc>) -> bool {
    now <= deadline(meta, ttl_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_expires(&"Sun, 06 Nov 1994 08:49:37 GMT".into());
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()));
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_expires(&"2024-05-01T10:00:00+02:00".into());
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
    }

    #[test]
    fn test_parse_epoch_millis() {
        let parsed = parse_expires(&HeaderValue::from(1_000_000_000_000u64));
        assert_eq!(parsed, Some(at(1_000_000_000)));
    }

    #[test]
    fn test_parse_single_item_list() {
        let value = HeaderValue::from(vec!["Sun, 06 Nov 1994 08:49:37 GMT".to_string()]);
        assert!(parse_expires(&value).is_some());

        let value = HeaderValue::from(vec!["a".to_string(), "b".to_string()]);
        assert!(parse_expires(&value).is_none());
    }

    #[test]
    fn test_garbage_and_empty_do_not_parse() {
        assert!(parse_expires(&"".into()).is_none());
        assert!(parse_expires(&"not a date".into()).is_none());
    }

    #[test]
    fn test_last_validated_defaults_to_epoch() {
        assert_eq!(last_validated(None), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(last_validated(Some(&HeaderMap::new())), DateTime::<Utc>::UNIX_EPOCH);

        let meta = HeaderMap::new().with("expires", "yesterday-ish");
        assert_eq!(last_validated(Some(&meta)), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_ttl_is_added_on_top_of_expires() {
        let meta = HeaderMap::new().with_expires(at(1_000));
        assert_eq!(deadline(Some(&meta), 10), at(1_010));

        // Boundary is inclusive
        assert!(is_fresh(Some(&meta), 10, at(1_010)));
        assert!(!is_fresh(Some(&meta), 10, at(1_011)));
    }

    #[test]
    fn test_missing_meta_is_expired_for_normal_ttls() {
        assert!(!is_fresh(None, 86_400, Utc::now()));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        assert_eq!(deadline(None, u64::MAX), DateTime::<Utc>::MAX_UTC);
        assert!(is_fresh(None, u64::MAX, Utc::now()));
    }
}
