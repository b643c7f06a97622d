//! Conditional request evaluation
//!
//! Implements the precondition ordering of RFC 9110 §13.2.2: If-Match,
//! then If-Unmodified-Since, then If-None-Match, then If-Modified-Since.
//! If-Range is evaluated separately because it only gates the Range header.

use crate::etag;
use http::header::{IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE};
use http::HeaderMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Result of precondition evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precondition {
    /// Serve the representation
    Proceed,
    /// Respond 304 Not Modified
    NotModified,
    /// Respond 412 Precondition Failed
    PreconditionFailed,
}

/// Evaluate request preconditions against the file's validators.
///
/// Date comparisons are truncated to whole seconds, matching the
/// resolution of IMF-fixdate.
pub fn evaluate(headers: &HeaderMap, etag: &str, modified: Option<SystemTime>) -> Precondition {
    if let Some(if_match) = header_str(headers, &IF_MATCH) {
        if !etag::strong_match(if_match, etag) {
            return Precondition::PreconditionFailed;
        }
    } else if let Some(date) = header_date(headers, &IF_UNMODIFIED_SINCE) {
        if let Some(mtime) = modified {
            if unix_secs(mtime) > unix_secs(date) {
                return Precondition::PreconditionFailed;
            }
        }
    }

    if let Some(if_none_match) = header_str(headers, &IF_NONE_MATCH) {
        if etag::weak_match(if_none_match, etag) {
            return Precondition::NotModified;
        }
    } else if let Some(date) = header_date(headers, &IF_MODIFIED_SINCE) {
        if let Some(mtime) = modified {
            if unix_secs(mtime) <= unix_secs(date) {
                return Precondition::NotModified;
            }
        }
    }

    Precondition::Proceed
}

/// Evaluate If-Range: returns true when the Range header should be honored.
///
/// The validator is either a strong ETag or an HTTP-date; a mismatch means
/// the client's copy is stale and the full body must be sent instead.
pub fn range_applies(headers: &HeaderMap, etag: &str, modified: Option<SystemTime>) -> bool {
    let value = match header_str(headers, &IF_RANGE) {
        Some(v) => v,
        None => return true,
    };

    if value.starts_with('"') || value.starts_with("W/") {
        return etag::strong_match(value, etag);
    }

    match (httpdate::parse_http_date(value), modified) {
        (Ok(date), Some(mtime)) => unix_secs(mtime) == unix_secs(date),
        _ => false,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &http::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_date(headers: &HeaderMap, name: &http::header::HeaderName) -> Option<SystemTime> {
    header_str(headers, name).and_then(|v| httpdate::parse_http_date(v).ok())
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::time::Duration;

    const ETAG: &str = "\"5-abc\"";

    fn headers(pairs: &[(http::header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn mtime() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_no_preconditions() {
        assert_eq!(evaluate(&HeaderMap::new(), ETAG, Some(mtime())), Precondition::Proceed);
    }

    #[test]
    fn test_if_none_match_hit() {
        let h = headers(&[(IF_NONE_MATCH, ETAG)]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::NotModified);
    }

    #[test]
    fn test_if_none_match_weak_hit() {
        let h = headers(&[(IF_NONE_MATCH, "W/\"5-abc\"")]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::NotModified);
    }

    #[test]
    fn test_if_match_miss_beats_if_none_match() {
        // 412 takes precedence over 304
        let h = headers(&[(IF_MATCH, "\"other\""), (IF_NONE_MATCH, ETAG)]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::PreconditionFailed);
    }

    #[test]
    fn test_if_modified_since() {
        let date = httpdate::fmt_http_date(mtime());
        let h = headers(&[(IF_MODIFIED_SINCE, date.as_str())]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::NotModified);

        let older = httpdate::fmt_http_date(mtime() - Duration::from_secs(60));
        let h = headers(&[(IF_MODIFIED_SINCE, older.as_str())]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::Proceed);
    }

    #[test]
    fn test_if_none_match_shadows_if_modified_since() {
        let older = httpdate::fmt_http_date(mtime() - Duration::from_secs(60));
        let h = headers(&[(IF_NONE_MATCH, "\"other\""), (IF_MODIFIED_SINCE, older.as_str())]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::Proceed);
    }

    #[test]
    fn test_if_unmodified_since() {
        let older = httpdate::fmt_http_date(mtime() - Duration::from_secs(60));
        let h = headers(&[(IF_UNMODIFIED_SINCE, older.as_str())]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::PreconditionFailed);
    }

    #[test]
    fn test_unparseable_date_ignored() {
        let h = headers(&[(IF_MODIFIED_SINCE, "not a date")]);
        assert_eq!(evaluate(&h, ETAG, Some(mtime())), Precondition::Proceed);
    }

    #[test]
    fn test_if_range_etag() {
        let h = headers(&[(IF_RANGE, ETAG)]);
        assert!(range_applies(&h, ETAG, Some(mtime())));

        let h = headers(&[(IF_RANGE, "\"stale\"")]);
        assert!(!range_applies(&h, ETAG, Some(mtime())));
    }

    #[test]
    fn test_if_range_date() {
        let date = httpdate::fmt_http_date(mtime());
        let h = headers(&[(IF_RANGE, date.as_str())]);
        assert!(range_applies(&h, ETAG, Some(mtime())));

        let older = httpdate::fmt_http_date(mtime() - Duration::from_secs(60));
        let h = headers(&[(IF_RANGE, older.as_str())]);
        assert!(!range_applies(&h, ETAG, Some(mtime())));
    }

    #[test]
    fn test_if_range_absent() {
        assert!(range_applies(&HeaderMap::new(), ETAG, Some(mtime())));
    }
}
