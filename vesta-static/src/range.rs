//! Byte range parsing
//!
//! Single-range `bytes=` handling per RFC 9110 §14. Multi-range requests
//! and non-bytes units fall back to the full representation; a
//! syntactically valid but unsatisfiable range signals 416.

/// Outcome of parsing a Range header against a representation length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeOutcome {
    /// Serve the full representation (no range, malformed, or multi-range)
    Full,
    /// Serve the inclusive byte window `start..=end` with 206
    Partial { start: u64, end: u64 },
    /// Respond 416 with `Content-Range: bytes */len`
    Unsatisfiable,
}

/// Parse a Range header value for a representation of `len` bytes.
pub fn parse(header: &str, len: u64) -> RangeOutcome {
    let spec = match header.strip_prefix("bytes=") {
        Some(s) => s.trim(),
        None => return RangeOutcome::Full,
    };

    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let (start_str, end_str) = match spec.split_once('-') {
        Some(parts) => parts,
        None => return RangeOutcome::Full,
    };

    if start_str.is_empty() {
        // Suffix range: last N bytes
        let suffix = match end_str.parse::<u64>() {
            Ok(n) => n,
            Err(_) => return RangeOutcome::Full,
        };
        if suffix == 0 || len == 0 {
            return RangeOutcome::Unsatisfiable;
        }
        let start = len.saturating_sub(suffix);
        return RangeOutcome::Partial { start, end: len - 1 };
    }

    let start = match start_str.parse::<u64>() {
        Ok(n) => n,
        Err(_) => return RangeOutcome::Full,
    };

    let end = if end_str.is_empty() {
        len.saturating_sub(1)
    } else {
        match end_str.parse::<u64>() {
            Ok(n) => n.min(len.saturating_sub(1)),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if start >= len {
        return RangeOutcome::Unsatisfiable;
    }
    if start > end {
        // Syntactically invalid range-spec, ignore the header
        return RangeOutcome::Full;
    }

    RangeOutcome::Partial { start, end }
}
