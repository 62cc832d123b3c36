//! `Range` header parsing and resolution.
//!
//! Parsing is purely syntactic and knows nothing about the resource. The
//! resolver then validates the request against the real content length and
//! bounds open-ended requests to a single window.
//!
//! Accepted grammar (single range only):
//! - `bytes=<start>-<end>`
//! - `bytes=<start>-`
//!
//! Suffix ranges (`bytes=-500`), multiple ranges, other units and
//! whitespace inside the value are rejected as invalid syntax.

use vidstream_common::{Error, Result};

/// Largest span served for an open-ended request such as `bytes=500-`.
pub const WINDOW_SIZE: u64 = 1024 * 1024;

const UNIT_PREFIX: &str = "bytes=";

/// A parsed but unvalidated range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    /// `None` for an open-ended request.
    pub end: Option<u64>,
}

/// An inclusive byte interval `[start, end]` validated against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range; never zero.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Outcome of resolving a request against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No range was requested; serve the whole resource.
    Full,
    /// Serve exactly this interval.
    Partial(ByteRange),
}

/// Parse a raw `Range` header value.
///
/// `None` (no header) is a valid outcome meaning "no range requested".
/// Any present but malformed value fails with [`Error::InvalidRange`].
pub fn parse_range_header(value: Option<&str>) -> Result<Option<RangeRequest>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let spec = value
        .trim()
        .strip_prefix(UNIT_PREFIX)
        .ok_or_else(|| Error::invalid_range(format!("unsupported range unit in {value:?}")))?;

    if spec.contains(',') {
        return Err(Error::invalid_range("multiple ranges are not supported"));
    }

    let (start, end) = spec
        .split_once('-')
        .ok_or_else(|| Error::invalid_range(format!("missing '-' in {value:?}")))?;

    let start = parse_offset(start)
        .ok_or_else(|| Error::invalid_range(format!("invalid range start in {value:?}")))?;

    let end = match end {
        "" => None,
        end => Some(
            parse_offset(end)
                .ok_or_else(|| Error::invalid_range(format!("invalid range end in {value:?}")))?,
        ),
    };

    Ok(Some(RangeRequest { start, end }))
}

/// Digits only: `u64::from_str` would also accept a leading `+`.
fn parse_offset(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Validate and clamp a request against the resource's total length.
///
/// - no request resolves to [`Resolution::Full`]
/// - `start` must be below `total_length`, otherwise the range is not
///   satisfiable (a `start` equal to the length is rejected, not clamped)
/// - an explicit `end` is clamped to the last byte
/// - an open-ended request is bounded to [`WINDOW_SIZE`] bytes
pub fn resolve(request: Option<RangeRequest>, total_length: u64) -> Result<Resolution> {
    let Some(request) = request else {
        return Ok(Resolution::Full);
    };

    if request.start >= total_length {
        return Err(Error::range_not_satisfiable(total_length));
    }

    let last_byte = total_length - 1;
    let end = match request.end {
        Some(end) => end.min(last_byte),
        None => request
            .start
            .saturating_add(WINDOW_SIZE - 1)
            .min(last_byte),
    };

    if end < request.start {
        return Err(Error::range_not_satisfiable(total_length));
    }

    Ok(Resolution::Partial(ByteRange {
        start: request.start,
        end,
    }))
}
