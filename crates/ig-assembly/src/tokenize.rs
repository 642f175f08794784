//! Envelope decoding — delimiter detection and segment tokenization.
//!
//! The decoder turns an opaque character buffer into a flat ordered list
//! of owned segments. It performs no schema work: structure and content
//! validation happen downstream against this list.

use tracing::{debug, warn};
use x12_types::{Finding, Segment, X12Delimiters};

/// The result of decoding a raw interchange.
#[derive(Debug, Clone)]
pub struct DecodedStream {
    pub delimiters: X12Delimiters,
    /// Segments in input order, ending at the first IEA.
    pub segments: Vec<Segment>,
    /// Decoder-level findings (currently only the delimiter fallback warning).
    pub findings: Vec<Finding>,
}

/// Decode a raw X12 interchange into a flat segment list.
///
/// Delimiters are read from the fixed ISA offsets when possible; otherwise
/// defaults apply and a warning finding is recorded. CRLF and lone CR are
/// normalized to LF, and when the segment terminator is not a newline all
/// LFs are stripped, so pretty-printed input parses identically to a
/// single-line interchange. Scanning stops after the first IEA.
pub fn decode(raw: &str) -> DecodedStream {
    let (from_isa, delimiters) = X12Delimiters::detect(raw);
    let mut findings = Vec::new();
    if !from_isa {
        warn!("could not find standard ISA segment, falling back to default delimiters");
        findings.push(Finding::new(
            "Could not find standard ISA segment. Falling back to default delimiters ('*', '~', ':').",
        ));
    }

    let mut content = raw.trim().replace("\r\n", "\n").replace('\r', "\n");
    if delimiters.segment_char() != '\n' {
        content.retain(|c| c != '\n');
    }

    let mut segments = Vec::new();
    for (idx, piece) in content.split(delimiters.segment_char()).enumerate() {
        let clean = piece.trim();
        if clean.is_empty() {
            continue;
        }
        let mut parts = clean.split(delimiters.element_char());
        let id = parts.next().unwrap_or("").to_string();
        let values: Vec<String> = parts.map(str::to_string).collect();
        let is_iea = id == "IEA";
        segments.push(Segment::new(id, values, idx + 1, clean));
        if is_iea {
            break;
        }
    }
    debug!(segments = segments.len(), "decoded segment stream");

    DecodedStream {
        delimiters,
        segments,
        findings,
    }
}

/// Index of the next segment with the given id at or after `start`.
pub fn find_segment(segments: &[Segment], segment_id: &str, start: usize) -> Option<usize> {
    segments
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, s)| s.id == segment_id)
        .map(|(i, _)| i)
}

/// Peek the implementation-guide version (GS08) out of a raw interchange
/// without a schema, for guide selection by the host.
pub fn guide_version(raw: &str) -> Option<String> {
    let (_, delimiters) = X12Delimiters::detect(raw);
    let mut content = raw.trim().replace("\r\n", "\n").replace('\r', "\n");
    if delimiters.segment_char() != '\n' {
        content.retain(|c| c != '\n');
    }
    let gs_prefix = format!("GS{}", delimiters.element_char());
    for piece in content.split(delimiters.segment_char()) {
        let clean = piece.trim();
        if clean.starts_with(&gs_prefix) {
            let parts: Vec<&str> = clean.split(delimiters.element_char()).collect();
            if parts.len() > 8 {
                return Some(parts[8].to_string());
            }
        }
    }
    None
}
