//! Splitting document text into service blocks.

use tracing::debug;

use super::patterns::{COMPLAINT_FIELD, SERVICE_BLOCK};

/// One candidate service block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Number from a "Service Block N" heading; `None` for implicit blocks.
    pub number: Option<u32>,
    /// Byte offset of `text` in the source document.
    pub offset: usize,
    /// Block text, starting at its heading or complaint marker.
    pub text: &'a str,
}

/// Split `text` into service blocks in source order.
///
/// Explicit "Service Block N" headings are used whenever at least one is
/// present, and every heading yields a block whatever follows it. Otherwise
/// every complaint marker opening a line (or followed by a colon) starts a
/// new block. Text before the first boundary is header material and is
/// never a block.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let explicit: Vec<(usize, Option<u32>)> = SERVICE_BLOCK
        .captures_iter(text)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps[1].parse().ok())))
        .collect();

    let boundaries: Vec<(usize, Option<u32>)> = if explicit.is_empty() {
        COMPLAINT_FIELD
            .markers(text)
            .map(|m| (m.start, None))
            .collect()
    } else {
        explicit
    };

    let segments: Vec<Segment<'_>> = boundaries
        .iter()
        .enumerate()
        .map(|(i, &(start, number))| {
            let end = boundaries.get(i + 1).map_or(text.len(), |next| next.0);
            Segment {
                number,
                offset: start,
                text: &text[start..end],
            }
        })
        .collect();

    debug!("Segmented {} service blocks", segments.len());
    segments
}
