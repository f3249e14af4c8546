//! Boundary-aware splitting of long text into bounded chunks.

use super::TextChunk;

/// Default per-chunk character ceiling.
pub const DEFAULT_CHUNK_CHARS: usize = 5_000;

/// How far back from a window end to look for a space or newline.
const BOUNDARY_WINDOW: usize = 500;

/// A natural cut is only taken if it leaves at least this many characters in
/// the chunk; otherwise the hard window boundary wins.
const MIN_CUT_CHARS: usize = 50;

/// Split `text` into ordered chunks of at most `max_chars` characters each.
/// `max_chars` must be positive.
///
/// The text is trimmed first; an empty or whitespace-only input yields no
/// chunks. Windows that do not reach the end of the text are cut at the last
/// space or newline found within the final [`BOUNDARY_WINDOW`] characters of
/// the window, so words and sentences are not severed mid-token. Every chunk
/// is trimmed and non-empty, and chunk order follows text order.
///
/// All arithmetic is in characters, never bytes, so multi-byte input cannot
/// be split inside a code point.
pub fn split_text(text: &str, max_chars: usize) -> Vec<TextChunk> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every character, so char positions slice cheaply.
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n = offsets.len();
    let byte_at = |pos: usize| if pos < n { offsets[pos] } else { text.len() };

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < n {
        let mut end = (start + max_chars).min(n);
        if end < n {
            let window_start = start.max(end.saturating_sub(BOUNDARY_WINDOW));
            let window = &text[byte_at(window_start)..byte_at(end)];
            if let Some(pos) = window.rfind([' ', '\n']) {
                let cut = window_start + window[..pos].chars().count();
                if cut > start + MIN_CUT_CHARS {
                    end = cut;
                }
            }
        }

        let raw = &text[byte_at(start)..byte_at(end)];
        let content = raw.trim();
        if !content.is_empty() {
            let lead = raw.len() - raw.trim_start().len();
            let content_start = byte_at(start) + lead;
            chunks.push(TextChunk::new(
                chunks.len() + 1,
                content.to_string(),
                content_start..content_start + content.len(),
            ));
        }
        start = end;
    }

    chunks
}
