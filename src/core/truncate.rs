// LogPeek - core/truncate.rs
//
// Splits a record message into a bounded visible part and an overflow part.
// Lengths are counted in characters so multi-byte text is never split.

/// Split `text` at `limit` characters.
///
/// The character at index `limit` belongs to neither half: `message` is
/// `text[..limit]` and `overflow` is `text[limit + 1..]`. An empty overflow
/// half is returned as `None`.
pub fn truncate(text: &str, limit: usize) -> (String, Option<String>) {
    let mut boundaries = text.char_indices().map(|(idx, _)| idx);

    let Some(cut) = boundaries.nth(limit) else {
        return (text.to_string(), None);
    };
    let resume = boundaries.next().unwrap_or(text.len());

    let message = text[..cut].to_string();
    let overflow = &text[resume..];
    let overflow = (!overflow.is_empty()).then(|| overflow.to_string());
    (message, overflow)
}
