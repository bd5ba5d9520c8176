//! Fragment windows over analyzed content.
//!
//! A window is a contiguous slice of the content that starts and ends on
//! token boundaries and spans at most `length` characters. Windows are
//! anchored on hits, carry a little leading context, and are scored by the
//! distinct terms they contain.

use crate::analyzer::AnalyzedToken;

/// A token of the content that some query term matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Index into the content's token list.
    pub token: usize,
    /// Term weight; zero-weight hits anchor windows but are never marked.
    pub weight: f32,
}

/// A selected window, as byte offsets into the content.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Sum of the weights of the distinct terms inside.
    pub score: f32,
}

impl Window {
    /// Whether two windows share any byte.
    fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Character count of `text[from..to]`.
fn char_len(text: &str, from: usize, to: usize) -> usize {
    text.get(from..to).map_or(0, |s| s.chars().count())
}

/// Picks up to `max` best non-overlapping windows.
///
/// `hits` must be ordered by token index. The result is ordered by score,
/// highest first, then by position.
pub fn select(
    text: &str,
    tokens: &[AnalyzedToken],
    hits: &[Hit],
    max: usize,
    length: usize,
) -> Vec<Window> {
    if max == 0 || length == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Window> = hits
        .iter()
        .filter_map(|hit| anchored(text, tokens, hit.token, length))
        .map(|(start, end)| Window {
            start,
            end,
            score: score(tokens, hits, start, end),
        })
        .collect();
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.start.cmp(&b.start)));

    let mut selected: Vec<Window> = Vec::new();
    for candidate in candidates {
        if selected.len() == max {
            break;
        }
        if selected.iter().all(|w| !w.overlaps(&candidate)) {
            selected.push(candidate);
        }
    }
    selected
}

/// Byte range of the window anchored on token `anchor`.
///
/// Returns `None` when the anchor token alone is longer than `length`.
fn anchored(
    text: &str,
    tokens: &[AnalyzedToken],
    anchor: usize,
    length: usize,
) -> Option<(usize, usize)> {
    let hit = tokens.get(anchor)?;
    let hit_len = char_len(text, hit.offset_from, hit.offset_to);
    if hit_len > length {
        return None;
    }

    let lead = (length / 4).min(length - hit_len);
    let mut start = hit.offset_from;
    for token in tokens[..anchor].iter().rev() {
        if char_len(text, token.offset_from, hit.offset_from) > lead {
            break;
        }
        start = token.offset_from;
    }

    let mut end = hit.offset_to;
    for token in &tokens[anchor + 1..] {
        if char_len(text, start, token.offset_to) > length {
            break;
        }
        end = token.offset_to;
    }
    Some((start, end))
}

/// Hits whose tokens lie inside `start..end`.
fn hits_within<'h>(
    tokens: &[AnalyzedToken],
    hits: &'h [Hit],
    start: usize,
    end: usize,
) -> &'h [Hit] {
    let first = hits.partition_point(|h| tokens[h.token].offset_from < start);
    let last = hits.partition_point(|h| tokens[h.token].offset_to <= end);
    hits.get(first..last.max(first)).unwrap_or_default()
}

/// Sums the weight of each distinct term once.
fn score(tokens: &[AnalyzedToken], hits: &[Hit], start: usize, end: usize) -> f32 {
    let mut seen: Vec<&str> = Vec::new();
    let mut total = 0.0;
    for hit in hits_within(tokens, hits, start, end) {
        let term = tokens[hit.token].text.as_str();
        if !seen.contains(&term) {
            seen.push(term);
            total += hit.weight;
        }
    }
    total
}

/// Copies the window out of `text`, wrapping weighted hits in markers.
pub fn render(
    text: &str,
    tokens: &[AnalyzedToken],
    hits: &[Hit],
    window: &Window,
    pre_tag: &str,
    post_tag: &str,
) -> String {
    let mut out = String::with_capacity(window.end - window.start + 16);
    let mut cursor = window.start;
    for hit in hits_within(tokens, hits, window.start, window.end) {
        if hit.weight <= 0.0 {
            continue;
        }
        let token = &tokens[hit.token];
        out.push_str(&text[cursor..token.offset_from]);
        out.push_str(pre_tag);
        out.push_str(&text[token.offset_from..token.offset_to]);
        out.push_str(post_tag);
        cursor = token.offset_to;
    }
    out.push_str(&text[cursor..window.end]);
    out
}
