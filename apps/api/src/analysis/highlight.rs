use aho_corasick::{AhoCorasickBuilder, MatchKind};
use tracing::warn;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Wraps whole-word, ASCII-case-insensitive keyword occurrences in `<mark>` tags.
/// Everything outside the tags is HTML-escaped. Longest keyword wins on overlap.
pub fn highlight_keywords(text: &str, keywords: &[String]) -> String {
    let mut patterns: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    patterns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    patterns.dedup();

    if patterns.is_empty() {
        return escape_html(text);
    }

    let automaton = match AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::Standard)
        .build(&patterns)
    {
        Ok(ac) => ac,
        Err(e) => {
            warn!("Keyword automaton build failed; returning text unhighlighted ({e})");
            return escape_html(text);
        }
    };

    // Overlapping search so a shorter keyword still counts when a longer one
    // starting at the same place is not a whole word.
    let mut spans: Vec<(usize, usize)> = automaton
        .find_overlapping_iter(text)
        .map(|m| (m.start(), m.end()))
        .filter(|&(start, end)| is_whole_word(text, start, end))
        .collect();
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut last = 0;
    for (start, end) in spans {
        if start < last {
            continue;
        }
        out.push_str(&escape_html(&text[last..start]));
        out.push_str(MARK_OPEN);
        out.push_str(&escape_html(&text[start..end]));
        out.push_str(MARK_CLOSE);
        last = end;
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
