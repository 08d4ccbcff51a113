use once_cell::sync::Lazy;
use regex::Regex;

static VERSUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:vs|v)\.?(?:\s|$)").expect("valid versus regex"));

/// Lowercase, spell out `&`, unify `v`/`v.`/`vs.` to `vs` and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace('&', " and ");
    let unified = VERSUS.replace_all(&lowered, "vs ");
    unified.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into bare tokens for window matching.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            let token = trim_punctuation(raw);
            trim_punctuation(strip_possessive(token)).to_string()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn strip_possessive(token: &str) -> &str {
    token
        .strip_suffix("'s")
        .or_else(|| token.strip_suffix("’s"))
        .or_else(|| token.strip_suffix("'S"))
        .unwrap_or(token)
}

pub fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Byte spans of every occurrence of `needle` that sits on word boundaries.
///
/// A boundary is a text edge or any non-alphanumeric character, so needles
/// ending in punctuation (`"possession %"`) still match.
pub fn word_occurrences(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    haystack
        .match_indices(needle)
        .filter(|(start, m)| {
            let end = start + m.len();
            boundary_before(haystack, *start) && boundary_after(haystack, end)
        })
        .map(|(start, m)| (start, start + m.len()))
        .collect()
}

pub fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    word_occurrences(haystack, needle)
        .first()
        .map(|(start, _)| *start)
}

pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle).is_some()
}

fn boundary_before(haystack: &str, start: usize) -> bool {
    haystack[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric())
}

fn boundary_after(haystack: &str, end: usize) -> bool {
    haystack[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric())
}

/// Similarity on a 0-100 scale (normalized Damerau-Levenshtein, case-insensitive).
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_damerau_levenshtein(&a.to_lowercase(), &b.to_lowercase()) * 100.0
}

/// Upper bound of [`similarity`] given only the two lengths (in chars).
pub fn similarity_ceiling(a_len: usize, b_len: usize) -> f64 {
    let longest = a_len.max(b_len);
    if longest == 0 {
        return 100.0;
    }
    let diff = a_len.abs_diff(b_len);
    (1.0 - diff as f64 / longest as f64) * 100.0
}
