use std::collections::HashSet;

use tracing::debug;

use crate::knowledge_base::KnowledgeBase;
use crate::normalize::{find_word, tokenize};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 92.0;
const MAX_WINDOW_TOKENS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HitSource {
    Alias,
    Exact,
}

/// Canonical teams mentioned in normalized `text`, deduplicated.
///
/// Alias and exact-name hits come first, ordered by where they appear;
/// fuzzy window hits follow in window order.
pub fn extract_teams(kb: &KnowledgeBase, text: &str, fuzzy_threshold: f64) -> Vec<String> {
    let mut lexical: Vec<(usize, HitSource, usize)> = Vec::new();

    for (alias, idx) in kb.aliases() {
        if let Some(pos) = find_word(text, alias) {
            lexical.push((pos, HitSource::Alias, *idx));
        }
    }
    for (idx, team) in kb.teams().iter().enumerate() {
        if let Some(pos) = find_word(text, &team.key) {
            lexical.push((pos, HitSource::Exact, idx));
        }
    }
    // Stable sort keeps registry order for hits at the same position.
    lexical.sort_by_key(|(pos, source, _)| (*pos, *source == HitSource::Exact));

    let fuzzy = fuzzy_hits(kb, text, fuzzy_threshold);

    let mut seen: HashSet<usize> = HashSet::new();
    let mut out = Vec::new();
    for idx in lexical.into_iter().map(|(_, _, idx)| idx).chain(fuzzy) {
        if seen.insert(idx)
            && let Some(team) = kb.team(idx)
        {
            out.push(team.name.clone());
        }
    }
    if !out.is_empty() {
        debug!(teams = ?out, "teams resolved");
    }
    out
}

/// Team indices whose name scores at least `threshold` against some window
/// of 1-4 consecutive tokens, in window order.
fn fuzzy_hits(kb: &KnowledgeBase, text: &str, threshold: f64) -> Vec<usize> {
    let tokens = tokenize(text);
    let mut out = Vec::new();
    for start in 0..tokens.len() {
        for len in 1..=MAX_WINDOW_TOKENS {
            let Some(window) = tokens.get(start..start + len) else {
                break;
            };
            let candidate = window.join(" ");
            if let Some((idx, score)) = kb.best_team_match(&candidate)
                && score >= threshold
            {
                out.push(idx);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::fixtures::tiny;
    use crate::normalize::normalize;

    fn teams(text: &str) -> Vec<String> {
        extract_teams(&tiny(), &normalize(text), DEFAULT_FUZZY_THRESHOLD)
    }

    #[test]
    fn exact_and_alias_follow_reading_order() {
        assert_eq!(
            teams("Compare Real Madrid and Barcelona goals"),
            vec!["Real Madrid", "Barcelona"]
        );
        assert_eq!(
            teams("liverpool vs man city"),
            vec!["Liverpool", "Manchester City"]
        );
        assert_eq!(teams("barca against the gunners"), vec!["Barcelona", "Arsenal"]);
    }

    #[test]
    fn alias_and_name_of_same_team_dedup() {
        assert_eq!(teams("Arsenal, the Gunners, Arsenal's xG"), vec!["Arsenal"]);
    }

    #[test]
    fn fuzzy_accepts_near_misses_on_long_names() {
        assert_eq!(teams("manchester citi shots"), vec!["Manchester City"]);
        assert_eq!(teams("borussia dortmnud form"), vec!["Borussia Dortmund"]);
    }

    #[test]
    fn fuzzy_rejects_short_words() {
        assert!(teams("liverpol shots").is_empty());
        assert!(teams("show me the goals").is_empty());
    }

    #[test]
    fn fuzzy_hits_follow_lexical_ones() {
        assert_eq!(
            teams("manchester citi and arsenal"),
            vec!["Arsenal", "Manchester City"]
        );
    }

    #[test]
    fn word_boundaries_are_required() {
        assert!(teams("arsenalfc liverpools").is_empty());
    }

    #[test]
    fn empty_text_has_no_teams() {
        assert!(teams("").is_empty());
    }
}
