use tracing::debug;

use crate::knowledge_base::KnowledgeBase;
use crate::normalize::word_occurrences;

/// Sorted, non-overlapping half-open byte ranges already claimed by a phrase.
#[derive(Debug, Clone, Default)]
pub struct SpanSet {
    spans: Vec<(usize, usize)>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self, start: usize, end: usize) -> bool {
        // First claimed span ending after `start` is the only one that can overlap.
        let idx = self.spans.partition_point(|&(_, e)| e <= start);
        self.spans.get(idx).is_none_or(|&(s, _)| s >= end)
    }

    /// Claim `[start, end)`; returns false (and claims nothing) on overlap.
    pub fn claim(&mut self, start: usize, end: usize) -> bool {
        if start >= end || !self.is_free(start, end) {
            return false;
        }
        let idx = self.spans.partition_point(|&(s, _)| s < start);
        self.spans.insert(idx, (start, end));
        true
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Metric phrases named in normalized `text`.
///
/// Longer phrases claim their text first, so "expected goals" hides the
/// "goals" inside it. Output follows that claim order, not reading order.
pub fn extract_metrics(kb: &KnowledgeBase, text: &str) -> Vec<String> {
    let mut claimed = SpanSet::new();
    let mut out: Vec<String> = Vec::new();
    for entry in kb.metrics_longest_first() {
        let hit = word_occurrences(text, &entry.phrase)
            .into_iter()
            .find(|&(start, end)| claimed.is_free(start, end));
        if let Some((start, end)) = hit {
            claimed.claim(start, end);
            if !out.contains(&entry.phrase) {
                out.push(entry.phrase.clone());
            }
        }
    }
    if !out.is_empty() {
        debug!(metrics = ?out, "metrics resolved");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::fixtures::tiny;
    use crate::normalize::normalize;

    fn metrics(text: &str) -> Vec<String> {
        extract_metrics(&tiny(), &normalize(text))
    }

    #[test]
    fn span_set_rejects_overlap() {
        let mut set = SpanSet::new();
        assert!(set.claim(10, 20));
        assert!(set.claim(0, 10));
        assert!(set.claim(20, 25));
        assert!(!set.claim(5, 12));
        assert!(!set.claim(19, 21));
        assert!(!set.claim(12, 14));
        assert!(!set.claim(0, 30));
        assert!(set.is_free(25, 40));
        assert!(!set.claim(7, 7));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn longer_phrase_hides_contained_one() {
        assert_eq!(metrics("Arsenal's expected goals"), vec!["expected goals"]);
        assert_eq!(metrics("shots on target"), vec!["shots on target"]);
    }

    #[test]
    fn separate_occurrence_still_counts() {
        assert_eq!(
            metrics("expected goals and goals"),
            vec!["expected goals", "goals"]
        );
    }

    #[test]
    fn order_is_longest_first_not_reading_order() {
        assert_eq!(
            metrics("goals, xg and shots on target"),
            vec!["shots on target", "goals", "xg"]
        );
    }

    #[test]
    fn punctuation_suffix_phrases_match() {
        assert_eq!(metrics("possession % by club"), vec!["possession %"]);
    }

    #[test]
    fn no_metric_found() {
        assert!(metrics("how are liverpool doing").is_empty());
        assert!(metrics("goalkeepers").is_empty());
    }
}
