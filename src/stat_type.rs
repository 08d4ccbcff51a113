use crate::knowledge_base::KnowledgeBase;
use crate::query::StatType;

/// Stat category: an explicit keyword first, then hints from the metrics,
/// else `standard`.
pub fn classify_stat_type(kb: &KnowledgeBase, text: &str, metrics: &[String]) -> StatType {
    if let Some(stat) = kb.stat_type_patterns().first_match(text) {
        return *stat;
    }
    stat_type_from_metrics(kb, metrics).unwrap_or(StatType::Standard)
}

/// First hint found as a substring of the joined metric phrases.
pub fn stat_type_from_metrics(kb: &KnowledgeBase, metrics: &[String]) -> Option<StatType> {
    if metrics.is_empty() {
        return None;
    }
    let blob = metrics.join(" ").to_lowercase();
    kb.metric_hints()
        .iter()
        .find(|(hint, _)| blob.contains(hint.as_str()))
        .map(|(_, stat)| *stat)
}
