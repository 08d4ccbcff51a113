//! Metric-type and chart-type decisions. Each is an ordered rule list; the
//! first rule whose predicate holds decides.

use crate::knowledge_base::KnowledgeBase;
use crate::normalize::contains_word;
use crate::query::{ChartType, MetricType};

const COMPARISON_KEYWORDS: &[&str] = &["vs", "versus", "against", "compare", "comparison"];
const STANDINGS_KEYWORDS: &[&str] = &["standings", "table", "league table", "rankings"];

/// What the metric-type rules look at.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub text: &'a str,
    pub teams: &'a [String],
    pub players: &'a [String],
    pub league: Option<&'a str>,
}

type MetricTypeRule = (fn(&Signals<'_>) -> bool, Option<MetricType>);

const METRIC_TYPE_RULES: &[MetricTypeRule] = &[
    (is_head_to_head, Some(MetricType::Match)),
    (has_players, Some(MetricType::Player)),
    (has_teams, Some(MetricType::Team)),
    (is_league_wide, Some(MetricType::League)),
];

fn is_head_to_head(s: &Signals<'_>) -> bool {
    s.teams.len() >= 2 && any_word(s.text, COMPARISON_KEYWORDS)
}

fn has_players(s: &Signals<'_>) -> bool {
    !s.players.is_empty()
}

fn has_teams(s: &Signals<'_>) -> bool {
    !s.teams.is_empty()
}

fn is_league_wide(s: &Signals<'_>) -> bool {
    s.league.is_some() || any_word(s.text, STANDINGS_KEYWORDS)
}

fn any_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| contains_word(text, w))
}

pub fn infer_metric_type(signals: &Signals<'_>) -> Option<MetricType> {
    METRIC_TYPE_RULES
        .iter()
        .find(|(applies, _)| applies(signals))
        .and_then(|(_, result)| *result)
}

/// Chart requested in the text, if any.
pub fn explicit_chart_type(kb: &KnowledgeBase, text: &str) -> Option<ChartType> {
    kb.chart_patterns().first_match(text).copied()
}

/// Several metrics for teams, players or a match read best as bars.
pub fn default_chart_type(metric_type: Option<MetricType>, metric_count: usize) -> ChartType {
    let per_entity = matches!(
        metric_type,
        Some(MetricType::Team | MetricType::Player | MetricType::Match)
    );
    if per_entity && metric_count > 1 {
        ChartType::Bar
    } else {
        ChartType::Table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::fixtures::tiny;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn metric_type(text: &str, teams: &[&str], players: &[&str], league: Option<&str>) -> Option<MetricType> {
        let teams = owned(teams);
        let players = owned(players);
        infer_metric_type(&Signals {
            text,
            teams: &teams,
            players: &players,
            league,
        })
    }

    #[test]
    fn two_teams_with_comparison_is_match() {
        assert_eq!(
            metric_type("compare real madrid and barcelona", &["Real Madrid", "Barcelona"], &[], None),
            Some(MetricType::Match)
        );
        assert_eq!(
            metric_type("arsenal vs chelsea", &["Arsenal", "Chelsea"], &["Saka"], None),
            Some(MetricType::Match)
        );
    }

    #[test]
    fn two_teams_without_comparison_is_team() {
        assert_eq!(
            metric_type("arsenal and chelsea goals", &["Arsenal", "Chelsea"], &[], None),
            Some(MetricType::Team)
        );
    }

    #[test]
    fn players_beat_single_team() {
        assert_eq!(
            metric_type("saka for arsenal", &["Arsenal"], &["Saka"], None),
            Some(MetricType::Player)
        );
    }

    #[test]
    fn league_or_standings_keyword() {
        assert_eq!(
            metric_type("top scorers", &[], &[], Some("ITA-Serie A")),
            Some(MetricType::League)
        );
        assert_eq!(
            metric_type("current standings", &[], &[], None),
            Some(MetricType::League)
        );
        assert_eq!(metric_type("goals", &[], &[], None), None);
    }

    #[test]
    fn explicit_chart_uses_table_order() {
        let kb = tiny();
        assert_eq!(explicit_chart_type(&kb, "compare the trend"), Some(ChartType::Line));
        assert_eq!(explicit_chart_type(&kb, "compare them"), Some(ChartType::Bar));
        assert_eq!(explicit_chart_type(&kb, "just numbers"), None);
    }

    #[test]
    fn default_chart_depends_on_cardinality() {
        assert_eq!(default_chart_type(Some(MetricType::Team), 3), ChartType::Bar);
        assert_eq!(default_chart_type(Some(MetricType::Player), 1), ChartType::Table);
        assert_eq!(default_chart_type(Some(MetricType::League), 3), ChartType::Table);
        assert_eq!(default_chart_type(None, 5), ChartType::Table);
    }
}
