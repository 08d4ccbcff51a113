use std::fmt;

use serde::{Deserialize, Serialize};

use crate::knowledge_base::KnowledgeBase;

/// Marker stored in `metric` when no stat-type defaults are available.
pub const ALL_METRICS: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    Standard,
    Keeper,
    Shooting,
    Passing,
    Defense,
    Possession,
}

impl StatType {
    pub const ALL: [StatType; 6] = [
        StatType::Standard,
        StatType::Keeper,
        StatType::Shooting,
        StatType::Passing,
        StatType::Defense,
        StatType::Possession,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatType::Standard => "standard",
            StatType::Keeper => "keeper",
            StatType::Shooting => "shooting",
            StatType::Passing => "passing",
            StatType::Defense => "defense",
            StatType::Possession => "possession",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Team,
    Player,
    Match,
    League,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Team => "team",
            MetricType::Player => "player",
            MetricType::Match => "match",
            MetricType::League => "league",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Scatter,
    Pie,
    Table,
    Heatmap,
    Radar,
}

impl ChartType {
    pub const ALL: [ChartType; 7] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Scatter,
        ChartType::Pie,
        ChartType::Table,
        ChartType::Heatmap,
        ChartType::Radar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Pie => "pie",
            ChartType::Table => "table",
            ChartType::Heatmap => "heatmap",
            ChartType::Radar => "radar",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(StatType, MetricType, ChartType);

/// A multi-valued descriptor field: a bare string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::One(v) => vec![v.as_str()],
            FieldValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldValue::One(_) => 1,
            FieldValue::Many(vs) => vs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            FieldValue::One(v) => vec![v],
            FieldValue::Many(vs) => vs,
        }
    }
}

/// Zero values become `None`, one becomes a scalar, more stay a list.
pub fn collapse(mut values: Vec<String>) -> Option<FieldValue> {
    match values.len() {
        0 => None,
        1 => values.pop().map(FieldValue::One),
        _ => Some(FieldValue::Many(values)),
    }
}

/// Structured form of one sports question. Every key is always serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub team: Option<FieldValue>,
    pub league: Option<String>,
    pub player: Option<FieldValue>,
    pub season: Option<FieldValue>,
    pub stat_type: StatType,
    pub metric: Option<FieldValue>,
    pub metric_type: Option<MetricType>,
    pub chart_type: Option<ChartType>,
}

impl QueryDescriptor {
    /// Descriptor returned for blank input.
    pub fn empty(default_league: &str) -> Self {
        Self {
            team: None,
            league: Some(default_league.to_string()),
            player: None,
            season: None,
            stat_type: StatType::Standard,
            metric: None,
            metric_type: None,
            chart_type: None,
        }
    }

    pub fn teams(&self) -> Vec<&str> {
        field_values(&self.team)
    }

    pub fn players(&self) -> Vec<&str> {
        field_values(&self.player)
    }

    pub fn seasons(&self) -> Vec<&str> {
        field_values(&self.season)
    }

    pub fn metrics(&self) -> Vec<&str> {
        field_values(&self.metric)
    }

    /// Provider column codes for the metric phrases, skipping unknown ones.
    pub fn metric_codes<'kb>(&self, kb: &'kb KnowledgeBase) -> Vec<&'kb str> {
        let mut out: Vec<&'kb str> = Vec::new();
        for phrase in self.metrics() {
            if let Some(code) = kb.canonical_metric(phrase)
                && !out.contains(&code)
            {
                out.push(code);
            }
        }
        out
    }
}

fn field_values(field: &Option<FieldValue>) -> Vec<&str> {
    field.as_ref().map(FieldValue::values).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_law() {
        assert_eq!(collapse(Vec::new()), None);
        assert_eq!(
            collapse(vec!["Arsenal".to_string()]),
            Some(FieldValue::One("Arsenal".to_string()))
        );
        assert_eq!(
            collapse(vec!["a".to_string(), "b".to_string()]),
            Some(FieldValue::Many(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn empty_descriptor_serializes_all_keys() {
        let json = serde_json::to_value(QueryDescriptor::empty("ENG-Premier League")).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 8);
        assert_eq!(obj["league"], "ENG-Premier League");
        assert_eq!(obj["stat_type"], "standard");
        for key in ["team", "player", "season", "metric", "metric_type", "chart_type"] {
            assert!(obj[key].is_null(), "{key} should be null");
        }
    }

    #[test]
    fn field_value_untagged_roundtrip() {
        let one: FieldValue = serde_json::from_str("\"23\"").unwrap();
        assert_eq!(one, FieldValue::One("23".to_string()));
        let many: FieldValue = serde_json::from_str("[\"22\",\"23\"]").unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(serde_json::to_string(&many).unwrap(), "[\"22\",\"23\"]");
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!(StatType::parse(" Keeper "), Some(StatType::Keeper));
        assert_eq!(StatType::parse("goalkeeping"), None);
        assert_eq!(ChartType::parse("HEATMAP"), Some(ChartType::Heatmap));
        assert_eq!(MetricType::Match.to_string(), "match");
    }
}
