//! Read-only reference data the parser matches against: the team registry,
//! the metric lexicon, the ordered pattern tables and the default metrics.
//!
//! The data ships embedded (`data/knowledge_base.json`) and can be replaced
//! with a file of the same shape.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::{contains_word, normalize, similarity, similarity_ceiling, tokenize};
use crate::query::{ChartType, StatType};

const BUILTIN_KB: &str = include_str!("../data/knowledge_base.json");

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid reference data json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown stat type `{0}` in default metrics")]
    UnknownStatType(String),
    #[error("team registry is empty")]
    NoTeams,
    #[error("player gazetteer is empty")]
    EmptyGazetteer,
}

/// One row of an ordered keyword table; earlier rows win.
#[derive(Debug, Clone, Deserialize)]
pub struct Pattern<T> {
    pub label: T,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PatternTable<T> {
    rows: Vec<Pattern<T>>,
}

impl<T> PatternTable<T> {
    /// Label of the first row with a keyword present in `text` (normalized).
    pub fn first_match(&self, text: &str) -> Option<&T> {
        self.rows
            .iter()
            .find(|row| row.keywords.iter().any(|k| contains_word(text, k)))
            .map(|row| &row.label)
    }

    fn normalized(mut self) -> Self {
        for row in &mut self.rows {
            row.keywords = row
                .keywords
                .iter()
                .map(|k| normalize(k))
                .filter(|k| !k.is_empty())
                .collect();
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseFile {
    default_league: String,
    combined_league: String,
    #[serde(default)]
    leagues: Vec<String>,
    teams: Vec<TeamRecord>,
    metrics: Vec<(String, String)>,
    league_patterns: PatternTable<String>,
    stat_type_patterns: PatternTable<StatType>,
    chart_patterns: PatternTable<ChartType>,
    #[serde(default)]
    metric_hints: Vec<(String, StatType)>,
    default_metrics: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TeamRecord {
    name: String,
    #[serde(default)]
    league: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub league: Option<String>,
    pub aliases: Vec<String>,
    /// Normalized name used for matching.
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub phrase: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    default_league: String,
    combined_league: String,
    leagues: Vec<String>,
    teams: Vec<Team>,
    // normalized alias -> team index, in registry order
    aliases: Vec<(String, usize)>,
    names: HashMap<String, usize>,
    metrics: Vec<MetricEntry>,
    metrics_longest_first: Vec<usize>,
    league_patterns: PatternTable<String>,
    stat_type_patterns: PatternTable<StatType>,
    chart_patterns: PatternTable<ChartType>,
    metric_hints: Vec<(String, StatType)>,
    default_metrics: HashMap<StatType, Vec<String>>,
}

impl KnowledgeBase {
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Self::from_json(BUILTIN_KB)
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let raw = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeBaseError> {
        let file: KnowledgeBaseFile = serde_json::from_str(raw)?;
        Self::from_file(file)
    }

    fn from_file(file: KnowledgeBaseFile) -> Result<Self, KnowledgeBaseError> {
        if file.teams.is_empty() {
            return Err(KnowledgeBaseError::NoTeams);
        }

        let mut teams: Vec<Team> = Vec::new();
        let mut names: HashMap<String, usize> = HashMap::new();
        let mut aliases: Vec<(String, usize)> = Vec::new();
        for record in file.teams {
            let key = normalize(&record.name);
            if key.is_empty() || names.contains_key(&key) {
                continue;
            }
            let idx = teams.len();
            names.insert(key.clone(), idx);
            for alias in &record.aliases {
                let alias_key = normalize(alias);
                if !alias_key.is_empty() && alias_key != key {
                    aliases.push((alias_key, idx));
                }
            }
            teams.push(Team {
                name: record.name,
                league: record.league.filter(|l| !l.trim().is_empty()),
                aliases: record.aliases,
                key,
            });
        }

        let metrics: Vec<MetricEntry> = file
            .metrics
            .into_iter()
            .map(|(phrase, code)| MetricEntry {
                phrase: normalize(&phrase),
                code,
            })
            .filter(|m| !m.phrase.is_empty())
            .collect();
        let mut metrics_longest_first: Vec<usize> = (0..metrics.len()).collect();
        // Stable: equal lengths keep table order.
        metrics_longest_first.sort_by_key(|&i| std::cmp::Reverse(metrics[i].phrase.chars().count()));

        let mut default_metrics = HashMap::new();
        for (raw_stat, list) in file.default_metrics {
            let stat = StatType::parse(&raw_stat)
                .ok_or_else(|| KnowledgeBaseError::UnknownStatType(raw_stat.clone()))?;
            default_metrics.insert(stat, list);
        }

        Ok(Self {
            default_league: file.default_league,
            combined_league: file.combined_league,
            leagues: file.leagues,
            teams,
            aliases,
            names,
            metrics,
            metrics_longest_first,
            league_patterns: file.league_patterns.normalized(),
            stat_type_patterns: file.stat_type_patterns.normalized(),
            chart_patterns: file.chart_patterns.normalized(),
            metric_hints: file
                .metric_hints
                .into_iter()
                .map(|(hint, stat)| (normalize(&hint), stat))
                .filter(|(hint, _)| !hint.is_empty())
                .collect(),
            default_metrics,
        })
    }

    pub fn default_league(&self) -> &str {
        &self.default_league
    }

    pub fn combined_league(&self) -> &str {
        &self.combined_league
    }

    /// Listed league matching `name` regardless of case and spacing. A
    /// knowledge base without a league list accepts any non-blank name.
    pub fn canonical_league<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if self.leagues.is_empty() {
            return Some(name);
        }
        let key = normalize(name);
        self.leagues
            .iter()
            .find(|league| normalize(league) == key)
            .map(String::as_str)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, idx: usize) -> Option<&Team> {
        self.teams.get(idx)
    }

    /// `(normalized alias, team index)` pairs in registry order.
    pub fn aliases(&self) -> &[(String, usize)] {
        &self.aliases
    }

    /// Team index for a canonical name or alias, ignoring case and spacing.
    pub fn resolve_team(&self, name: &str) -> Option<usize> {
        let key = normalize(name);
        if let Some(idx) = self.names.get(&key) {
            return Some(*idx);
        }
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, idx)| *idx)
    }

    pub fn is_team_or_alias(&self, name: &str) -> bool {
        self.resolve_team(name).is_some()
    }

    pub fn lookup_team_league(&self, name: &str) -> Option<&str> {
        let idx = self.resolve_team(name)?;
        self.teams[idx].league.as_deref()
    }

    /// Lowercased tokens of a team's canonical name.
    pub fn team_tokens(&self, name: &str) -> Vec<String> {
        match self.resolve_team(name) {
            Some(idx) => tokenize(&self.teams[idx].key),
            None => tokenize(&normalize(name)),
        }
    }

    /// Best fuzzy match of `candidate` over canonical team names as
    /// `(team index, score)`. Ties keep the earlier registry entry.
    pub fn best_team_match(&self, candidate: &str) -> Option<(usize, f64)> {
        let candidate = normalize(candidate);
        if candidate.is_empty() {
            return None;
        }
        let cand_len = candidate.chars().count();
        let mut best: Option<(usize, f64)> = None;
        for (idx, team) in self.teams.iter().enumerate() {
            let ceiling = similarity_ceiling(cand_len, team.key.chars().count());
            if best.is_some_and(|(_, score)| ceiling <= score) {
                continue;
            }
            let score = similarity(&candidate, &team.key);
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((idx, score));
            }
        }
        best
    }

    /// Canonical team for free-form input: exact name or alias first, then
    /// the best fuzzy match scoring at least `threshold` (0-100).
    pub fn closest_team(&self, name: &str, threshold: f64) -> Option<&str> {
        if let Some(idx) = self.resolve_team(name) {
            return Some(&self.teams[idx].name);
        }
        let (idx, score) = self.best_team_match(name)?;
        (score >= threshold).then(|| self.teams[idx].name.as_str())
    }

    /// Lexicon entries ordered longest phrase first, ties in table order.
    pub fn metrics_longest_first(&self) -> impl Iterator<Item = &MetricEntry> {
        self.metrics_longest_first.iter().map(|&i| &self.metrics[i])
    }

    pub fn canonical_metric(&self, phrase: &str) -> Option<&str> {
        let key = normalize(phrase);
        self.metrics
            .iter()
            .find(|m| m.phrase == key)
            .map(|m| m.code.as_str())
    }

    pub fn default_metrics(&self, stat_type: StatType) -> &[String] {
        self.default_metrics
            .get(&stat_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn league_patterns(&self) -> &PatternTable<String> {
        &self.league_patterns
    }

    pub fn stat_type_patterns(&self) -> &PatternTable<StatType> {
        &self.stat_type_patterns
    }

    pub fn chart_patterns(&self) -> &PatternTable<ChartType> {
        &self.chart_patterns
    }

    pub fn metric_hints(&self) -> &[(String, StatType)] {
        &self.metric_hints
    }
}
