//! Person mentions in the raw (case-preserving) query text.
//!
//! Recognition sits behind [`PersonRecognizer`]. The gazetteer tagger is the
//! primary capability; the regex heuristics cover queries it cannot read and
//! stand in for it entirely when it could not be initialized.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{NerMode, ParserConfig};
use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseError};
use crate::normalize::{strip_possessive, tokenize, trim_punctuation};

const BUILTIN_GAZETTEER: &str = include_str!("../data/players.json");

const LEADING_STOPWORDS: &[&str] = &[
    "compare", "show", "me", "display", "plot", "chart", "graph", "visualize", "visualise",
    "give", "get", "list", "find", "tell", "what", "what's", "how", "who", "which", "top", "best",
    "and", "vs", "versus", "between", "for", "of", "the", "is", "are", "was", "were", "did",
    "does", "please",
];

const TRAILING_STOPWORDS: &[&str] = &[
    "stats", "stat", "statistics", "goals", "goal", "assists", "xg", "xa", "passes", "passing",
    "shooting", "shots", "tackles", "defense", "defence", "possession", "performance", "numbers",
    "data", "record", "season", "seasons", "minutes", "saves", "rating", "and", "vs", "versus",
];

// Capitalized filler that ends a name run ("Salah And Haaland", "Goals This Season").
const RUN_BREAKERS: &[&str] = &[
    "this", "that", "last", "past", "next", "in", "at", "on", "with", "against", "by", "from",
    "to", "or", "league", "cup",
];

const NAME_PARTICLES: &[&str] = &["de", "van", "von", "der", "den", "di", "da", "dos", "del", "le"];

const NAME: &str = r"\p{Lu}[\w'’\-\.]*(?:\s+\p{Lu}[\w'’\-\.]*)*";

static COMPARE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i:compare)\s+({NAME})\s+(?i:and|&|vs\.?|versus|with)\s+({NAME})"
    ))
    .expect("valid compare regex")
});

static POSSESSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\p{Lu}[\w\-\.]*(?:\s+\p{Lu}[\w\-\.]*)*)['’]s\b").expect("valid possessive regex")
});

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’\-\.]*").expect("valid word regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl PersonSpan {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            text: text[start..end].to_string(),
        }
    }
}

pub trait PersonRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Spans of `text` tagged as people, in reading order.
    fn extract_person_spans(&self, text: &str) -> Vec<PersonSpan>;
}

/// Tags runs of capitalized words as a person when one of the words is a
/// known player name token.
#[derive(Debug, Clone)]
pub struct GazetteerRecognizer {
    tokens: HashSet<String>,
}

impl GazetteerRecognizer {
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Self::from_json(BUILTIN_GAZETTEER)
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let raw = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeBaseError> {
        let names: Vec<String> = serde_json::from_str(raw)?;
        Self::from_names(names)
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, KnowledgeBaseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: HashSet<String> = names
            .into_iter()
            .flat_map(|name| tokenize(&name.as_ref().to_lowercase()))
            .filter(|t| t.chars().count() >= 3 && !NAME_PARTICLES.contains(&t.as_str()))
            .collect();
        if tokens.is_empty() {
            return Err(KnowledgeBaseError::EmptyGazetteer);
        }
        Ok(Self { tokens })
    }

    fn is_known(&self, word: &str) -> bool {
        let key = trim_punctuation(strip_possessive(word)).to_lowercase();
        self.tokens.contains(&key)
    }
}

impl PersonRecognizer for GazetteerRecognizer {
    fn name(&self) -> &'static str {
        "gazetteer"
    }

    fn extract_person_spans(&self, text: &str) -> Vec<PersonSpan> {
        let words: Vec<(usize, usize)> = WORD
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();
        let is_cap = |i: usize| {
            let word = &text[words[i].0..words[i].1];
            word.chars().next().is_some_and(char::is_uppercase) && !breaks_name_run(word)
        };
        let joined_by_space =
            |i: usize| text[words[i - 1].1..words[i].0].chars().all(char::is_whitespace);

        let mut spans = Vec::new();
        let mut i = 0;
        while i < words.len() {
            if !is_cap(i) {
                i += 1;
                continue;
            }
            let first = i;
            let mut last = i;
            let mut j = i + 1;
            while j < words.len() && joined_by_space(j) {
                if is_cap(j) {
                    last = j;
                    j += 1;
                    continue;
                }
                let word = text[words[j].0..words[j].1].to_lowercase();
                let particle_bridge = NAME_PARTICLES.contains(&word.as_str())
                    && j + 1 < words.len()
                    && joined_by_space(j + 1)
                    && is_cap(j + 1);
                if !particle_bridge {
                    break;
                }
                j += 1;
            }
            let known = (first..=last).any(|k| self.is_known(&text[words[k].0..words[k].1]));
            if known {
                spans.push(PersonSpan::new(text, words[first].0, words[last].1));
            }
            i = last + 1;
        }
        spans
    }
}

/// "compare X and Y" and "X's" over capitalized name spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRecognizer;

impl PersonRecognizer for HeuristicRecognizer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn extract_person_spans(&self, text: &str) -> Vec<PersonSpan> {
        let mut spans = Vec::new();
        for caps in COMPARE_PAIR.captures_iter(text) {
            for group in [caps.get(1), caps.get(2)].into_iter().flatten() {
                spans.push(PersonSpan::new(text, group.start(), group.end()));
            }
        }
        for caps in POSSESSIVE.captures_iter(text) {
            if let Some(group) = caps.get(1) {
                spans.push(PersonSpan::new(text, group.start(), group.end()));
            }
        }
        spans.sort_by_key(|s| (s.start, s.end));
        spans
    }
}

pub struct PlayerExtractor {
    recognizer: Option<Box<dyn PersonRecognizer>>,
    fallback: HeuristicRecognizer,
}

impl PlayerExtractor {
    pub fn new(recognizer: Option<Box<dyn PersonRecognizer>>) -> Self {
        Self {
            recognizer,
            fallback: HeuristicRecognizer,
        }
    }

    /// Build the recognizer selected by `config`. A gazetteer that fails to
    /// load leaves the extractor on the heuristic path.
    pub fn from_config(config: &ParserConfig) -> Self {
        let recognizer = match config.ner {
            NerMode::Off => None,
            NerMode::Gazetteer => {
                let loaded = match config.gazetteer_path.as_deref() {
                    Some(path) => GazetteerRecognizer::load(path),
                    None => GazetteerRecognizer::builtin(),
                };
                match loaded {
                    Ok(g) => Some(Box::new(g) as Box<dyn PersonRecognizer>),
                    Err(err) => {
                        warn!(error = %err, "person recognizer unavailable, using heuristics");
                        None
                    }
                }
            }
        };
        Self::new(recognizer)
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer
            .as_deref()
            .map_or(self.fallback.name(), |r| r.name())
    }

    /// Player names in `raw` text, excluding anything naming a team.
    pub fn extract(&self, kb: &KnowledgeBase, raw: &str, teams: &[String]) -> Vec<String> {
        let spans = match self.recognizer.as_deref() {
            Some(recognizer) => {
                let spans = recognizer.extract_person_spans(raw);
                if spans.is_empty() && teams.is_empty() {
                    self.fallback.extract_person_spans(raw)
                } else {
                    spans
                }
            }
            None => self.fallback.extract_person_spans(raw),
        };

        let team_tokens: Vec<HashSet<String>> = teams
            .iter()
            .map(|t| kb.team_tokens(t).into_iter().collect())
            .collect();

        let team_words: HashSet<String> = team_tokens.iter().flatten().cloned().collect();

        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        for span in spans {
            for part in split_on_team_words(&span.text, &team_words) {
                let Some(candidate) = trim_candidate(&part) else {
                    continue;
                };
                if names_team(kb, &team_tokens, &candidate) {
                    continue;
                }
                if seen.insert(candidate.to_lowercase()) {
                    out.push(candidate);
                }
            }
        }
        if !out.is_empty() {
            debug!(players = ?out, recognizer = self.recognizer_name(), "players resolved");
        }
        out
    }
}

/// Drop query verbs in front and stat nouns (and a possessive) behind.
fn trim_candidate(span: &str) -> Option<String> {
    let mut tokens: Vec<&str> = span.split_whitespace().collect();
    loop {
        let Some(first) = tokens.first() else { break };
        if is_stopword(LEADING_STOPWORDS, first) {
            tokens.remove(0);
        } else {
            break;
        }
    }
    loop {
        let Some(last) = tokens.last_mut() else { break };
        *last = strip_possessive(*last);
        if is_stopword(TRAILING_STOPWORDS, *last) {
            tokens.pop();
        } else {
            break;
        }
    }
    let tokens: Vec<&str> = tokens
        .into_iter()
        .map(trim_punctuation)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(" "))
}

fn breaks_name_run(word: &str) -> bool {
    [LEADING_STOPWORDS, TRAILING_STOPWORDS, RUN_BREAKERS]
        .iter()
        .any(|list| is_stopword(list, strip_possessive(word)))
}

/// Pieces of `span` left after removing words of an already detected team.
fn split_on_team_words(span: &str, team_words: &HashSet<String>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in span.split_whitespace() {
        let key = trim_punctuation(strip_possessive(trim_punctuation(word))).to_lowercase();
        if team_words.contains(&key) {
            if !current.is_empty() {
                parts.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        parts.push(current.join(" "));
    }
    parts
}

fn is_stopword(list: &[&str], token: &str) -> bool {
    let key = trim_punctuation(token).to_lowercase();
    list.contains(&key.as_str())
}

fn names_team(kb: &KnowledgeBase, team_tokens: &[HashSet<String>], candidate: &str) -> bool {
    let tokens: HashSet<String> = tokenize(&candidate.to_lowercase()).into_iter().collect();
    if team_tokens.iter().any(|team| tokens.is_subset(team)) {
        return true;
    }
    kb.is_team_or_alias(candidate)
}
