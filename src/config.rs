use std::path::PathBuf;

use tracing::warn;

use crate::season::ReferenceSeason;
use crate::teams::DEFAULT_FUZZY_THRESHOLD;

pub const ENV_REFERENCE_SEASON: &str = "COPILOT_REFERENCE_SEASON";
pub const ENV_DEFAULT_LEAGUE: &str = "COPILOT_DEFAULT_LEAGUE";
pub const ENV_FUZZY_THRESHOLD: &str = "COPILOT_FUZZY_THRESHOLD";
pub const ENV_NER: &str = "COPILOT_NER";
pub const ENV_PLAYER_GAZETTEER: &str = "COPILOT_PLAYER_GAZETTEER";
pub const ENV_KB_PATH: &str = "COPILOT_KB_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NerMode {
    #[default]
    Gazetteer,
    Off,
}

impl NerMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gazetteer" | "on" | "1" | "true" => Some(NerMode::Gazetteer),
            "off" | "none" | "0" | "false" => Some(NerMode::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    pub reference_season: ReferenceSeason,
    /// Overrides the knowledge base's default league when set.
    pub default_league: Option<String>,
    pub fuzzy_threshold: f64,
    pub ner: NerMode,
    pub gazetteer_path: Option<PathBuf>,
    pub kb_path: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reference_season: ReferenceSeason::default(),
            default_league: None,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            ner: NerMode::default(),
            gazetteer_path: None,
            kb_path: None,
        }
    }
}

impl ParserConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset and
    /// unparseable ones fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(raw) = get(ENV_REFERENCE_SEASON) {
            match ReferenceSeason::parse(&raw) {
                Some(season) => {
                    if ReferenceSeason::parse_code(&raw).is_some_and(|code| code != season) {
                        warn!(
                            key = ENV_REFERENCE_SEASON,
                            value = %raw,
                            start_year = season.start_year,
                            "reference season read as a start year, not a season code"
                        );
                    }
                    cfg.reference_season = season;
                }
                None => warn!(key = ENV_REFERENCE_SEASON, value = %raw, "ignoring invalid reference season"),
            }
        }
        cfg.default_league = get(ENV_DEFAULT_LEAGUE).map(|v| v.trim().to_string());
        if let Some(raw) = get(ENV_FUZZY_THRESHOLD) {
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => cfg.fuzzy_threshold = v.clamp(0.0, 100.0),
                _ => warn!(key = ENV_FUZZY_THRESHOLD, value = %raw, "ignoring invalid fuzzy threshold"),
            }
        }
        if let Some(raw) = get(ENV_NER) {
            match NerMode::parse(&raw) {
                Some(mode) => cfg.ner = mode,
                None => warn!(key = ENV_NER, value = %raw, "ignoring unknown ner mode"),
            }
        }
        cfg.gazetteer_path = get(ENV_PLAYER_GAZETTEER).map(PathBuf::from);
        cfg.kb_path = get(ENV_KB_PATH).map(PathBuf::from);
        cfg
    }
}
