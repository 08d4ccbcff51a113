use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::config::ParserConfig;
use crate::inference::{Signals, default_chart_type, explicit_chart_type, infer_metric_type};
use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseError};
use crate::league::resolve_league;
use crate::metrics::extract_metrics;
use crate::normalize::normalize;
use crate::players::{PersonRecognizer, PlayerExtractor};
use crate::query::{ALL_METRICS, QueryDescriptor, collapse};
use crate::season::extract_seasons;
use crate::stat_type::classify_stat_type;
use crate::teams::extract_teams;

const DEBUG_PREFIX: &str = "prompt:";

/// Turns free-text questions into [`QueryDescriptor`]s.
///
/// Holds only read-only state, so one parser can serve many threads.
pub struct QueryParser {
    kb: Arc<KnowledgeBase>,
    config: ParserConfig,
    players: PlayerExtractor,
}

impl QueryParser {
    pub fn new(kb: Arc<KnowledgeBase>, config: ParserConfig) -> Self {
        let players = PlayerExtractor::from_config(&config);
        Self {
            kb,
            config,
            players,
        }
    }

    /// Use `recognizer` for person spans instead of the configured one.
    pub fn with_recognizer(
        kb: Arc<KnowledgeBase>,
        config: ParserConfig,
        recognizer: Option<Box<dyn PersonRecognizer>>,
    ) -> Self {
        Self {
            kb,
            config,
            players: PlayerExtractor::new(recognizer),
        }
    }

    /// Parser over the configured knowledge base (file or embedded).
    pub fn from_config(config: ParserConfig) -> Result<Self, KnowledgeBaseError> {
        let kb = match config.kb_path.as_deref() {
            Some(path) => KnowledgeBase::load(path)?,
            None => KnowledgeBase::builtin()?,
        };
        Ok(Self::new(Arc::new(kb), config))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.players.recognizer_name()
    }

    pub fn default_league(&self) -> &str {
        self.config
            .default_league
            .as_deref()
            .unwrap_or_else(|| self.kb.default_league())
    }

    pub fn parse(&self, text: &str) -> QueryDescriptor {
        let raw = strip_debug_prefix(text.trim());
        if raw.is_empty() {
            return QueryDescriptor::empty(self.default_league());
        }

        let kb = self.kb.as_ref();
        let normalized = normalize(raw);

        let teams = extract_teams(kb, &normalized, self.config.fuzzy_threshold);
        let players = self.players.extract(kb, raw, &teams);
        let league = resolve_league(kb, &normalized, &teams);
        let metrics = extract_metrics(kb, &normalized);
        let stat_type = classify_stat_type(kb, &normalized, &metrics);
        let seasons = extract_seasons(raw, &normalized, self.config.reference_season);
        let explicit_chart = explicit_chart_type(kb, &normalized);
        let metric_type = infer_metric_type(&Signals {
            text: &normalized,
            teams: &teams,
            players: &players,
            league: league.as_deref(),
        });

        let metrics = if metrics.is_empty() {
            let defaults = kb.default_metrics(stat_type);
            if defaults.is_empty() {
                vec![ALL_METRICS.to_string()]
            } else {
                defaults.to_vec()
            }
        } else {
            metrics
        };
        let chart_type =
            explicit_chart.unwrap_or_else(|| default_chart_type(metric_type, metrics.len()));

        debug!(
            stat_type = %stat_type,
            metric_type = ?metric_type,
            chart_type = %chart_type,
            "query parsed"
        );

        QueryDescriptor {
            team: collapse(teams),
            league,
            player: collapse(players),
            season: collapse(seasons),
            stat_type,
            metric: collapse(metrics),
            metric_type,
            chart_type: Some(chart_type),
        }
    }

    /// Parse many prompts in parallel; output order matches input order.
    pub fn parse_batch<S>(&self, prompts: &[S]) -> Vec<QueryDescriptor>
    where
        S: AsRef<str> + Sync,
    {
        prompts.par_iter().map(|p| self.parse(p.as_ref())).collect()
    }
}

fn strip_debug_prefix(text: &str) -> &str {
    match text.get(..DEBUG_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(DEBUG_PREFIX) => text[DEBUG_PREFIX.len()..].trim(),
        _ => text,
    }
}
