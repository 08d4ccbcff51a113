//! Descriptors built from the structured query form, where every field was
//! picked explicitly instead of being parsed out of free text.

use std::ops::RangeInclusive;

use serde::Deserialize;
use tracing::debug;

use crate::knowledge_base::KnowledgeBase;
use crate::query::{ALL_METRICS, ChartType, FieldValue, MetricType, QueryDescriptor, StatType, collapse};
use crate::season::season_code_for_start;
use crate::stat_type::stat_type_from_metrics;

/// Form input is looser than free text, so team snapping accepts more.
pub const FORM_TEAM_THRESHOLD: f64 = 80.0;
/// Same span the free-text year patterns accept.
const FORM_YEARS: RangeInclusive<i32> = 1900..=2099;
const MAX_FORM_SEASONS: i32 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvancedForm {
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub year_mode: Option<String>,
    #[serde(default)]
    pub year_single: Option<i32>,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
    /// Comma-separated player names.
    #[serde(default)]
    pub players: Option<String>,
    #[serde(default)]
    pub teams: Option<FieldValue>,
    #[serde(default)]
    pub stats: Option<FieldValue>,
    #[serde(default)]
    pub viz_type: Option<String>,
}

pub fn build_from_form(kb: &KnowledgeBase, form: &AdvancedForm) -> QueryDescriptor {
    let league = form_league(kb, form.league.as_deref()).to_string();

    let players = split_players(form.players.as_deref());
    let teams = snap_teams(kb, form.teams.as_ref());

    let mut metrics: Vec<String> = form
        .stats
        .clone()
        .map(FieldValue::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|m| !m.trim().is_empty())
        .collect();
    let stat_type = stat_type_from_metrics(kb, &metrics).unwrap_or(StatType::Standard);
    if metrics.is_empty() {
        metrics = kb.default_metrics(stat_type).to_vec();
        if metrics.is_empty() {
            metrics.push(ALL_METRICS.to_string());
        }
    }

    let metric_type = if !players.is_empty() {
        MetricType::Player
    } else if !teams.is_empty() {
        MetricType::Team
    } else {
        MetricType::League
    };

    let chart_type = form
        .viz_type
        .as_deref()
        .and_then(ChartType::parse)
        .unwrap_or(ChartType::Table);

    QueryDescriptor {
        team: collapse(teams),
        league: Some(league),
        player: collapse(players),
        season: collapse(form_seasons(form)),
        stat_type,
        metric: collapse(metrics),
        metric_type: Some(metric_type),
        chart_type: Some(chart_type),
    }
}

fn form_league<'a>(kb: &'a KnowledgeBase, raw: Option<&'a str>) -> &'a str {
    let Some(raw) = raw.filter(|l| !l.trim().is_empty()) else {
        return kb.default_league();
    };
    kb.canonical_league(raw).unwrap_or_else(|| {
        debug!(league = %raw, "unknown form league, using default");
        kb.default_league()
    })
}

fn split_players(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn snap_teams(kb: &KnowledgeBase, raw: Option<&FieldValue>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for team in raw.map(FieldValue::values).unwrap_or_default() {
        let team = team.trim();
        if team.is_empty() {
            continue;
        }
        let snapped = kb
            .closest_team(team, FORM_TEAM_THRESHOLD)
            .unwrap_or(team)
            .to_string();
        if !out.contains(&snapped) {
            out.push(snapped);
        }
    }
    out
}

fn form_year(year: Option<i32>) -> Option<i32> {
    year.filter(|y| FORM_YEARS.contains(y))
}

/// Out-of-range years give no season. Long ranges keep the most recent
/// `MAX_FORM_SEASONS`.
fn form_seasons(form: &AdvancedForm) -> Vec<String> {
    match form.year_mode.as_deref().map(str::trim).unwrap_or("single") {
        "range" => {
            let (Some(start), Some(end)) = (form_year(form.year_start), form_year(form.year_end))
            else {
                return Vec::new();
            };
            let (start, end) = if end < start { (end, start) } else { (start, end) };
            let start = start.max(end - (MAX_FORM_SEASONS - 1));
            (start..=end).map(season_code_for_start).collect()
        }
        _ => form_year(form.year_single)
            .map(season_code_for_start)
            .into_iter()
            .collect(),
    }
}
