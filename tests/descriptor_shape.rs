use once_cell::sync::Lazy;
use proptest::prelude::*;
use serde_json::Value;

use copilot_query::{FieldValue, ParserConfig, QueryDescriptor, QueryParser, StatType};

static PARSER: Lazy<QueryParser> =
    Lazy::new(|| QueryParser::from_config(ParserConfig::default()).expect("builtin knowledge base"));

const KEYS: [&str; 8] = [
    "team",
    "league",
    "player",
    "season",
    "stat_type",
    "metric",
    "metric_type",
    "chart_type",
];

const WORDS: &[&str] = &[
    "Arsenal", "arsenal's", "Real Madrid", "barca", "Man Utd", "Bayern", "Haaland", "Salah",
    "compare", "vs", "and", "goals", "xG", "expected goals", "passing", "possession", "keeper",
    "clean sheets", "tackles", "radar", "heatmap", "line chart", "table", "Premier League",
    "La Liga", "Serie A", "2023", "2022/23", "this season", "last season", "past 5 seasons",
    "last three seasons", "prompt:", "top", "10", "by", "?", "&", "é", "Ødegaard",
];

fn assert_shape(d: &QueryDescriptor) {
    let json = serde_json::to_value(d).expect("descriptor serializes");
    let obj = json.as_object().expect("descriptor is an object");
    assert_eq!(obj.len(), KEYS.len());
    for key in KEYS {
        let value = obj.get(key).unwrap_or_else(|| panic!("missing key {key}"));
        if let Value::Array(items) = value {
            assert!(items.len() >= 2, "{key} array must hold at least two values");
            assert!(items.iter().all(Value::is_string));
        }
    }
    assert!(obj["stat_type"].is_string());
    for field in [&d.team, &d.player, &d.season, &d.metric] {
        if let Some(FieldValue::Many(values)) = field {
            let mut seen = values.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), values.len(), "values must be distinct");
        }
    }
}

fn phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..8).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn arbitrary_text_keeps_descriptor_shape(text in "\\PC{0,80}") {
        let d = PARSER.parse(&text);
        assert_shape(&d);
        prop_assert_eq!(&d, &PARSER.parse(&text));
    }

    #[test]
    fn vocabulary_phrases_keep_descriptor_shape(text in phrase()) {
        let d = PARSER.parse(&text);
        assert_shape(&d);
        prop_assert_eq!(&d, &PARSER.parse(&text));
        let blank = QueryDescriptor::empty(PARSER.default_league());
        prop_assert!(d.metric.is_some() || d == blank);
        prop_assert!(d.chart_type.is_some());
    }

    #[test]
    fn season_ranges_give_start_and_end_codes(
        start in 1900i32..=2098,
        sep in prop::sample::select(vec!["/", "-", " - "]),
        long_end in any::<bool>(),
    ) {
        let end = if long_end {
            format!("{}", start + 1)
        } else {
            format!("{:02}", (start + 1) % 100)
        };
        let d = PARSER.parse(&format!("Arsenal goals {start}{sep}{end}"));
        let expected = format!("{:02}{:02}", start % 100, (start + 1) % 100);
        prop_assert_eq!(d.season, Some(FieldValue::One(expected)));
    }

    #[test]
    fn batch_matches_single_parses(prompts in prop::collection::vec(phrase(), 0..6)) {
        let batch = PARSER.parse_batch(&prompts);
        prop_assert_eq!(batch.len(), prompts.len());
        for (prompt, d) in prompts.iter().zip(&batch) {
            prop_assert_eq!(d, &PARSER.parse(prompt));
        }
    }
}

#[test]
fn missing_metrics_backfill_from_stat_type() {
    let cases = [
        ("standard stats for Arsenal", StatType::Standard),
        ("goalkeeping numbers for Arsenal", StatType::Keeper),
        ("shooting for Arsenal", StatType::Shooting),
        ("passing for Arsenal", StatType::Passing),
        ("defensive record of Arsenal", StatType::Defense),
        ("dribbling for Arsenal", StatType::Possession),
    ];
    let kb = PARSER.knowledge_base();
    for (prompt, stat) in cases {
        let d = PARSER.parse(prompt);
        assert_eq!(d.stat_type, stat, "{prompt}");
        assert_eq!(d.metrics(), kb.default_metrics(stat).to_vec(), "{prompt}");
        assert_eq!(d.team, Some(FieldValue::One("Arsenal".to_string())), "{prompt}");
    }
}

#[test]
fn blank_inputs_only_yield_null_metric() {
    for input in ["", " \t ", "prompt:", "PROMPT:   "] {
        let d = PARSER.parse(input);
        assert_eq!(d.metric, None);
        assert_eq!(d.chart_type, None);
        assert_eq!(d.league.as_deref(), Some("ENG-Premier League"));
    }
}
