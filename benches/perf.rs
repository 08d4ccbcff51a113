use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use copilot_query::normalize::normalize;
use copilot_query::teams::{DEFAULT_FUZZY_THRESHOLD, extract_teams};
use copilot_query::{KnowledgeBase, ParserConfig, QueryParser};

const PROMPTS: &[&str] = &[
    "Show me Arsenal's expected goals in the 2023 Premier League season",
    "Compare Real Madrid and Barcelona goals in La Liga 2022/23",
    "Liverpool possession stats past 5 seasons",
    "Show me Manchester United passing stats this season",
    "Top 10 goalkeepers in Serie A 2021/22 by clean sheets",
    "Compare Haaland and Salah xG this season",
    "Arsenal versus Bayern Munich shots on target",
    "radar chart of Bukayo Saka's key passes and progressive carries last season",
];

fn parser() -> QueryParser {
    QueryParser::from_config(ParserConfig::default()).expect("builtin knowledge base")
}

fn bench_parse_single(c: &mut Criterion) {
    let parser = parser();
    c.bench_function("parse_single", |b| {
        b.iter(|| {
            let d = parser.parse(black_box(PROMPTS[1]));
            black_box(d.metric_type);
        })
    });
}

fn bench_parse_batch(c: &mut Criterion) {
    let parser = parser();
    let prompts: Vec<&str> = PROMPTS.iter().copied().cycle().take(256).collect();
    c.bench_function("parse_batch_256", |b| {
        b.iter(|| {
            let out = parser.parse_batch(black_box(&prompts));
            black_box(out.len());
        })
    });
}

fn bench_extract_teams(c: &mut Criterion) {
    let kb = KnowledgeBase::builtin().expect("builtin knowledge base");
    // Misspelled names force the fuzzy pass over every window.
    let text = normalize("how did Manchestr Citty and Borusia Dortmund do against Intr Milan");
    c.bench_function("extract_teams_fuzzy", |b| {
        b.iter(|| {
            let teams = extract_teams(&kb, black_box(&text), DEFAULT_FUZZY_THRESHOLD);
            black_box(teams.len());
        })
    });
}

fn bench_knowledge_base_load(c: &mut Criterion) {
    c.bench_function("knowledge_base_builtin", |b| {
        b.iter(|| {
            let kb = KnowledgeBase::builtin().expect("builtin knowledge base");
            black_box(kb.teams().len());
        })
    });
}

criterion_group!(
    perf,
    bench_parse_single,
    bench_parse_batch,
    bench_extract_teams,
    bench_knowledge_base_load
);
criterion_main!(perf);
