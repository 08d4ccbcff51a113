use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use copilot_query::season::ReferenceSeason;
use copilot_query::{ParserConfig, QueryDescriptor, QueryParser};

const SAMPLE_PROMPTS: &[&str] = &[
    "Show me Arsenal's expected goals in the 2023 Premier League season",
    "Compare Real Madrid and Barcelona goals in La Liga 2022/23",
    "Liverpool possession stats past 5 seasons",
    "Show me Manchester United passing stats this season",
    "Top 10 goalkeepers in Serie A 2021/22 by clean sheets",
];

#[derive(Debug, Default)]
struct CliArgs {
    pretty: bool,
    demo: bool,
    season_from_clock: bool,
    kb_path: Option<PathBuf>,
    prompts: Vec<String>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let args = parse_args(std::env::args().skip(1).collect());
    let mut config = ParserConfig::from_env();
    if let Some(path) = args.kb_path.clone() {
        config.kb_path = Some(path);
    }
    if args.season_from_clock {
        config.reference_season = ReferenceSeason::from_date(Local::now().date_naive());
    }

    let parser = QueryParser::from_config(config).context("failed to load knowledge base")?;
    info!(
        recognizer = parser.recognizer_name(),
        reference_season = %parser.config().reference_season.code(),
        "parser ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.demo {
        let parsed = parser.parse_batch(SAMPLE_PROMPTS);
        for (prompt, descriptor) in SAMPLE_PROMPTS.iter().zip(&parsed) {
            let row = json!({ "prompt": prompt, "parsed": descriptor });
            writeln!(out, "{}", to_json(&row, args.pretty)?).context("write stdout")?;
        }
        return Ok(());
    }

    let prompts = if args.prompts.is_empty() {
        read_stdin_prompts()?
    } else {
        args.prompts
    };
    let parsed: Vec<QueryDescriptor> = parser.parse_batch(&prompts);
    for descriptor in &parsed {
        writeln!(out, "{}", to_json(descriptor, args.pretty)?).context("write stdout")?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_args(args: Vec<String>) -> CliArgs {
    let mut out = CliArgs::default();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        if arg == "--pretty" {
            out.pretty = true;
        } else if arg == "--demo" {
            out.demo = true;
        } else if arg == "--season-from-clock" {
            out.season_from_clock = true;
        } else if let Some(path) = arg.strip_prefix("--kb=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                out.kb_path = Some(PathBuf::from(trimmed));
            }
        } else if arg == "--kb" {
            if let Some(next) = args.get(idx + 1)
                && !next.trim().is_empty()
            {
                out.kb_path = Some(PathBuf::from(next));
                idx += 1;
            }
        } else {
            out.prompts.push(arg.clone());
        }
        idx += 1;
    }
    out
}

fn read_stdin_prompts() -> Result<Vec<String>> {
    let stdin = io::stdin();
    let mut prompts = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        if !line.trim().is_empty() {
            prompts.push(line);
        }
    }
    Ok(prompts)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.context("serialize descriptor")
}
