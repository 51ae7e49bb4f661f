mod reports;
mod season;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use furlong_game::GameConfig;
use season::SeasonConfig;

#[derive(Debug, Parser)]
#[command(name = "furlong-tester", version = "0.1.0")]
#[command(about = "Headless balance testing for Furlong - plays full seasons and reports statistics")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Maximum races per season
    #[arg(long, default_value_t = 12)]
    races: u32,

    /// Optional path to a GameConfig JSON overriding the built-in balance
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GameConfig::from_json(&raw).context("parsing game config")?
        }
        None => GameConfig::default_config(),
    };

    let seeds = split_seeds(&args.seeds)?;
    let mut summaries = Vec::with_capacity(seeds.len());
    for seed in seeds {
        info!("running season for seed {seed}");
        let summary = season::run_season(&cfg, SeasonConfig::new(seed).with_max_races(args.races));
        summaries.push(summary);
    }

    match args.report.as_str() {
        "json" => reports::generate_json_report(&summaries)?,
        _ => reports::generate_console_report(&summaries),
    }
    Ok(())
}

fn split_seeds(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid seed '{s}'")))
        .collect()
}
