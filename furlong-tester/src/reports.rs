//! Report rendering for season summaries.

use anyhow::Result;
use colored::Colorize;

use crate::season::SeasonSummary;

pub fn generate_console_report(summaries: &[SeasonSummary]) {
    println!();
    println!("{}", "📊 Season Results Summary".bright_cyan().bold());
    println!("{}", "=========================".cyan());

    let total = summaries.len();
    let won = summaries.iter().filter(|s| s.won).count();
    println!("Seasons: {total}");
    println!("Reached wealth goal: {}", won.to_string().green());
    #[allow(clippy::cast_precision_loss)]
    let win_rate = if total > 0 {
        (won as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    println!("Goal rate: {win_rate:.1}%");
    println!();

    for summary in summaries {
        let status = if summary.won {
            "🏆 GOAL".green()
        } else {
            "— ended".yellow()
        };
        println!(
            "{} seed {} | races {} | wins {} | podiums {} | wallet {}",
            status,
            summary.seed.to_string().bold(),
            summary.races_run,
            summary.wins,
            summary.podiums,
            format_wallet(summary.final_wallet),
        );
        println!(
            "   stable {} horses, best speed {}, comeback active {} of {} races",
            summary.stable_size, summary.best_speed, summary.comeback_races, summary.races_run
        );
    }

    if !summaries.is_empty() {
        println!();
        println!("{}", "⚖️  Balance Aggregates".bright_yellow().bold());
        println!("{}", "======================".yellow());
        #[allow(clippy::cast_precision_loss)]
        let avg_wallet =
            summaries.iter().map(|s| s.final_wallet).sum::<i64>() as f64 / total as f64;
        #[allow(clippy::cast_precision_loss)]
        let avg_races =
            summaries.iter().map(|s| f64::from(s.races_run)).sum::<f64>() / total as f64;
        println!("Average final wallet: {avg_wallet:.0}");
        println!("Average races per season: {avg_races:.1}");
    }
}

/// Emit the raw summaries as pretty JSON for downstream tooling.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn generate_json_report(summaries: &[SeasonSummary]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summaries)?;
    println!("{json_output}");
    Ok(())
}

fn format_wallet(wallet: i64) -> String {
    let text = format!("${wallet}");
    if wallet >= 1_000 {
        text.green().to_string()
    } else if wallet < 100 {
        text.red().to_string()
    } else {
        text
    }
}
