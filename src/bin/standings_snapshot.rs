use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};

use title_race::config::{ChartConstants, Competition, RunConfig};
use title_race::league_fetch::{
    parse_football_data_matches_json, parse_football_data_standings_json, parse_fpl_fixtures_json,
    parse_fpl_teams_json,
};
use title_race::model::LeagueData;
use title_race::projection::TableProjection;
use title_race::standings::format_goal_difference;
use title_race::threshold::layout_threshold_lines;

const NEXT_FIXTURES_SHOWN: usize = 3;

// Prints the projected table for a saved snapshot. No network, no chart.
// `--json` dumps the ranked projection instead of the text table.
fn main() -> Result<()> {
    let competition = arg_value("--competition")
        .map(|c| c.parse::<Competition>())
        .transpose()?
        .unwrap_or(Competition::PremierLeague);
    let teams_path = arg_value("--teams")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("--teams <file> is required"))?;
    let fixtures_path = arg_value("--fixtures")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("--fixtures <file> is required"))?;
    let now = match arg_value("--now") {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .context("--now must be RFC 3339")?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let teams_raw = fs::read_to_string(&teams_path)
        .with_context(|| format!("reading {}", teams_path.display()))?;
    let fixtures_raw = fs::read_to_string(&fixtures_path)
        .with_context(|| format!("reading {}", fixtures_path.display()))?;
    let (teams, fixtures) = match competition {
        Competition::PremierLeague => (
            parse_fpl_teams_json(&teams_raw)?,
            parse_fpl_fixtures_json(&fixtures_raw)?,
        ),
        Competition::Championship => (
            parse_football_data_standings_json(&teams_raw)?,
            parse_football_data_matches_json(&fixtures_raw)?,
        ),
    };

    let constants = ChartConstants::default();
    let data = LeagueData {
        competition,
        teams,
        fixtures,
    };
    let projection = TableProjection::from_league(data, &constants, now)?;

    if std::env::args().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&projection.ranked)?);
        return Ok(());
    }

    println!(
        "{:>3}  {:<5} {:>3} {:>3} {:>3} {:>3} {:>5} {:>4} {:>4} {:>4}  next",
        "#", "team", "P", "W", "D", "L", "GD", "Pts", "Rem", "Max"
    );
    for (idx, row) in projection.ranked.iter().enumerate() {
        let t = &row.record.tally;
        let next = row
            .fixtures
            .iter()
            .take(NEXT_FIXTURES_SHOWN)
            .map(|f| format!("{} {}", f.label, f.opponent_name))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:>3}  {:<5} {:>3} {:>3} {:>3} {:>3} {:>5} {:>4} {:>4} {:>4}  {}",
            idx + 1,
            row.team.short_name,
            t.played(),
            t.wins,
            t.draws,
            t.losses,
            format_goal_difference(t.goal_difference),
            row.record.current_points,
            row.record.remaining,
            row.record.max_points,
            next
        );
    }

    let run = RunConfig::preset(competition);
    let lines =
        layout_threshold_lines(&run.lines, &projection.ranked, &projection.ranked, &constants)?;
    println!();
    for line in lines {
        println!("{}", line.label);
    }
    Ok(())
}

fn arg_value(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
