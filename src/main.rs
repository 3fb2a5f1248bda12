use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tracing::info;

use title_race::RaceError;
use title_race::cli::CliArgs;
use title_race::config::{ChartConstants, EnvSettings};
use title_race::crest::{HttpCrestSource, load_crests};
use title_race::geometry::output_path;
use title_race::league_fetch::source_for;
use title_race::plan::ChartPlan;
use title_race::projection::TableProjection;
use title_race::render::render_chart;
use title_race::telemetry::{self, StageTimings};

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let _ = telemetry::init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<RaceError>() {
                Some(race) => eprintln!("error ({:?}): {err:#}", race.kind()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let origin = Instant::now();

    let run = CliArgs::parse(std::env::args().skip(1))?.into_run_config()?;
    let env = EnvSettings::from_env();
    let constants = ChartConstants {
        dpi: env.dpi,
        ..ChartConstants::default()
    };
    let source = source_for(run.competition, &env)?;

    info!(competition = %run.competition, "fetching league data");
    let data = source.fetch().context("league data fetch failed")?;
    if data.competition != source.competition() {
        return Err(RaceError::Integrity(format!(
            "{} source returned {} data",
            source.competition(),
            data.competition
        ))
        .into());
    }
    let team_ids = data.teams.iter().map(|t| t.id).collect::<Vec<_>>();
    let crest_source = HttpCrestSource::for_competition(run.competition);
    let crests = load_crests(&crest_source, &team_ids).context("crest fetch failed")?;

    let projection = TableProjection::from_league(data, &constants, Utc::now())?;
    let data_done = Instant::now();
    let now = Local::now().naive_local();
    let plan = ChartPlan::build(&projection, &run, &constants, now)?;
    let plan_done = Instant::now();

    let path = output_path(&env.output_dir, run.competition, &run.file_stem, now);
    let render = render_chart(&plan, &crests, &path)
        .with_context(|| format!("writing {}", path.display()))?;

    let timings = StageTimings {
        data: data_done.duration_since(origin),
        graph: plan_done.duration_since(data_done) + render.draw,
        save: render.save,
    };
    println!("Done. {}", path.display());
    for line in timings.summary_lines() {
        println!("{line}");
    }
    Ok(())
}
