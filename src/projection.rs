use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::classify::FixtureClassifier;
use crate::config::{ChartConstants, DisplayWindow, PointsDeduction, deduction_for};
use crate::error::RaceResult;
use crate::model::{Fixture, LeagueData, Team};
use crate::sequence::{RemainingFixture, remaining_fixtures};
use crate::standings::{PointsRecord, project_maximum, remaining_count, tally_results};

#[derive(Debug, Clone, Serialize)]
pub struct TeamProjection {
    pub team: Team,
    pub record: PointsRecord,
    pub fixtures: Vec<RemainingFixture>,
}

/// Every team of the competition, ranked by who could still finish highest.
#[derive(Debug, Clone)]
pub struct TableProjection {
    pub ranked: Vec<TeamProjection>,
}

impl TableProjection {
    /// Classifies the raw fixtures, then projects every team.
    pub fn from_league(
        data: LeagueData,
        constants: &ChartConstants,
        now: DateTime<Utc>,
    ) -> RaceResult<Self> {
        let classifier = FixtureClassifier::new(&data.teams, constants.bands, now);
        let fixtures = classifier.classify_all(data.fixtures)?;
        Self::build(
            &data.teams,
            &fixtures,
            data.competition.deductions(),
            constants.points_per_fixture,
        )
    }

    /// Projects already-classified fixtures.
    pub fn build(
        teams: &[Team],
        fixtures: &[Fixture],
        deductions: &[PointsDeduction],
        points_per_fixture: i32,
    ) -> RaceResult<Self> {
        let mut ranked = Vec::with_capacity(teams.len());
        for team in teams {
            let tally = tally_results(team.id, fixtures)?;
            let remaining = remaining_count(team.id, fixtures);
            let record = project_maximum(
                tally,
                remaining,
                deduction_for(deductions, team.id),
                points_per_fixture,
            );
            let sequence = remaining_fixtures(team.id, fixtures, teams)?;
            debug!(
                team = %team.short_name,
                points = record.current_points,
                max = record.max_points,
                remaining,
                "projected team"
            );
            ranked.push(TeamProjection {
                team: team.clone(),
                record,
                fixtures: sequence,
            });
        }
        rank_teams(&mut ranked);
        Ok(Self { ranked })
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn window(&self, window: DisplayWindow) -> RaceResult<&[TeamProjection]> {
        select_window(&self.ranked, window)
    }
}

/// Stable sort on (max points, goal difference, goals for), all descending.
pub fn rank_teams(teams: &mut [TeamProjection]) {
    teams.sort_by(|a, b| {
        b.record
            .max_points
            .cmp(&a.record.max_points)
            .then(b.record.goal_difference().cmp(&a.record.goal_difference()))
            .then(b.record.goals_for().cmp(&a.record.goals_for()))
    });
}

/// Drops `from - 1` teams off the top and `len - to` off the bottom.
pub fn select_window(ranked: &[TeamProjection], window: DisplayWindow) -> RaceResult<&[TeamProjection]> {
    window.check_fits(ranked.len())?;
    Ok(&ranked[window.from - 1..window.to])
}
