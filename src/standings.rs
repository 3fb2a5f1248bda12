use serde::Serialize;

use crate::error::{RaceError, RaceResult};
use crate::model::{Fixture, Venue};

const POINTS_FOR_WIN: i32 = 3;
const POINTS_FOR_DRAW: i32 = 1;

/// Results of a team's finished fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultTally {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goal_difference: i32,
    pub goals_for: i32,
}

impl ResultTally {
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub fn points(&self) -> i32 {
        POINTS_FOR_WIN * self.wins as i32 + POINTS_FOR_DRAW * self.draws as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointsRecord {
    pub tally: ResultTally,
    pub remaining: u32,
    pub deduction: i32,
    /// Points after any deduction.
    pub current_points: i32,
    /// `current_points` plus the full value of every remaining fixture.
    pub max_points: i32,
}

impl PointsRecord {
    pub fn points(&self) -> i32 {
        self.tally.points()
    }

    pub fn goal_difference(&self) -> i32 {
        self.tally.goal_difference
    }

    pub fn goals_for(&self) -> i32 {
        self.tally.goals_for
    }

    pub fn goal_difference_label(&self) -> String {
        format!("GD {}", format_goal_difference(self.tally.goal_difference))
    }
}

/// Scans every finished fixture `team_id` took part in.
pub fn tally_results(team_id: u32, fixtures: &[Fixture]) -> RaceResult<ResultTally> {
    let mut tally = ResultTally::default();
    for fixture in fixtures.iter().filter(|f| f.finished) {
        let Some(venue) = fixture.venue_for(team_id) else {
            continue;
        };
        let (Some(home), Some(away)) = (fixture.home_score, fixture.away_score) else {
            return Err(RaceError::Integrity(format!(
                "finished fixture {} v {} has no score",
                fixture.home_id, fixture.away_id
            )));
        };
        let (scored, conceded) = match venue {
            Venue::Home => (i32::from(home), i32::from(away)),
            Venue::Away => (i32::from(away), i32::from(home)),
        };
        if scored > conceded {
            tally.wins += 1;
        } else if scored == conceded {
            tally.draws += 1;
        } else {
            tally.losses += 1;
        }
        tally.goal_difference += scored - conceded;
        tally.goals_for += scored;
    }
    Ok(tally)
}

pub fn remaining_count(team_id: u32, fixtures: &[Fixture]) -> u32 {
    fixtures
        .iter()
        .filter(|f| f.involves(team_id) && f.is_remaining())
        .count() as u32
}

/// Ceiling on final points; the deduction lowers current and maximum alike.
pub fn project_maximum(
    tally: ResultTally,
    remaining: u32,
    deduction: i32,
    points_per_fixture: i32,
) -> PointsRecord {
    let current_points = tally.points() - deduction;
    PointsRecord {
        tally,
        remaining,
        deduction,
        current_points,
        max_points: current_points + points_per_fixture * remaining as i32,
    }
}

/// `+` for zero and positive values, plain minus otherwise.
pub fn format_goal_difference(goal_difference: i32) -> String {
    if goal_difference >= 0 {
        format!("+{goal_difference}")
    } else {
        goal_difference.to_string()
    }
}
