use serde::Serialize;

use crate::error::{RaceError, RaceResult};
use crate::model::{DifficultyTier, Fixture, Team, Venue};

pub const UNSCHEDULED_LABEL: &str = "TBC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemainingFixture {
    /// `"H 14-03"` style label, or `TBC` when the fixture has no date.
    pub label: String,
    pub venue: Venue,
    pub opponent_id: u32,
    pub opponent_name: String,
    pub difficulty: DifficultyTier,
}

/// Unplayed fixtures for `team_id`, undated ones first, each group in source order.
pub fn remaining_fixtures(
    team_id: u32,
    fixtures: &[Fixture],
    teams: &[Team],
) -> RaceResult<Vec<RemainingFixture>> {
    let mut unscheduled = Vec::new();
    let mut dated = Vec::new();

    for fixture in fixtures.iter().filter(|f| f.is_remaining()) {
        let Some(venue) = fixture.venue_for(team_id) else {
            continue;
        };
        let opponent_id = fixture.opponent_of(venue);
        let opponent = teams
            .iter()
            .find(|t| t.id == opponent_id)
            .ok_or_else(|| {
                RaceError::Integrity(format!("fixture references unknown team {opponent_id}"))
            })?;

        let Some(kickoff) = fixture.kickoff else {
            unscheduled.push(RemainingFixture {
                label: UNSCHEDULED_LABEL.to_string(),
                venue,
                opponent_id,
                opponent_name: opponent.name.clone(),
                difficulty: DifficultyTier::Unscheduled,
            });
            continue;
        };

        let difficulty = fixture.difficulty_for(venue).ok_or_else(|| {
            RaceError::Integrity(format!(
                "fixture {} v {} was never classified",
                fixture.home_id, fixture.away_id
            ))
        })?;
        dated.push(RemainingFixture {
            label: format!("{} {}", venue.code(), kickoff.format("%d-%m")),
            venue,
            opponent_id,
            opponent_name: opponent.name.clone(),
            difficulty,
        });
    }

    unscheduled.extend(dated);
    Ok(unscheduled)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::Colour;

    fn team(id: u32) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            short_name: format!("T{id}"),
            position: Some(id),
            colour: Colour::WHITE,
        }
    }

    fn upcoming(home: u32, away: u32, day: Option<u32>) -> Fixture {
        Fixture {
            home_id: home,
            away_id: away,
            home_score: None,
            away_score: None,
            kickoff: day.map(|d| Utc.with_ymd_and_hms(2025, 4, d, 15, 0, 0).unwrap()),
            finished: false,
            finished_provisional: false,
            started: Some(false),
            home_difficulty: Some(DifficultyTier::Average),
            away_difficulty: Some(DifficultyTier::Hard),
            postponed: false,
        }
    }

    #[test]
    fn labels_carry_venue_and_day_month() {
        let teams = vec![team(1), team(2)];
        let seq = remaining_fixtures(2, &[upcoming(1, 2, Some(5))], &teams).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].label, "A 05-04");
        assert_eq!(seq[0].venue, Venue::Away);
        assert_eq!(seq[0].opponent_id, 1);
        assert_eq!(seq[0].opponent_name, "Team 1");
        assert_eq!(seq[0].difficulty, DifficultyTier::Hard);
    }

    #[test]
    fn started_and_finished_are_skipped() {
        let teams = vec![team(1), team(2)];
        let mut started = upcoming(1, 2, Some(1));
        started.started = Some(true);
        let mut provisional = upcoming(2, 1, Some(2));
        provisional.finished_provisional = true;
        let mut unknown_start = upcoming(1, 2, Some(3));
        unknown_start.started = None;
        let seq = remaining_fixtures(1, &[started, provisional, unknown_start], &teams).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].label, "H 03-04");
    }

    #[test]
    fn unclassified_dated_fixture_is_rejected() {
        let teams = vec![team(1), team(2)];
        let mut raw = upcoming(1, 2, Some(4));
        raw.home_difficulty = None;
        assert!(remaining_fixtures(1, &[raw], &teams).is_err());
    }
}
