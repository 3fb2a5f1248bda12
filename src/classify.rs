use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::DifficultyBands;
use crate::error::{RaceError, RaceResult};
use crate::model::{DifficultyTier, Fixture, Team};

/// Fills in kickoff state and per-side difficulty for raw fixtures.
///
/// Difficulty is a snapshot of the table at classification time. Fixtures that
/// already carry a difficulty from their source keep it.
#[derive(Debug, Clone)]
pub struct FixtureClassifier {
    positions: HashMap<u32, Option<u32>>,
    bands: DifficultyBands,
    now: DateTime<Utc>,
}

impl FixtureClassifier {
    pub fn new(teams: &[Team], bands: DifficultyBands, now: DateTime<Utc>) -> Self {
        let positions = teams.iter().map(|t| (t.id, t.position)).collect();
        Self {
            positions,
            bands,
            now,
        }
    }

    pub fn has_kicked_off(&self, kickoff: Option<DateTime<Utc>>) -> bool {
        kickoff.is_some_and(|k| self.now > k)
    }

    /// Difficulty of facing `opponent_id`, from its table position.
    pub fn opponent_tier(&self, opponent_id: u32) -> RaceResult<DifficultyTier> {
        match self.positions.get(&opponent_id) {
            Some(Some(position)) => Ok(self.bands.tier_for(*position)),
            Some(None) => Err(RaceError::Integrity(format!(
                "team {opponent_id} has no table position"
            ))),
            None => Err(RaceError::Integrity(format!(
                "fixture references unknown team {opponent_id}"
            ))),
        }
    }

    pub fn classify(&self, mut fixture: Fixture) -> RaceResult<Fixture> {
        for id in [fixture.home_id, fixture.away_id] {
            if !self.positions.contains_key(&id) {
                return Err(RaceError::Integrity(format!(
                    "fixture references unknown team {id}"
                )));
            }
        }

        if fixture.postponed {
            fixture.finished = false;
            fixture.finished_provisional = false;
            fixture.kickoff = None;
            fixture.started = Some(false);
        }

        if fixture.started.is_none() {
            fixture.started = Some(self.has_kicked_off(fixture.kickoff));
        }

        if fixture.kickoff.is_none() {
            fixture.home_difficulty = Some(DifficultyTier::Unscheduled);
            fixture.away_difficulty = Some(DifficultyTier::Unscheduled);
            return Ok(fixture);
        }

        if fixture.home_difficulty.is_none() {
            fixture.home_difficulty = Some(self.opponent_tier(fixture.away_id)?);
        }
        if fixture.away_difficulty.is_none() {
            fixture.away_difficulty = Some(self.opponent_tier(fixture.home_id)?);
        }
        Ok(fixture)
    }

    pub fn classify_all(&self, fixtures: Vec<Fixture>) -> RaceResult<Vec<Fixture>> {
        fixtures.into_iter().map(|f| self.classify(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::Colour;

    fn team(id: u32, position: Option<u32>) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            short_name: format!("T{id}"),
            position,
            colour: Colour::WHITE,
        }
    }

    fn fixture(home: u32, away: u32, kickoff: Option<DateTime<Utc>>) -> Fixture {
        Fixture {
            home_id: home,
            away_id: away,
            home_score: None,
            away_score: None,
            kickoff,
            finished: false,
            finished_provisional: false,
            started: None,
            home_difficulty: None,
            away_difficulty: None,
            postponed: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn difficulty_comes_from_opponent_position() {
        let teams = vec![team(1, Some(2)), team(2, Some(22))];
        let c = FixtureClassifier::new(&teams, DifficultyBands::default(), now());
        let kickoff = Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap();
        let f = c.classify(fixture(1, 2, Some(kickoff))).unwrap();
        assert_eq!(f.home_difficulty, Some(DifficultyTier::Easy));
        assert_eq!(f.away_difficulty, Some(DifficultyTier::Hardest));
        assert_eq!(f.started, Some(false));
    }

    #[test]
    fn past_kickoff_counts_as_started() {
        let teams = vec![team(1, Some(2)), team(2, Some(10))];
        let c = FixtureClassifier::new(&teams, DifficultyBands::default(), now());
        let kickoff = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();
        let f = c.classify(fixture(1, 2, Some(kickoff))).unwrap();
        assert_eq!(f.started, Some(true));
        assert!(!f.is_remaining());
    }

    #[test]
    fn postponed_fixture_resurfaces_as_unscheduled() {
        let teams = vec![team(1, Some(2)), team(2, Some(10))];
        let c = FixtureClassifier::new(&teams, DifficultyBands::default(), now());
        let mut raw = fixture(1, 2, Some(Utc.with_ymd_and_hms(2025, 1, 1, 15, 0, 0).unwrap()));
        raw.postponed = true;
        raw.finished = true;
        let f = c.classify(raw).unwrap();
        assert!(f.is_remaining());
        assert_eq!(f.kickoff, None);
        assert_eq!(f.home_difficulty, Some(DifficultyTier::Unscheduled));
    }

    #[test]
    fn missing_position_is_an_integrity_error() {
        let teams = vec![team(1, Some(2)), team(2, None)];
        let c = FixtureClassifier::new(&teams, DifficultyBands::default(), now());
        let kickoff = Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap();
        let err = c.classify(fixture(1, 2, Some(kickoff))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Integrity);

        let err = c.classify(fixture(1, 99, Some(kickoff))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Integrity);
    }

    #[test]
    fn source_difficulty_is_kept() {
        let teams = vec![team(1, None), team(2, None)];
        let c = FixtureClassifier::new(&teams, DifficultyBands::default(), now());
        let kickoff = Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap();
        let mut raw = fixture(1, 2, Some(kickoff));
        raw.home_difficulty = Some(DifficultyTier::Hard);
        raw.away_difficulty = Some(DifficultyTier::Easy);
        let f = c.classify(raw).unwrap();
        assert_eq!(f.home_difficulty, Some(DifficultyTier::Hard));
        assert_eq!(f.away_difficulty, Some(DifficultyTier::Easy));
    }
}
