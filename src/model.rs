use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Competition;
use crate::error::{RaceError, RaceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(raw: &str) -> RaceResult<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(RaceError::Config(format!("bad colour {raw:?}")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| RaceError::Config(format!("bad colour {raw:?}")))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    /// Current table position as reported by the source. `None` when the source has none.
    pub position: Option<u32>,
    pub colour: Colour,
}

/// Opponent strength, frozen when the fixture list is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Average,
    Hard,
    Hardest,
    Unscheduled,
}

impl DifficultyTier {
    /// Maps a 2..=5 rating. Values below 2 fold into `Easy`, above 5 into `Hardest`.
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=2 => DifficultyTier::Easy,
            3 => DifficultyTier::Average,
            4 => DifficultyTier::Hard,
            _ => DifficultyTier::Hardest,
        }
    }

    pub fn level(self) -> Option<u8> {
        match self {
            DifficultyTier::Easy => Some(2),
            DifficultyTier::Average => Some(3),
            DifficultyTier::Hard => Some(4),
            DifficultyTier::Hardest => Some(5),
            DifficultyTier::Unscheduled => None,
        }
    }

    pub fn colour(self) -> Colour {
        match self {
            DifficultyTier::Easy => Colour::rgb(0xb5, 0xf7, 0xc6),
            DifficultyTier::Average => Colour::rgb(0xe7, 0xe7, 0xe7),
            DifficultyTier::Hard => Colour::rgb(0xf5, 0xa1, 0xb2),
            DifficultyTier::Hardest => Colour::rgb(0xf4, 0x72, 0x72),
            DifficultyTier::Unscheduled => Colour::rgb(0xa1, 0xa1, 0xa1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn code(self) -> &'static str {
        match self {
            Venue::Home => "H",
            Venue::Away => "A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home_id: u32,
    pub away_id: u32,
    pub home_score: Option<u8>,
    pub away_score: Option<u8>,
    /// `None` means unscheduled (postponed or not yet dated).
    pub kickoff: Option<DateTime<Utc>>,
    pub finished: bool,
    pub finished_provisional: bool,
    pub started: Option<bool>,
    /// Difficulty the home side faces, i.e. the away side's strength.
    pub home_difficulty: Option<DifficultyTier>,
    /// Difficulty the away side faces.
    pub away_difficulty: Option<DifficultyTier>,
    pub postponed: bool,
}

impl Fixture {
    pub fn venue_for(&self, team_id: u32) -> Option<Venue> {
        if self.home_id == team_id {
            Some(Venue::Home)
        } else if self.away_id == team_id {
            Some(Venue::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.venue_for(team_id).is_some()
    }

    /// Not finished, not provisionally finished, and not kicked off.
    pub fn is_remaining(&self) -> bool {
        !self.finished && !self.finished_provisional && !self.started.unwrap_or(false)
    }

    pub fn opponent_of(&self, venue: Venue) -> u32 {
        match venue {
            Venue::Home => self.away_id,
            Venue::Away => self.home_id,
        }
    }

    pub fn difficulty_for(&self, venue: Venue) -> Option<DifficultyTier> {
        match venue {
            Venue::Home => self.home_difficulty,
            Venue::Away => self.away_difficulty,
        }
    }
}

/// Everything one run needs from the league source.
#[derive(Debug, Clone)]
pub struct LeagueData {
    pub competition: Competition,
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
}

impl LeagueData {
    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}
