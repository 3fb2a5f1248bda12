use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::config::{Competition, EnvSettings};
use crate::error::{RaceError, RaceResult};
use crate::http_client::fetch_text;
use crate::model::{Colour, DifficultyTier, Fixture, LeagueData, Team};

const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";
const FOOTBALL_DATA_API_BASE: &str = "https://api.football-data.org/v4";
const FOOTBALL_DATA_AUTH_HEADER: &str = "X-Auth-Token";

// Sheffield Wednesday shares its TLA with Sheffield United.
const ELC_SHORT_NAME_OVERRIDES: &[(u32, &str)] = &[(345, "SHW")];

// Indexed by team id order.
const PL_COLOURS: [Colour; 20] = [
    Colour::rgb(0xe2, 0x08, 0x14),
    Colour::rgb(0x91, 0xbe, 0xea),
    Colour::rgb(0xca, 0x0b, 0x17),
    Colour::rgb(0xb6, 0x05, 0x01),
    Colour::rgb(0x00, 0x4a, 0x9b),
    Colour::rgb(0x02, 0x15, 0x81),
    Colour::rgb(0x00, 0x4b, 0x97),
    Colour::rgb(0x02, 0x45, 0x93),
    Colour::rgb(0x28, 0x26, 0x24),
    Colour::rgb(0x0c, 0x3e, 0x94),
    Colour::rgb(0x13, 0x42, 0x8d),
    Colour::rgb(0xb3, 0x00, 0x11),
    Colour::rgb(0xb1, 0xd4, 0xfa),
    Colour::rgb(0xdc, 0x11, 0x16),
    Colour::rgb(0x0d, 0x08, 0x05),
    Colour::rgb(0xf4, 0x03, 0x1c),
    Colour::rgb(0xd2, 0x09, 0x11),
    Colour::rgb(0x15, 0x20, 0x55),
    Colour::rgb(0x7d, 0x2d, 0x3f),
    Colour::rgb(0xfe, 0xb9, 0x06),
];

// Indexed by team name order.
const ELC_COLOURS: [Colour; 24] = [
    Colour::rgb(0x00, 0x9e, 0xe0),
    Colour::rgb(0xe2, 0x1a, 0x23),
    Colour::rgb(0x69, 0x00, 0x39),
    Colour::rgb(0x03, 0x5d, 0xa9),
    Colour::rgb(0x00, 0x9e, 0xdc),
    Colour::rgb(0x8d, 0x8d, 0x8d),
    Colour::rgb(0xf8, 0xb1, 0x00),
    Colour::rgb(0xff, 0xdf, 0x1a),
    Colour::rgb(0xf2, 0x8c, 0x00),
    Colour::rgb(0xe4, 0x0f, 0x1b),
    Colour::rgb(0x00, 0x36, 0x7a),
    Colour::rgb(0x00, 0xa6, 0x50),
    Colour::rgb(0xff, 0xf5, 0x00),
    Colour::rgb(0x14, 0x3f, 0x2a),
    Colour::rgb(0x32, 0x3c, 0x9c),
    Colour::rgb(0x07, 0x99, 0xd5),
    Colour::rgb(0x1a, 0x59, 0xa3),
    Colour::rgb(0xee, 0x22, 0x27),
    Colour::rgb(0x46, 0x81, 0xcf),
    Colour::rgb(0xe1, 0x39, 0x3e),
    Colour::rgb(0xe2, 0x00, 0x25),
    Colour::rgb(0x03, 0x03, 0x03),
    Colour::rgb(0xff, 0xf0, 0x02),
    Colour::rgb(0x17, 0x36, 0x75),
];

/// Anything that can produce one competition's teams and fixtures.
pub trait LeagueSource {
    fn competition(&self) -> Competition;
    fn fetch(&self) -> RaceResult<LeagueData>;
}

/// Picks the source for `competition`. Fails before any request when the
/// source needs credentials that are not configured.
pub fn source_for(competition: Competition, env: &EnvSettings) -> RaceResult<Box<dyn LeagueSource>> {
    match competition {
        Competition::PremierLeague => Ok(Box::new(FplSource)),
        Competition::Championship => {
            let Some(api_key) = env.football_data_key.clone() else {
                return Err(RaceError::Config(
                    "FOOTBALL_DATA_KEY is required for ELC".to_string(),
                ));
            };
            Ok(Box::new(FootballDataSource::new(
                api_key,
                env.football_data_season,
            )))
        }
    }
}

/// Premier League via the Fantasy Premier League API.
#[derive(Debug, Clone, Copy, Default)]
pub struct FplSource;

impl LeagueSource for FplSource {
    fn competition(&self) -> Competition {
        Competition::PremierLeague
    }

    fn fetch(&self) -> RaceResult<LeagueData> {
        let fixtures_raw = fetch_text(&format!("{FPL_API_BASE}/fixtures/"), &[])?;
        let fixtures = parse_fpl_fixtures_json(&fixtures_raw)?;
        let bootstrap_raw = fetch_text(&format!("{FPL_API_BASE}/bootstrap-static/"), &[])?;
        let teams = parse_fpl_teams_json(&bootstrap_raw)?;
        info!(teams = teams.len(), fixtures = fixtures.len(), "fetched PL data");
        Ok(LeagueData {
            competition: Competition::PremierLeague,
            teams,
            fixtures,
        })
    }
}

/// Championship via football-data.org.
#[derive(Debug, Clone)]
pub struct FootballDataSource {
    api_key: String,
    season: Option<u32>,
}

impl FootballDataSource {
    pub fn new(api_key: impl Into<String>, season: Option<u32>) -> Self {
        Self {
            api_key: api_key.into(),
            season,
        }
    }
}

impl LeagueSource for FootballDataSource {
    fn competition(&self) -> Competition {
        Competition::Championship
    }

    fn fetch(&self) -> RaceResult<LeagueData> {
        let headers = [(FOOTBALL_DATA_AUTH_HEADER, self.api_key.as_str())];
        let mut matches_url = format!("{FOOTBALL_DATA_API_BASE}/competitions/ELC/matches");
        if let Some(season) = self.season {
            matches_url.push_str(&format!("?season={season}"));
        }
        let fixtures = parse_football_data_matches_json(&fetch_text(&matches_url, &headers)?)?;
        let standings_url = format!("{FOOTBALL_DATA_API_BASE}/competitions/ELC/standings");
        let teams = parse_football_data_standings_json(&fetch_text(&standings_url, &headers)?)?;
        info!(teams = teams.len(), fixtures = fixtures.len(), "fetched ELC data");
        Ok(LeagueData {
            competition: Competition::Championship,
            teams,
            fixtures,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FplBootstrap {
    teams: Vec<FplTeam>,
}

#[derive(Debug, Deserialize)]
struct FplTeam {
    id: u32,
    name: String,
    short_name: String,
    #[serde(default)]
    position: u32,
}

#[derive(Debug, Deserialize)]
struct FplFixture {
    team_h: u32,
    team_a: u32,
    team_h_score: Option<u8>,
    team_a_score: Option<u8>,
    kickoff_time: Option<String>,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    finished_provisional: bool,
    started: Option<bool>,
    team_h_difficulty: Option<u8>,
    team_a_difficulty: Option<u8>,
}

pub fn parse_fpl_teams_json(raw: &str) -> RaceResult<Vec<Team>> {
    let bootstrap: FplBootstrap =
        serde_json::from_str(raw.trim()).map_err(|err| RaceError::malformed("FPL teams", err))?;
    let mut teams = bootstrap.teams;
    teams.sort_by_key(|t| t.id);
    teams
        .into_iter()
        .enumerate()
        .map(|(idx, t)| {
            Ok(Team {
                id: t.id,
                name: t.name,
                short_name: t.short_name,
                position: (t.position > 0).then_some(t.position),
                colour: palette_colour(&PL_COLOURS, idx)?,
            })
        })
        .collect()
}

pub fn parse_fpl_fixtures_json(raw: &str) -> RaceResult<Vec<Fixture>> {
    let rows: Vec<FplFixture> = serde_json::from_str(raw.trim())
        .map_err(|err| RaceError::malformed("FPL fixtures", err))?;
    rows.into_iter()
        .map(|row| {
            Ok(Fixture {
                home_id: row.team_h,
                away_id: row.team_a,
                home_score: row.team_h_score,
                away_score: row.team_a_score,
                kickoff: parse_kickoff(row.kickoff_time.as_deref())?,
                finished: row.finished,
                finished_provisional: row.finished_provisional,
                started: row.started,
                home_difficulty: row.team_h_difficulty.map(DifficultyTier::from_level),
                away_difficulty: row.team_a_difficulty.map(DifficultyTier::from_level),
                postponed: false,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct FdMatches {
    #[serde(default)]
    matches: Vec<FdMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdMatch {
    utc_date: Option<String>,
    status: String,
    home_team: FdTeamRef,
    away_team: FdTeamRef,
    score: FdScore,
}

#[derive(Debug, Deserialize)]
struct FdTeamRef {
    id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdScore {
    full_time: FdScoreLine,
}

#[derive(Debug, Deserialize)]
struct FdScoreLine {
    home: Option<u8>,
    away: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct FdStandings {
    standings: Vec<FdStandingGroup>,
}

#[derive(Debug, Deserialize)]
struct FdStandingGroup {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    table: Vec<FdTableRow>,
}

#[derive(Debug, Deserialize)]
struct FdTableRow {
    position: u32,
    team: FdTeam,
}

#[derive(Debug, Deserialize)]
struct FdTeam {
    id: u32,
    name: String,
    tla: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
}

/// `started` is left unset; the classifier derives it from the kickoff time.
pub fn parse_football_data_matches_json(raw: &str) -> RaceResult<Vec<Fixture>> {
    let body: FdMatches = serde_json::from_str(raw.trim())
        .map_err(|err| RaceError::malformed("football-data matches", err))?;
    body.matches
        .into_iter()
        .map(|m| {
            let finished = matches!(m.status.as_str(), "FINISHED" | "AWARDED");
            Ok(Fixture {
                home_id: m.home_team.id,
                away_id: m.away_team.id,
                home_score: m.score.full_time.home,
                away_score: m.score.full_time.away,
                kickoff: parse_kickoff(m.utc_date.as_deref())?,
                finished,
                finished_provisional: finished,
                started: None,
                home_difficulty: None,
                away_difficulty: None,
                postponed: m.status == "POSTPONED",
            })
        })
        .collect()
}

/// Teams sorted by name, coloured in that order.
pub fn parse_football_data_standings_json(raw: &str) -> RaceResult<Vec<Team>> {
    let body: FdStandings = serde_json::from_str(raw.trim())
        .map_err(|err| RaceError::malformed("football-data standings", err))?;
    let group = body
        .standings
        .iter()
        .find(|g| g.kind.as_deref() == Some("TOTAL"))
        .or_else(|| body.standings.first())
        .ok_or_else(|| RaceError::malformed("football-data standings", "no standings table"))?;

    let mut rows: Vec<&FdTableRow> = group.table.iter().collect();
    rows.sort_by(|a, b| a.team.name.cmp(&b.team.name));
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let short_name = ELC_SHORT_NAME_OVERRIDES
                .iter()
                .find(|(id, _)| *id == row.team.id)
                .map(|(_, name)| (*name).to_string())
                .or_else(|| row.team.tla.clone())
                .or_else(|| row.team.short_name.clone())
                .unwrap_or_else(|| row.team.name.clone());
            Ok(Team {
                id: row.team.id,
                name: row.team.name.clone(),
                short_name,
                position: Some(row.position),
                colour: palette_colour(&ELC_COLOURS, idx)?,
            })
        })
        .collect()
}

fn palette_colour(palette: &[Colour], idx: usize) -> RaceResult<Colour> {
    palette.get(idx).copied().ok_or_else(|| {
        RaceError::Integrity(format!(
            "more teams than the {}-colour palette covers",
            palette.len()
        ))
    })
}

fn parse_kickoff(raw: Option<&str>) -> RaceResult<Option<DateTime<Utc>>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty() && *s != "None") else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|err| RaceError::malformed("kickoff time", format!("{raw:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kickoff_accepts_zulu_and_blank() {
        let k = parse_kickoff(Some("2024-08-16T19:00:00Z")).unwrap().unwrap();
        assert_eq!(k.to_rfc3339(), "2024-08-16T19:00:00+00:00");
        assert_eq!(parse_kickoff(None).unwrap(), None);
        assert_eq!(parse_kickoff(Some("None")).unwrap(), None);
        assert!(parse_kickoff(Some("16/08/2024")).is_err());
    }

    fn env(key: Option<&str>) -> EnvSettings {
        EnvSettings {
            football_data_key: key.map(str::to_string),
            football_data_season: Some(2024),
            output_dir: ".".into(),
            dpi: 100,
        }
    }

    #[test]
    fn source_matches_requested_competition() {
        let pl = source_for(Competition::PremierLeague, &env(None)).unwrap();
        assert_eq!(pl.competition(), Competition::PremierLeague);
        let elc = source_for(Competition::Championship, &env(Some("token"))).unwrap();
        assert_eq!(elc.competition(), Competition::Championship);
    }

    #[test]
    fn championship_needs_an_api_key() {
        let err = source_for(Competition::Championship, &env(None)).err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn palette_overflow_is_reported() {
        assert!(palette_colour(&PL_COLOURS, 19).is_ok());
        assert!(palette_colour(&PL_COLOURS, 20).is_err());
    }
}
