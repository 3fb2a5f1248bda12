use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use title_race::ErrorKind;
use title_race::config::{ChartConstants, Competition};
use title_race::league_fetch::{
    parse_football_data_matches_json, parse_football_data_standings_json, parse_fpl_fixtures_json,
    parse_fpl_teams_json,
};
use title_race::model::{DifficultyTier, LeagueData};
use title_race::projection::TableProjection;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_fpl_teams_in_id_order() {
    let teams = parse_fpl_teams_json(&read_fixture("fpl_bootstrap.json")).expect("should parse");
    let ids = teams.iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(teams[0].short_name, "ARS");
    assert_eq!(teams[0].position, Some(2));
    // FPL reports 0 before the table settles.
    assert_eq!(teams[1].position, None);
    assert_ne!(teams[0].colour, teams[1].colour);
}

#[test]
fn parses_fpl_fixtures_with_source_difficulty() {
    let fixtures = parse_fpl_fixtures_json(&read_fixture("fpl_fixtures.json")).expect("should parse");
    assert_eq!(fixtures.len(), 3);

    let played = &fixtures[0];
    assert!(played.finished);
    assert_eq!((played.home_score, played.away_score), (Some(2), Some(0)));
    assert_eq!(played.home_difficulty, Some(DifficultyTier::Easy));
    assert_eq!(played.away_difficulty, Some(DifficultyTier::Hardest));

    let next = &fixtures[1];
    assert_eq!(
        next.kickoff,
        Some(Utc.with_ymd_and_hms(2025, 4, 5, 16, 30, 0).unwrap())
    );
    assert_eq!(next.home_difficulty, Some(DifficultyTier::Hard));
    assert_eq!(next.started, Some(false));

    assert_eq!(fixtures[2].kickoff, None);
}

#[test]
fn malformed_fpl_payload_is_reported() {
    let err = parse_fpl_fixtures_json("{\"not\": \"a list\"}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[test]
fn parses_football_data_standings_from_total_group() {
    let teams =
        parse_football_data_standings_json(&read_fixture("fd_standings.json")).expect("should parse");
    let names = teams.iter().map(|t| t.short_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Blackburn", "LEE", "SHU", "SHW"]);
    let wednesday = teams.iter().find(|t| t.id == 345).unwrap();
    assert_eq!(wednesday.position, Some(3));
}

#[test]
fn parses_football_data_match_statuses() {
    let fixtures =
        parse_football_data_matches_json(&read_fixture("fd_matches.json")).expect("should parse");
    assert_eq!(fixtures.len(), 4);
    assert!(fixtures[0].finished && fixtures[0].finished_provisional);
    assert!(fixtures[1].finished, "awarded counts as finished");
    assert!(fixtures[2].postponed);
    assert!(!fixtures[2].finished);
    assert!(!fixtures[3].finished);
    assert!(fixtures.iter().all(|f| f.started.is_none()));
}

#[test]
fn championship_snapshot_projects_end_to_end() {
    let data = LeagueData {
        competition: Competition::Championship,
        teams: parse_football_data_standings_json(&read_fixture("fd_standings.json")).unwrap(),
        fixtures: parse_football_data_matches_json(&read_fixture("fd_matches.json")).unwrap(),
    };
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let p = TableProjection::from_league(data, &ChartConstants::default(), now).unwrap();

    let united = p.ranked.iter().find(|t| t.team.id == 356).unwrap();
    assert_eq!(united.record.current_points, 1);
    assert_eq!(united.record.remaining, 2);
    assert_eq!(united.record.max_points, 7);
    // The postponed game has no date, so it comes first.
    assert_eq!(united.fixtures[0].label, "TBC");
    assert_eq!(united.fixtures[1].label, "H 21-04");
    assert_eq!(united.fixtures[1].difficulty, DifficultyTier::Hardest);

    let leeds = p.ranked.iter().find(|t| t.team.id == 341).unwrap();
    assert_eq!(leeds.record.max_points, 6);
    assert_eq!(p.ranked[0].team.id, 356);
}
