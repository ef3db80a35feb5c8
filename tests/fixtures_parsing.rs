use std::fs;
use std::path::PathBuf;

use crimson_club::fixtures::{
    DirFixtureSource, FixtureSource, load_roster, load_schedule, load_seasons, load_standings,
    parse_roster_json, parse_schedule_json, parse_seasons_json, parse_standings_json,
    try_load_roster,
};
use crimson_club::models::GameResult;

fn fixture_root() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("club");
    path
}

fn read_fixture(name: &str) -> String {
    let mut path = fixture_root();
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_seasons_fixture() {
    let raw = read_fixture("seasons.json");
    let cfg = parse_seasons_json(&raw).expect("fixture should parse");
    assert_eq!(cfg.seasons.len(), 4);
    assert_eq!(cfg.active_season().map(|s| s.year.as_str()), Some("2024"));
    assert_eq!(cfg.competitions[0].id, "ivy");
    assert_eq!(cfg.alumni_seasons, vec!["2021", "2022", "2023"]);
    assert_eq!(cfg.historical_seasons(), vec!["2021", "2022", "2023"]);
}

#[test]
fn historical_seasons_fall_back_to_inactive_years() {
    let raw = r#"{"seasons":[{"year":"2024","isActive":true},{"year":"2023"}]}"#;
    let cfg = parse_seasons_json(raw).expect("should parse");
    assert!(cfg.competitions.is_empty());
    assert_eq!(cfg.historical_seasons(), vec!["2023"]);
}

#[test]
fn parses_roster_object_and_array_shapes() {
    let current = parse_roster_json(&read_fixture("rosters/2024.json")).expect("object roster");
    assert_eq!(current.len(), 3);
    assert_eq!(current[0].name, "Alex Kim");
    assert_eq!(current[0].position.as_deref(), Some("Midfielder"));
    assert_eq!(current[0].extra.get("number").and_then(|v| v.as_u64()), Some(8));

    let bare = parse_roster_json(&read_fixture("rosters/2021.json")).expect("array roster");
    assert_eq!(bare.len(), 2);
    assert_eq!(bare[1].name, "Chris Wong");

    let flagged = parse_roster_json(&read_fixture("rosters/2022.json")).expect("flagged roster");
    assert!(flagged[2].is_alumni);
    assert!(!flagged[0].is_alumni);
}

#[test]
fn empty_and_null_payloads_parse_to_empty() {
    assert!(parse_roster_json("").unwrap().is_empty());
    assert!(parse_roster_json("null").unwrap().is_empty());
    assert!(parse_roster_json(r#"{"players":null}"#).unwrap().is_empty());
    assert!(parse_schedule_json("  ").unwrap().is_empty());
    assert!(parse_standings_json("null").unwrap().is_empty());
    assert!(parse_roster_json("42").is_err());
}

#[test]
fn parses_schedule_fixture() {
    let games = parse_schedule_json(&read_fixture("schedule/ivy/2024.json")).expect("schedule");
    assert_eq!(games.len(), 4);
    assert_eq!(games[0].home_team, "Harvard");
    assert_eq!(games[0].result, Some(GameResult::Win));
    assert_eq!(games[1].score.map(|s| (s.home, s.away)), Some((3, 0)));
    assert_eq!(games[3].result, None);
    assert_eq!(games[3].time.as_deref(), Some("TBD"));
}

#[test]
fn parses_standings_fixture() {
    let rows = parse_standings_json(&read_fixture("standings/ivy/2024.json")).expect("standings");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].team, "Harvard");
    assert_eq!(rows[1].rank, Some(2));
    assert_eq!(rows[2].extra.get("streak").and_then(|v| v.as_str()), Some("L3"));
}

#[test]
fn directory_source_reports_missing_files_as_none() {
    let source = DirFixtureSource::new(fixture_root());
    assert!(source.fetch("rosters/2023.json").unwrap().is_none());
    assert!(try_load_roster(&source, "2023").unwrap().is_none());
    assert_eq!(try_load_roster(&source, "2021").unwrap().map(|r| r.len()), Some(2));
}

#[test]
fn loaders_degrade_to_empty_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("rosters")).unwrap();
    fs::write(dir.path().join("rosters/2024.json"), "{ not json").unwrap();
    let source = DirFixtureSource::new(dir.path());

    assert!(load_roster(&source, "2024").is_empty());
    assert!(load_roster(&source, "1999").is_empty());
    assert!(load_schedule(&source, "ivy", "2024").is_empty());
    assert!(load_standings(&source, "ivy", "2024").is_empty());
    assert!(load_seasons(&source).seasons.is_empty());
}
