use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use uuid::Uuid;

use crimson_club::feed::{load_season_view, spawn_season_provider};
use crimson_club::fixtures::{DirFixtureSource, FixtureSource};
use crimson_club::models::{FormLetter, MemberProfile, MemberRole};
use crimson_club::profile_db::SqliteProfileStore;
use crimson_club::profile_store::ProfileStore;
use crimson_club::state::{ClubState, Delta, SeasonCommand, Selection, apply_delta};

fn fixture_source() -> DirFixtureSource {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("club");
    DirFixtureSource::new(path)
}

fn selection(season: &str) -> Selection {
    Selection {
        competition: "ivy".to_string(),
        season: season.to_string(),
    }
}

#[test]
fn season_view_combines_fixtures_and_profiles() {
    let store = SqliteProfileStore::in_memory().unwrap();
    let mut alex = MemberProfile::new(Uuid::new_v4(), "alex kim", MemberRole::CurrentPlayer);
    alex.position = Some("Forward".to_string());
    store.upsert_profiles(std::slice::from_ref(&alex)).unwrap();

    let view = load_season_view(&fixture_source(), &store, &selection("2024"));
    assert_eq!(view.record.to_string(), "1-1-1");
    assert_eq!(view.form, vec![FormLetter::L, FormLetter::T, FormLetter::W]);
    assert_eq!(view.standings.len(), 3);
    assert_eq!(view.games.len(), 4);
    assert_eq!(view.roster.len(), 3);
    assert_eq!(view.roster[0].id, Some(alex.id));
    assert_eq!(view.roster[0].position.as_deref(), Some("Forward"));
    assert!(!view.roster[1].is_profile_created);
    assert!(view.roster_degraded.is_none());
}

#[test]
fn missing_season_renders_empty_view() {
    let store = SqliteProfileStore::in_memory().unwrap();
    let view = load_season_view(&fixture_source(), &store, &selection("1999"));
    assert!(view.games.is_empty());
    assert!(view.standings.is_empty());
    assert!(view.roster.is_empty());
    assert_eq!(view.record.to_string(), "0-0-0");
    assert!(view.form.is_empty());
}

#[test]
fn stale_results_are_dropped() {
    let store = SqliteProfileStore::in_memory().unwrap();
    let mut state = ClubState::new();

    let first = state.select("ivy", "2022");
    let second = state.select("ivy", "2024");
    let (SeasonCommand::LoadSeason { token: old, .. }, SeasonCommand::LoadSeason { token: new, .. }) =
        (first, second)
    else {
        panic!("expected load commands");
    };
    assert!(new > old);

    // The newer request finishes first; the older one must not overwrite it.
    let fresh = load_season_view(&fixture_source(), &store, &selection("2024"));
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            token: new,
            view: Box::new(fresh),
        },
    );
    assert!(!state.loading);

    let stale = load_season_view(&fixture_source(), &store, &selection("2022"));
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            token: old,
            view: Box::new(stale),
        },
    );

    let view = state.view.as_ref().expect("view loaded");
    assert_eq!(view.selection.season, "2024");
    assert!(state.logs.iter().any(|l| l.contains("stale")));
}

#[test]
fn result_for_superseded_selection_is_ignored_while_loading() {
    let store = SqliteProfileStore::in_memory().unwrap();
    let mut state = ClubState::new();
    let SeasonCommand::LoadSeason { token: old, .. } = state.select("ivy", "2022") else {
        panic!("expected load command");
    };
    let _ = state.select("ivy", "2024");

    let stale = load_season_view(&fixture_source(), &store, &selection("2022"));
    apply_delta(
        &mut state,
        Delta::SeasonLoaded {
            token: old,
            view: Box::new(stale),
        },
    );
    assert!(state.loading);
    assert!(state.view.is_none());
    assert_eq!(state.selection.as_ref().map(|s| s.season.as_str()), Some("2024"));
}

#[test]
fn log_ring_is_capped() {
    let mut state = ClubState::new();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}

#[test]
fn provider_thread_serves_latest_selection() {
    let fixtures: Arc<dyn FixtureSource> = Arc::new(fixture_source());
    let store: Arc<dyn ProfileStore> = Arc::new(SqliteProfileStore::in_memory().unwrap());
    let mut state = ClubState::new();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_season_provider(tx, cmd_rx, fixtures, store, state.gate());

    cmd_tx.send(SeasonCommand::LoadCatalogue).unwrap();
    cmd_tx.send(state.select("ivy", "2021")).unwrap();
    cmd_tx.send(state.select("ivy", "2024")).unwrap();

    while state.loading || state.catalogue.seasons.is_empty() {
        let delta = rx
            .recv_timeout(Duration::from_secs(30))
            .expect("provider should answer");
        apply_delta(&mut state, delta);
    }
    cmd_tx.send(SeasonCommand::Shutdown).unwrap();
    handle.join().expect("provider thread exits");

    assert_eq!(state.catalogue.seasons.len(), 4);
    let view = state.view.as_ref().expect("view loaded");
    assert_eq!(view.selection.season, "2024");
    assert_eq!(view.record.to_string(), "1-1-1");
}
