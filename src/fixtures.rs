use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::fixture_cache::{fetch_fixture_cached, shared_client};
use crate::models::{RosterEntry, SeasonGameRecord, SeasonsConfig, StandingRow};

/// Read-only, versioned fixture documents addressed by relative path.
pub trait FixtureSource: Send + Sync {
    /// Raw document body, or `Ok(None)` when the resource does not exist.
    fn fetch(&self, path: &str) -> Result<Option<String>>;
}

pub fn seasons_path() -> String {
    "seasons.json".to_string()
}

pub fn roster_path(year: &str) -> String {
    format!("rosters/{year}.json")
}

pub fn standings_path(competition: &str, year: &str) -> String {
    format!("standings/{competition}/{year}.json")
}

pub fn schedule_path(competition: &str, year: &str) -> String {
    format!("schedule/{competition}/{year}.json")
}

/// Fixture tree on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirFixtureSource {
    root: PathBuf,
}

impl DirFixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FixtureSource for DirFixtureSource {
    fn fetch(&self, path: &str) -> Result<Option<String>> {
        let full = self.root.join(path);
        match fs::read_to_string(&full) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read fixture {}", full.display())),
        }
    }
}

/// Fixture tree served over HTTP(S), cached with conditional requests.
#[derive(Debug, Clone)]
pub struct HttpFixtureSource {
    base_url: String,
    timeout_secs: u64,
}

impl HttpFixtureSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout_secs,
        }
    }
}

impl FixtureSource for HttpFixtureSource {
    fn fetch(&self, path: &str) -> Result<Option<String>> {
        let client = shared_client(self.timeout_secs)?;
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        fetch_fixture_cached(client, &url)
    }
}

/// Picks the source from a root that is either a URL or a directory.
pub fn fixture_source_for(root: &str, timeout_secs: u64) -> Box<dyn FixtureSource> {
    if root.starts_with("http://") || root.starts_with("https://") {
        Box::new(HttpFixtureSource::new(root, timeout_secs))
    } else {
        Box::new(DirFixtureSource::new(root))
    }
}

pub fn parse_seasons_json(raw: &str) -> Result<SeasonsConfig> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(SeasonsConfig::default());
    }
    serde_json::from_str(trimmed).context("invalid seasons json")
}

/// Accepts `{ "players": [...] }` or a bare array of players.
pub fn parse_roster_json(raw: &str) -> Result<Vec<RosterEntry>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid roster json")?;
    let players = match root {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map.remove("players").unwrap_or(Value::Array(Vec::new())),
        _ => return Err(anyhow!("roster json is neither an object nor an array")),
    };
    if players.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(players).context("invalid roster players")
}

#[derive(Debug, Deserialize)]
struct StandingsDoc {
    #[serde(default)]
    teams: Vec<StandingRow>,
}

pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingRow>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let doc: StandingsDoc = serde_json::from_str(trimmed).context("invalid standings json")?;
    Ok(doc.teams)
}

#[derive(Debug, Deserialize)]
struct ScheduleDoc {
    #[serde(default)]
    games: Vec<SeasonGameRecord>,
}

pub fn parse_schedule_json(raw: &str) -> Result<Vec<SeasonGameRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let doc: ScheduleDoc = serde_json::from_str(trimmed).context("invalid schedule json")?;
    Ok(doc.games)
}

/// Strict roster read: `Ok(None)` for a missing fixture, `Err` for transport or parse failure.
pub fn try_load_roster(source: &dyn FixtureSource, year: &str) -> Result<Option<Vec<RosterEntry>>> {
    let path = roster_path(year);
    let Some(body) = source.fetch(&path)? else {
        return Ok(None);
    };
    parse_roster_json(&body)
        .with_context(|| format!("roster {year}"))
        .map(Some)
}

pub fn load_seasons(source: &dyn FixtureSource) -> SeasonsConfig {
    load_or_default(source, &seasons_path(), "seasons", parse_seasons_json)
}

pub fn load_roster(source: &dyn FixtureSource, year: &str) -> Vec<RosterEntry> {
    load_or_default(source, &roster_path(year), "roster", parse_roster_json)
}

pub fn load_standings(
    source: &dyn FixtureSource,
    competition: &str,
    year: &str,
) -> Vec<StandingRow> {
    load_or_default(
        source,
        &standings_path(competition, year),
        "standings",
        parse_standings_json,
    )
}

pub fn load_schedule(
    source: &dyn FixtureSource,
    competition: &str,
    year: &str,
) -> Vec<SeasonGameRecord> {
    load_or_default(
        source,
        &schedule_path(competition, year),
        "schedule",
        parse_schedule_json,
    )
}

fn load_or_default<T: Default>(
    source: &dyn FixtureSource,
    path: &str,
    kind: &str,
    parse: fn(&str) -> Result<T>,
) -> T {
    let body = match source.fetch(path) {
        Ok(Some(body)) => body,
        Ok(None) => {
            warn!(kind, path, "fixture missing; using empty default");
            return T::default();
        }
        Err(err) => {
            warn!(kind, path, error = %format!("{err:#}"), "fixture fetch failed; using empty default");
            return T::default();
        }
    };
    match parse(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(kind, path, error = %format!("{err:#}"), "fixture unreadable; using empty default");
            T::default()
        }
    }
}
