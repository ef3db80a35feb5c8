use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const PLACEHOLDER_IMAGE: &str = "/images/profilepic.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    CurrentPlayer,
    Alumni,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberRole::CurrentPlayer => "current_player",
            MemberRole::Alumni => "alumni",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "current_player" => Some(MemberRole::CurrentPlayer),
            "alumni" => Some(MemberRole::Alumni),
            _ => None,
        }
    }
}

/// A member's self-managed row in the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<MemberRole>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(default)]
    pub concentration: Option<String>,
    #[serde(default)]
    pub hometown: Option<String>,
    #[serde(default)]
    pub final_club: Option<String>,
    #[serde(default)]
    pub board_position: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub current_job: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default)]
    pub current_location: Option<String>,
    #[serde(default)]
    pub profile_completed: bool,
}

impl MemberProfile {
    /// A bare profile as written at sign-up.
    pub fn new(id: Uuid, full_name: impl Into<String>, role: MemberRole) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: None,
            role: Some(role),
            graduation_year: None,
            position: None,
            house: None,
            concentration: None,
            hometown: None,
            final_club: None,
            board_position: None,
            bio: None,
            phone_number: None,
            linkedin_url: None,
            instagram_url: None,
            profile_image_url: None,
            current_job: None,
            current_company: None,
            current_location: None,
            profile_completed: false,
        }
    }
}

/// One player line of a season roster fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, alias = "isAlumni")]
    pub is_alumni: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RosterEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            is_alumni: false,
            extra: Map::new(),
        }
    }
}

/// Roster identity joined with the matching profile, if any. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedMember {
    pub id: Option<Uuid>,
    pub name: String,
    pub is_profile_created: bool,
    pub is_alumni: bool,
    pub role: Option<MemberRole>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub graduation_year: Option<i32>,
    pub position: Option<String>,
    pub house: Option<String>,
    pub concentration: Option<String>,
    pub hometown: Option<String>,
    pub final_club: Option<String>,
    pub board_position: Option<String>,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub linkedin_url: Option<String>,
    pub instagram_url: Option<String>,
    pub profile_image_url: Option<String>,
    pub current_job: Option<String>,
    pub current_company: Option<String>,
    pub current_location: Option<String>,
    pub profile_completed: bool,
    pub fixture: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonGameRecord {
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub score: Option<GameScore>,
    #[serde(default)]
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl fmt::Display for TeamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormLetter {
    W,
    L,
    T,
}

impl FormLetter {
    pub fn as_char(self) -> char {
        match self {
            FormLetter::W => 'W',
            FormLetter::L => 'L',
            FormLetter::T => 'T',
        }
    }
}

impl From<GameResult> for FormLetter {
    fn from(result: GameResult) -> Self {
        match result {
            GameResult::Win => FormLetter::W,
            GameResult::Loss => FormLetter::L,
            GameResult::Tie => FormLetter::T,
        }
    }
}

impl fmt::Display for FormLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    #[serde(default, alias = "name")]
    pub team: String,
    #[serde(default, alias = "position")]
    pub rank: Option<u32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    #[serde(deserialize_with = "year_string")]
    pub year: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "isActive")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

/// `seasons.json`: the season catalogue and competitions the club plays in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonsConfig {
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
    #[serde(default, rename = "alumniSeasons", deserialize_with = "year_strings")]
    pub alumni_seasons: Vec<String>,
}

impl SeasonsConfig {
    pub fn active_season(&self) -> Option<&Season> {
        self.seasons.iter().find(|s| s.is_active)
    }

    /// Seasons whose rosters feed the alumni universe. Falls back to every non-active season.
    pub fn historical_seasons(&self) -> Vec<String> {
        if !self.alumni_seasons.is_empty() {
            return self.alumni_seasons.clone();
        }
        self.seasons
            .iter()
            .filter(|s| !s.is_active)
            .map(|s| s.year.clone())
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearKey {
    Text(String),
    Number(i64),
}

impl From<YearKey> for String {
    fn from(key: YearKey) -> Self {
        match key {
            YearKey::Text(s) => s.trim().to_string(),
            YearKey::Number(n) => n.to_string(),
        }
    }
}

fn year_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    YearKey::deserialize(deserializer).map(String::from)
}

fn year_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let keys = Vec::<YearKey>::deserialize(deserializer)?;
    Ok(keys.into_iter().map(String::from).collect())
}
