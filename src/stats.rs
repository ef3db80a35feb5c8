use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{FormLetter, GameResult, MemberProfile, MemberRole, SeasonGameRecord, TeamRecord};

pub const RECENT_FORM_LEN: usize = 5;

/// Counting fold over played games; unplayed games (no result) are ignored.
pub fn team_record(games: &[SeasonGameRecord]) -> TeamRecord {
    games
        .iter()
        .filter_map(|g| g.result)
        .fold(TeamRecord::default(), |mut record, result| {
            match result {
                GameResult::Win => record.wins += 1,
                GameResult::Loss => record.losses += 1,
                GameResult::Tie => record.ties += 1,
            }
            record
        })
}

/// Last five played games, most recent first.
///
/// Games on the same date keep their schedule order, which callers should not depend on.
/// Unparseable dates sort after every dated game.
pub fn recent_form(games: &[SeasonGameRecord]) -> Vec<FormLetter> {
    let mut played: Vec<(Option<NaiveDateTime>, GameResult)> = games
        .iter()
        .filter_map(|g| g.result.map(|r| (parse_game_date(&g.date), r)))
        .collect();
    played.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    played
        .into_iter()
        .take(RECENT_FORM_LEN)
        .map(|(_, result)| FormLetter::from(result))
        .collect()
}

pub fn parse_game_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Tracked for everyone.
pub const BASE_COMPLETION_FIELDS: [&str; 14] = [
    "full_name",
    "email",
    "graduation_year",
    "profile_image_url",
    "position",
    "bio",
    "house",
    "concentration",
    "hometown",
    "final_club",
    "linkedin_url",
    "instagram_url",
    "board_position",
    "phone_number",
];

/// Tracked only for alumni.
pub const ALUMNI_COMPLETION_FIELDS: [&str; 3] = ["current_job", "current_company", "current_location"];

pub fn tracked_fields(role: Option<MemberRole>) -> Vec<&'static str> {
    let mut fields = BASE_COMPLETION_FIELDS.to_vec();
    if role == Some(MemberRole::Alumni) {
        fields.extend(ALUMNI_COMPLETION_FIELDS);
    }
    fields
}

/// Text counts when it has non-whitespace content.
pub fn text_present(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

/// Numbers count whenever they are set, zero included.
pub fn number_present(value: Option<i32>) -> bool {
    value.is_some()
}

pub fn field_present(profile: &MemberProfile, field: &str) -> bool {
    let text = match field {
        "full_name" => Some(profile.full_name.as_str()),
        "graduation_year" => return number_present(profile.graduation_year),
        "email" => profile.email.as_deref(),
        "profile_image_url" => profile.profile_image_url.as_deref(),
        "position" => profile.position.as_deref(),
        "bio" => profile.bio.as_deref(),
        "house" => profile.house.as_deref(),
        "concentration" => profile.concentration.as_deref(),
        "hometown" => profile.hometown.as_deref(),
        "final_club" => profile.final_club.as_deref(),
        "linkedin_url" => profile.linkedin_url.as_deref(),
        "instagram_url" => profile.instagram_url.as_deref(),
        "board_position" => profile.board_position.as_deref(),
        "phone_number" => profile.phone_number.as_deref(),
        "current_job" => profile.current_job.as_deref(),
        "current_company" => profile.current_company.as_deref(),
        "current_location" => profile.current_location.as_deref(),
        _ => None,
    };
    text_present(text)
}

/// Rounded share of tracked fields that are filled in, 0..=100.
pub fn profile_completion(profile: &MemberProfile) -> u8 {
    let fields = tracked_fields(profile.role);
    let done = fields.iter().filter(|f| field_present(profile, f)).count();
    ((done as f64 / fields.len() as f64) * 100.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionBand {
    Low,
    Medium,
    High,
}

pub fn completion_band(percentage: u8) -> CompletionBand {
    if percentage < 30 {
        CompletionBand::Low
    } else if percentage < 70 {
        CompletionBand::Medium
    } else {
        CompletionBand::High
    }
}

/// Nudge toward the next most useful missing field.
pub fn completion_tip(profile: &MemberProfile) -> &'static str {
    let mut steps: Vec<(&str, &'static str)> = vec![
        ("profile_image_url", "Add a profile photo"),
        ("bio", "Add your bio"),
        ("house", "Add your house"),
        ("concentration", "Add your concentration"),
        ("hometown", "Add your hometown"),
        ("phone_number", "Add your phone number"),
    ];
    if profile.role == Some(MemberRole::Alumni) {
        steps.push(("current_job", "Add your current job"));
        steps.push(("current_location", "Add your current location"));
    }
    steps.push(("linkedin_url", "Add your LinkedIn profile"));
    steps.push(("instagram_url", "Add your Instagram profile"));

    steps
        .into_iter()
        .find(|(field, _)| !field_present(profile, field))
        .map(|(_, tip)| tip)
        .unwrap_or("Your profile is looking great!")
}
