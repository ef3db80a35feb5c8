use std::collections::BTreeMap;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::models::MemberProfile;
use crate::profile_store::{ProfileStore, ProfileUpdate};
use crate::stats::profile_completion;

static LINKEDIN_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?linkedin\.com/in/[a-zA-Z0-9\-_.%]+/?(\?.*)?$")
        .expect("linkedin pattern compiles")
});

static INSTAGRAM_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?instagram\.com/[a-zA-Z0-9._]+/?(?:\?.*)?$")
        .expect("instagram pattern compiles")
});

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_phone_number(raw: &str) -> bool {
    raw.is_empty() || digits_only(raw).len() == 10
}

pub fn is_valid_linkedin_url(raw: &str) -> bool {
    raw.is_empty() || LINKEDIN_URL.is_match(raw)
}

pub fn is_valid_instagram_url(raw: &str) -> bool {
    raw.is_empty() || INSTAGRAM_URL.is_match(raw)
}

pub fn is_valid_graduation_year(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || (trimmed.len() == 4 && trimmed.parse::<i32>().is_ok())
}

/// `(617) 555-0100` for ten digits, `+1 (617) 555-0100` for eleven starting with 1.
pub fn format_phone_number(raw: &str) -> String {
    let digits = digits_only(raw);
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => raw.to_string(),
    }
}

/// Message for an invalid value, or `None` when the field is fine or unchecked.
pub fn validate_field(field: &str, value: &str) -> Option<&'static str> {
    match field {
        "full_name" if value.trim().is_empty() => Some("Please enter your full name"),
        "phone_number" if !is_valid_phone_number(value) => Some("Please enter a valid phone number"),
        "linkedin_url" if !is_valid_linkedin_url(value) => Some("Please enter a valid LinkedIn URL"),
        "instagram_url" if !is_valid_instagram_url(value) => {
            Some("Please enter a valid Instagram URL")
        }
        "graduation_year" if !is_valid_graduation_year(value) => {
            Some("Please enter a valid graduation year")
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    by_field: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.by_field.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_field.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn record(&mut self, field: &str, value: &str) {
        match validate_field(field, value) {
            Some(msg) => {
                self.by_field.insert(field.to_string(), msg.to_string());
            }
            None => {
                self.by_field.remove(field);
            }
        }
    }
}

/// Editable profile fields as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub graduation_year: String,
    pub position: String,
    pub hometown: String,
    pub concentration: String,
    pub house: String,
    pub final_club: String,
    pub current_job: String,
    pub current_company: String,
    pub current_location: String,
    pub board_position: String,
    pub bio: String,
    pub linkedin_url: String,
    pub instagram_url: String,
    errors: ValidationErrors,
}

impl ProfileForm {
    pub fn from_profile(profile: &MemberProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            full_name: profile.full_name.clone(),
            email: text(&profile.email),
            phone_number: text(&profile.phone_number),
            graduation_year: profile
                .graduation_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
            position: text(&profile.position),
            hometown: text(&profile.hometown),
            concentration: text(&profile.concentration),
            house: text(&profile.house),
            final_club: text(&profile.final_club),
            current_job: text(&profile.current_job),
            current_company: text(&profile.current_company),
            current_location: text(&profile.current_location),
            board_position: text(&profile.board_position),
            bio: text(&profile.bio),
            linkedin_url: text(&profile.linkedin_url),
            instagram_url: text(&profile.instagram_url),
            errors: ValidationErrors::default(),
        }
    }

    /// Sets one field the way typing into it would: phone numbers are reformatted and the
    /// field's error is refreshed. Unknown field names are ignored.
    pub fn set_field(&mut self, field: &str, value: &str) {
        let value = if field == "phone_number" {
            format_phone_number(value)
        } else {
            value.to_string()
        };
        let Some(slot) = self.slot_mut(field) else {
            return;
        };
        *slot = value.clone();
        self.errors.record(field, &value);
    }

    /// Errors from edits so far.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Full check of every validated field.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        errors.record("full_name", &self.full_name);
        errors.record("phone_number", &self.phone_number);
        errors.record("linkedin_url", &self.linkedin_url);
        errors.record("instagram_url", &self.instagram_url);
        errors.record("graduation_year", &self.graduation_year);
        errors
    }

    pub fn to_update(&self) -> Result<ProfileUpdate> {
        let year = self.graduation_year.trim();
        let graduation_year = if year.is_empty() {
            None
        } else {
            Some(year.parse::<i32>().context("graduation year is not a number")?)
        };
        Ok(ProfileUpdate {
            full_name: Some(self.full_name.trim().to_string()).filter(|n| !n.is_empty()),
            email: Some(self.email.clone()),
            graduation_year: Some(graduation_year),
            position: Some(self.position.clone()),
            house: Some(self.house.clone()),
            concentration: Some(self.concentration.clone()),
            hometown: Some(self.hometown.clone()),
            final_club: Some(self.final_club.clone()),
            board_position: Some(self.board_position.clone()),
            bio: Some(self.bio.clone()),
            phone_number: Some(self.phone_number.clone()),
            linkedin_url: Some(self.linkedin_url.clone()),
            instagram_url: Some(self.instagram_url.clone()),
            profile_image_url: None,
            current_job: Some(self.current_job.clone()),
            current_company: Some(self.current_company.clone()),
            current_location: Some(self.current_location.clone()),
            profile_completed: None,
        })
    }

    fn slot_mut(&mut self, field: &str) -> Option<&mut String> {
        let slot = match field {
            "full_name" => &mut self.full_name,
            "email" => &mut self.email,
            "phone_number" => &mut self.phone_number,
            "graduation_year" => &mut self.graduation_year,
            "position" => &mut self.position,
            "hometown" => &mut self.hometown,
            "concentration" => &mut self.concentration,
            "house" => &mut self.house,
            "final_club" => &mut self.final_club,
            "current_job" => &mut self.current_job,
            "current_company" => &mut self.current_company,
            "current_location" => &mut self.current_location,
            "board_position" => &mut self.board_position,
            "bio" => &mut self.bio,
            "linkedin_url" => &mut self.linkedin_url,
            "instagram_url" => &mut self.instagram_url,
            _ => return None,
        };
        Some(slot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was sent to the store.
    Rejected(ValidationErrors),
    Saved(MemberProfile),
}

/// Validates, saves, and flags the profile complete once every tracked field is filled.
pub fn submit_profile_edit(
    store: &dyn ProfileStore,
    profile: &MemberProfile,
    form: &ProfileForm,
) -> Result<SubmitOutcome> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(SubmitOutcome::Rejected(errors));
    }

    let update = form.to_update()?;
    store
        .update_profile(profile.id, &update)
        .with_context(|| format!("save profile {}", profile.id))?;

    let mut saved = profile.clone();
    update.apply_to(&mut saved);

    let complete = profile_completion(&saved) == 100;
    if complete != saved.profile_completed {
        store
            .update_profile(profile.id, &ProfileUpdate::completed(complete))
            .with_context(|| format!("flag profile {} completion", profile.id))?;
        saved.profile_completed = complete;
    }
    info!(profile = %profile.id, complete, "profile saved");
    Ok(SubmitOutcome::Saved(saved))
}
