use std::sync::Mutex;

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{MemberProfile, MemberRole};

/// CRUD over member profiles, keyed by id.
pub trait ProfileStore: Send + Sync {
    /// Every profile, in the store's natural order.
    fn list_profiles(&self) -> Result<Vec<MemberProfile>>;

    fn get_profile(&self, id: Uuid) -> Result<Option<MemberProfile>>;

    fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<()>;

    fn insert_profile(&self, record: &NewProfile) -> Result<()>;
}

/// Row written at sign-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub graduation_year: i32,
    pub role: MemberRole,
}

impl NewProfile {
    pub fn new(
        id: Uuid,
        full_name: impl Into<String>,
        email: Option<String>,
        graduation_year: i32,
        current_year: i32,
    ) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email,
            graduation_year,
            role: role_for_graduation_year(graduation_year, current_year),
        }
    }
}

/// Students graduating within the next four years are on the current team.
pub fn role_for_graduation_year(graduation_year: i32, current_year: i32) -> MemberRole {
    if (current_year..=current_year + 4).contains(&graduation_year) {
        MemberRole::CurrentPlayer
    } else {
        MemberRole::Alumni
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Int(Option<i32>),
    Bool(bool),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(Some(s)) => Value::String(s.clone()),
            FieldValue::Int(Some(n)) => Value::from(*n),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Text(None) | FieldValue::Int(None) => Value::Null,
        }
    }
}

/// Partial profile update. `None` leaves a column untouched; a blank string clears it, except
/// for `full_name`, where a blank value is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub graduation_year: Option<Option<i32>>,
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
    pub profile_completed: Option<bool>,
}

impl ProfileUpdate {
    pub fn image(url: Option<String>) -> Self {
        Self {
            profile_image_url: Some(url.unwrap_or_default()),
            ..Self::default()
        }
    }

    pub fn completed(done: bool) -> Self {
        Self {
            profile_completed: Some(done),
            ..Self::default()
        }
    }

    /// Column/value pairs in a fixed column order.
    pub fn changes(&self) -> Vec<(&'static str, FieldValue)> {
        let texts: [(&'static str, &Option<String>); 16] = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("position", &self.position),
            ("house", &self.house),
            ("concentration", &self.concentration),
            ("hometown", &self.hometown),
            ("final_club", &self.final_club),
            ("board_position", &self.board_position),
            ("bio", &self.bio),
            ("phone_number", &self.phone_number),
            ("linkedin_url", &self.linkedin_url),
            ("instagram_url", &self.instagram_url),
            ("profile_image_url", &self.profile_image_url),
            ("current_job", &self.current_job),
            ("current_company", &self.current_company),
            ("current_location", &self.current_location),
        ];

        let mut out = Vec::new();
        for (column, value) in texts {
            let Some(raw) = value else {
                continue;
            };
            let text = blank_to_none(raw);
            // A name can be replaced but never cleared.
            if column == "full_name" && text.is_none() {
                continue;
            }
            out.push((column, FieldValue::Text(text)));
        }
        if let Some(year) = self.graduation_year {
            out.push(("graduation_year", FieldValue::Int(year)));
        }
        if let Some(done) = self.profile_completed {
            out.push(("profile_completed", FieldValue::Bool(done)));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }

    pub fn to_json(&self) -> Map<String, Value> {
        self.changes()
            .into_iter()
            .map(|(column, value)| (column.to_string(), value.to_json()))
            .collect()
    }

    /// Applies the update to an in-memory copy, mirroring what the store persists.
    pub fn apply_to(&self, profile: &mut MemberProfile) {
        for (column, value) in self.changes() {
            match (column, value) {
                ("graduation_year", FieldValue::Int(year)) => profile.graduation_year = year,
                ("profile_completed", FieldValue::Bool(done)) => profile.profile_completed = done,
                (column, FieldValue::Text(text)) => {
                    if let Some(slot) = text_slot(profile, column) {
                        *slot = text;
                    } else if column == "full_name"
                        && let Some(name) = text
                    {
                        profile.full_name = name;
                    }
                }
                _ => {}
            }
        }
    }
}

fn text_slot<'a>(profile: &'a mut MemberProfile, column: &str) -> Option<&'a mut Option<String>> {
    let slot = match column {
        "email" => &mut profile.email,
        "position" => &mut profile.position,
        "house" => &mut profile.house,
        "concentration" => &mut profile.concentration,
        "hometown" => &mut profile.hometown,
        "final_club" => &mut profile.final_club,
        "board_position" => &mut profile.board_position,
        "bio" => &mut profile.bio,
        "phone_number" => &mut profile.phone_number,
        "linkedin_url" => &mut profile.linkedin_url,
        "instagram_url" => &mut profile.instagram_url,
        "profile_image_url" => &mut profile.profile_image_url,
        "current_job" => &mut profile.current_job,
        "current_company" => &mut profile.current_company,
        "current_location" => &mut profile.current_location,
        _ => return None,
    };
    Some(slot)
}

fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Keeps the last `list_profiles` snapshot; any write through this wrapper drops it.
pub struct CachedProfileStore<S> {
    inner: S,
    snapshot: Mutex<Option<Vec<MemberProfile>>>,
}

impl<S: ProfileStore> CachedProfileStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshot: Mutex::new(None),
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = None;
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: ProfileStore> ProfileStore for CachedProfileStore<S> {
    fn list_profiles(&self) -> Result<Vec<MemberProfile>> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| anyhow!("profile snapshot lock poisoned"))?;
        if let Some(profiles) = guard.as_ref() {
            return Ok(profiles.clone());
        }
        let profiles = self.inner.list_profiles()?;
        *guard = Some(profiles.clone());
        Ok(profiles)
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<MemberProfile>> {
        self.inner.get_profile(id)
    }

    fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<()> {
        let res = self.inner.update_profile(id, update);
        self.invalidate();
        res
    }

    fn insert_profile(&self, record: &NewProfile) -> Result<()> {
        let res = self.inner.insert_profile(record);
        self.invalidate();
        res
    }
}

impl<S: ProfileStore + ?Sized> ProfileStore for Box<S> {
    fn list_profiles(&self) -> Result<Vec<MemberProfile>> {
        (**self).list_profiles()
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<MemberProfile>> {
        (**self).get_profile(id)
    }

    fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<()> {
        (**self).update_profile(id, update)
    }

    fn insert_profile(&self, record: &NewProfile) -> Result<()> {
        (**self).insert_profile(record)
    }
}
