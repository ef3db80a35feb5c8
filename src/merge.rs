use tracing::{debug, warn};

use crate::models::{MemberProfile, MergedMember, PLACEHOLDER_IMAGE, RosterEntry};
use crate::name_key::{IdentityResolver, NameKeyResolver};
use crate::profile_store::ProfileStore;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub members: Vec<MergedMember>,
    /// Set when the profile snapshot could not be read and every member came back unmatched.
    pub degraded: Option<String>,
}

impl MergeOutcome {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// One output per input record, in input order.
pub fn merge_roster_with_profiles<R>(
    records: &[RosterEntry],
    profiles: &[MemberProfile],
    resolver: &R,
) -> Vec<MergedMember>
where
    R: IdentityResolver + ?Sized,
{
    let by_key = resolver.index(profiles);
    records
        .iter()
        .map(|entry| match by_key.get(&resolver.key_for_name(&entry.name)) {
            Some(profile) => matched_member(entry, profile),
            None => unmatched_member(entry),
        })
        .collect()
}

pub fn merge_by_name(records: &[RosterEntry], profiles: &[MemberProfile]) -> Vec<MergedMember> {
    merge_roster_with_profiles(records, profiles, &NameKeyResolver)
}

/// Reads the profile snapshot and merges against it. A failed read degrades the whole call to
/// "no profiles matched" rather than failing it.
pub fn merge_with_store<R>(
    records: &[RosterEntry],
    store: &dyn ProfileStore,
    resolver: &R,
) -> MergeOutcome
where
    R: IdentityResolver + ?Sized,
{
    match store.list_profiles() {
        Ok(profiles) => {
            let members = merge_roster_with_profiles(records, &profiles, resolver);
            debug!(
                records = records.len(),
                profiles = profiles.len(),
                matched = members.iter().filter(|m| m.is_profile_created).count(),
                "merged roster with profiles"
            );
            MergeOutcome {
                members,
                degraded: None,
            }
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "profile fetch failed; merging without profiles");
            MergeOutcome {
                members: records.iter().map(unmatched_member).collect(),
                degraded: Some(format!("{err:#}")),
            }
        }
    }
}

pub fn matched_member(entry: &RosterEntry, profile: &MemberProfile) -> MergedMember {
    MergedMember {
        id: Some(profile.id),
        name: entry.name.clone(),
        is_profile_created: true,
        is_alumni: entry.is_alumni,
        role: profile.role,
        full_name: Some(profile.full_name.clone()),
        email: profile.email.clone(),
        graduation_year: profile.graduation_year,
        position: profile.position.clone().or_else(|| entry.position.clone()),
        house: profile.house.clone(),
        concentration: profile.concentration.clone(),
        hometown: profile.hometown.clone(),
        final_club: profile.final_club.clone(),
        board_position: profile.board_position.clone(),
        bio: profile.bio.clone(),
        phone_number: profile.phone_number.clone(),
        linkedin_url: profile.linkedin_url.clone(),
        instagram_url: profile.instagram_url.clone(),
        profile_image_url: profile.profile_image_url.clone(),
        current_job: profile.current_job.clone(),
        current_company: profile.current_company.clone(),
        current_location: profile.current_location.clone(),
        profile_completed: profile.profile_completed,
        fixture: entry.extra.clone(),
    }
}

pub fn unmatched_member(entry: &RosterEntry) -> MergedMember {
    MergedMember {
        id: None,
        name: entry.name.clone(),
        is_profile_created: false,
        is_alumni: entry.is_alumni,
        role: None,
        full_name: None,
        email: None,
        graduation_year: None,
        position: entry.position.clone(),
        house: None,
        concentration: None,
        hometown: None,
        final_club: None,
        board_position: None,
        bio: None,
        phone_number: None,
        linkedin_url: None,
        instagram_url: None,
        profile_image_url: Some(PLACEHOLDER_IMAGE.to_string()),
        current_job: None,
        current_company: None,
        current_location: None,
        profile_completed: false,
        fixture: entry.extra.clone(),
    }
}
