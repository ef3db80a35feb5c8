use std::collections::HashMap;

use crate::models::MemberProfile;

/// Canonical comparison key for a person's display name.
///
/// Only case and surrounding whitespace are folded. Accents, punctuation and inner
/// spacing are left alone, and every blank name maps to the same empty key.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Joins static identity records to profiles.
///
/// Callers only ever ask "which profile belongs to this roster name", so a stable-id join can
/// replace the name heuristic without touching the merge or alumni code.
pub trait IdentityResolver {
    fn key_for_name(&self, name: &str) -> String;

    fn key_for_profile(&self, profile: &MemberProfile) -> String;

    /// Later profiles overwrite earlier ones that share a key.
    fn index<'a>(&self, profiles: &'a [MemberProfile]) -> HashMap<String, &'a MemberProfile> {
        let mut by_key = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            by_key.insert(self.key_for_profile(profile), profile);
        }
        by_key
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NameKeyResolver;

impl IdentityResolver for NameKeyResolver {
    fn key_for_name(&self, name: &str) -> String {
        normalize(name)
    }

    fn key_for_profile(&self, profile: &MemberProfile) -> String {
        normalize(&profile.full_name)
    }
}
