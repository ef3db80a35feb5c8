use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::fixtures::{FixtureSource, load_roster, try_load_roster};
use crate::merge::merge_with_store;
use crate::models::{MemberRole, MergedMember, RosterEntry};
use crate::name_key::IdentityResolver;
use crate::profile_store::ProfileStore;

/// Which season counts as current and which past seasons feed the alumni universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlumniPlan {
    pub current_season: String,
    pub historical_seasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRoster {
    pub season: String,
    pub players: Vec<RosterEntry>,
    /// False when the fixture was missing or unreadable and `players` is empty because of it.
    pub loaded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlumniDirectory {
    pub members: Vec<MergedMember>,
    pub degraded: Option<String>,
    pub skipped_seasons: Vec<String>,
}

/// Past-roster names absent from the current roster, first appearance wins.
///
/// Candidates are flagged `is_alumni` since they come from alumni sourcing.
pub fn build_alumni_candidates<R>(
    current: &[RosterEntry],
    historical: &[HistoricalRoster],
    resolver: &R,
) -> Vec<RosterEntry>
where
    R: IdentityResolver + ?Sized,
{
    let current_keys: HashSet<String> = current
        .iter()
        .map(|entry| resolver.key_for_name(&entry.name))
        .collect();

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for roster in historical {
        for entry in &roster.players {
            let key = resolver.key_for_name(&entry.name);
            if current_keys.contains(&key) || !seen.insert(key) {
                continue;
            }
            let mut candidate = entry.clone();
            candidate.is_alumni = true;
            candidates.push(candidate);
        }
    }
    candidates
}

/// A created profile's role decides; otherwise the fixture's alumni flag does.
pub fn is_confirmed_alumni(member: &MergedMember) -> bool {
    match (member.is_profile_created, member.role) {
        (true, Some(role)) => role == MemberRole::Alumni,
        _ => member.is_alumni,
    }
}

pub fn select_alumni(members: Vec<MergedMember>) -> Vec<MergedMember> {
    members.into_iter().filter(is_confirmed_alumni).collect()
}

/// Loads every listed season in parallel, keeping list order. Missing years come back empty.
pub fn load_historical_rosters(
    source: &dyn FixtureSource,
    seasons: &[String],
) -> Vec<HistoricalRoster> {
    seasons
        .par_iter()
        .map(|season| match try_load_roster(source, season) {
            Ok(Some(players)) => HistoricalRoster {
                season: season.clone(),
                players,
                loaded: true,
            },
            Ok(None) => {
                warn!(season = %season, "historical roster missing; skipping season");
                HistoricalRoster {
                    season: season.clone(),
                    players: Vec::new(),
                    loaded: false,
                }
            }
            Err(err) => {
                warn!(season = %season, error = %format!("{err:#}"), "historical roster failed to load; skipping season");
                HistoricalRoster {
                    season: season.clone(),
                    players: Vec::new(),
                    loaded: false,
                }
            }
        })
        .collect()
}

pub fn load_alumni_directory<R>(
    source: &dyn FixtureSource,
    store: &dyn ProfileStore,
    plan: &AlumniPlan,
    resolver: &R,
) -> AlumniDirectory
where
    R: IdentityResolver + Sync + ?Sized,
{
    let (current, historical) = rayon::join(
        || load_roster(source, &plan.current_season),
        || load_historical_rosters(source, &plan.historical_seasons),
    );
    let skipped_seasons = historical
        .iter()
        .filter(|r| !r.loaded)
        .map(|r| r.season.clone())
        .collect::<Vec<_>>();

    let candidates = build_alumni_candidates(&current, &historical, resolver);
    let merged = merge_with_store(&candidates, store, resolver);
    let members = select_alumni(merged.members);
    info!(
        candidates = candidates.len(),
        alumni = members.len(),
        skipped = skipped_seasons.len(),
        "alumni directory built"
    );

    AlumniDirectory {
        members,
        degraded: merged.degraded,
        skipped_seasons,
    }
}
