use crate::models::MergedMember;

/// Structured directory filters. Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlumniFilters {
    pub house: String,
    pub final_club: String,
    pub graduation_year: String,
}

impl AlumniFilters {
    pub fn is_empty(&self) -> bool {
        self.house.is_empty() && self.final_club.is_empty() && self.graduation_year.is_empty()
    }

    pub fn matches(&self, member: &MergedMember) -> bool {
        (self.house.is_empty() || member.house.as_deref() == Some(self.house.as_str()))
            && (self.final_club.is_empty()
                || member.final_club.as_deref() == Some(self.final_club.as_str()))
            && (self.graduation_year.is_empty()
                || member
                    .graduation_year
                    .is_some_and(|y| y.to_string() == self.graduation_year))
    }
}

/// Free-text haystack: name, concentration, hometown, current job, location and company.
pub fn search_haystack(member: &MergedMember) -> String {
    [
        Some(member.name.as_str()),
        member.concentration.as_deref(),
        member.hometown.as_deref(),
        member.current_job.as_deref(),
        member.current_location.as_deref(),
        member.current_company.as_deref(),
    ]
    .iter()
    .map(|field| field.unwrap_or(""))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Case-insensitive substring match. The term is lowercased but not trimmed.
pub fn matches_search(member: &MergedMember, term: &str) -> bool {
    search_haystack(member).contains(&term.to_lowercase())
}

pub fn search_alumni<'a>(members: &'a [MergedMember], term: &str) -> Vec<&'a MergedMember> {
    members.iter().filter(|m| matches_search(m, term)).collect()
}

pub fn filter_alumni<'a>(
    members: &'a [MergedMember],
    filters: &AlumniFilters,
) -> Vec<&'a MergedMember> {
    members.iter().filter(|m| filters.matches(m)).collect()
}

/// Search (skipped for a blank term) then filters; the result keeps input order.
pub fn apply_search_and_filters<'a>(
    members: &'a [MergedMember],
    term: &str,
    filters: &AlumniFilters,
) -> Vec<&'a MergedMember> {
    let searching = !term.trim().is_empty();
    members
        .iter()
        .filter(|m| !searching || matches_search(m, term))
        .filter(|m| filters.matches(m))
        .collect()
}
