use std::path::PathBuf;

use crate::alumni::AlumniPlan;
use crate::models::SeasonsConfig;
use crate::profile_db;

const DEFAULT_FIXTURE_ROOT: &str = "public/data";
const DEFAULT_COMPETITION: &str = "ivy";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubConfig {
    pub supabase: Option<SupabaseSettings>,
    pub fixture_root: String,
    pub competition: String,
    pub current_season: Option<String>,
    pub historical_seasons: Option<Vec<String>>,
    pub profile_db_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl ClubConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| {
            lookup(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let supabase = match (opt("SUPABASE_URL"), opt("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseSettings { url, anon_key }),
            _ => None,
        };

        Self {
            supabase,
            fixture_root: opt("CLUB_FIXTURE_ROOT").unwrap_or_else(|| DEFAULT_FIXTURE_ROOT.to_string()),
            competition: opt("CLUB_COMPETITION").unwrap_or_else(|| DEFAULT_COMPETITION.to_string()),
            current_season: opt("CLUB_CURRENT_SEASON"),
            historical_seasons: opt("CLUB_HISTORICAL_SEASONS").map(|raw| parse_season_list(&raw)),
            profile_db_path: opt("CLUB_PROFILE_DB")
                .map(PathBuf::from)
                .or_else(profile_db::default_db_path),
            http_timeout_secs: opt("CLUB_HTTP_TIMEOUT_SECS")
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .clamp(2, 120),
        }
    }

    /// Configured season, else the catalogue's active one.
    pub fn resolve_current_season(&self, seasons: &SeasonsConfig) -> Option<String> {
        self.current_season
            .clone()
            .or_else(|| seasons.active_season().map(|s| s.year.clone()))
    }

    pub fn alumni_plan(&self, seasons: &SeasonsConfig) -> Option<AlumniPlan> {
        let current_season = self.resolve_current_season(seasons)?;
        let historical_seasons = self
            .historical_seasons
            .clone()
            .unwrap_or_else(|| seasons.historical_seasons());
        Some(AlumniPlan {
            current_season,
            historical_seasons,
        })
    }
}

pub fn parse_season_list(raw: &str) -> Vec<String> {
    raw.split([',', ';', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::Season;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ClubConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]));
        assert!(cfg.supabase.is_none());
        assert_eq!(cfg.fixture_root, "public/data");
        assert_eq!(cfg.competition, "ivy");
        assert_eq!(cfg.http_timeout_secs, 10);
        assert!(cfg.historical_seasons.is_none());
    }

    #[test]
    fn explicit_values_override_catalogue() {
        let cfg = ClubConfig::from_lookup(lookup(&[
            ("CLUB_CURRENT_SEASON", "2025"),
            ("CLUB_HISTORICAL_SEASONS", "2021, 2022;2023"),
            ("CLUB_HTTP_TIMEOUT_SECS", "900"),
        ]));
        assert_eq!(cfg.http_timeout_secs, 120);

        let seasons = SeasonsConfig {
            seasons: vec![Season {
                year: "2024".to_string(),
                label: "2024".to_string(),
                is_active: true,
            }],
            ..SeasonsConfig::default()
        };
        let plan = cfg.alumni_plan(&seasons).unwrap();
        assert_eq!(plan.current_season, "2025");
        assert_eq!(plan.historical_seasons, vec!["2021", "2022", "2023"]);
    }
}
