use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crimson_club::config::ClubConfig;
use crimson_club::models::MemberRole;
use crimson_club::profile_db::SqliteProfileStore;
use crimson_club::profile_store::ProfileStore;
use crimson_club::supabase::{SupabaseClient, SupabaseProfileStore};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crimson_club=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClubConfig::from_env();
    let supabase = config
        .supabase
        .as_ref()
        .context("SUPABASE_URL and SUPABASE_ANON_KEY must be set")?;

    let db_path = parse_db_path_arg()
        .or_else(|| config.profile_db_path.clone())
        .context("unable to resolve sqlite path")?;

    let client = SupabaseClient::new(&supabase.url, &supabase.anon_key, config.http_timeout_secs)?;
    let remote = SupabaseProfileStore::new(client);
    let profiles = remote.list_profiles().context("fetch remote profiles")?;

    let local = SqliteProfileStore::open(&db_path)?;
    let upserted = local.upsert_profiles(&profiles)?;

    let alumni = profiles
        .iter()
        .filter(|p| p.role == Some(MemberRole::Alumni))
        .count();
    let completed = profiles.iter().filter(|p| p.profile_completed).count();

    println!("Profile sync complete");
    println!("DB: {}", db_path.display());
    println!("Profiles upserted: {upserted}");
    println!(
        "Current players: {} Alumni: {} No role: {}",
        profiles
            .iter()
            .filter(|p| p.role == Some(MemberRole::CurrentPlayer))
            .count(),
        alumni,
        profiles.iter().filter(|p| p.role.is_none()).count()
    );
    println!("Completed profiles: {completed}/{}", profiles.len());

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
