use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Datelike;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crimson_club::alumni::load_alumni_directory;
use crimson_club::config::ClubConfig;
use crimson_club::feed::spawn_season_provider;
use crimson_club::fixtures::{FixtureSource, fixture_source_for, load_seasons};
use crimson_club::name_key::NameKeyResolver;
use crimson_club::options::filter_options;
use crimson_club::profile_db::SqliteProfileStore;
use crimson_club::profile_image::display_image;
use crimson_club::profile_store::{CachedProfileStore, ProfileStore};
use crimson_club::search::{AlumniFilters, apply_search_and_filters};
use crimson_club::state::{ClubState, SeasonCommand, apply_delta};
use crimson_club::stats::{completion_band, completion_tip, profile_completion};
use crimson_club::supabase::{SupabaseClient, SupabaseProfileStore};

const SEASON_WAIT: Duration = Duration::from_secs(60);

const USAGE: &str = "usage:
  crimson_club team [SEASON] [--competition ID]
  crimson_club alumni [--search TERM] [--house HOUSE] [--club CLUB] [--year YEAR]
  crimson_club profile <UUID>";

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
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "team" => run_team(&config, rest),
        "alumni" => run_alumni(&config, rest),
        "profile" => run_profile(&config, rest),
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => Err(anyhow!("unknown command `{other}`\n{USAGE}")),
    }
}

fn open_store(config: &ClubConfig) -> Result<Arc<dyn ProfileStore>> {
    if let Some(supabase) = config.supabase.as_ref() {
        let client = SupabaseClient::new(&supabase.url, &supabase.anon_key, config.http_timeout_secs)?;
        info!(url = %supabase.url, "using hosted profile store");
        return Ok(Arc::new(CachedProfileStore::new(SupabaseProfileStore::new(
            client,
        ))));
    }
    let path: PathBuf = config
        .profile_db_path
        .clone()
        .context("unable to resolve sqlite path")?;
    info!(db = %path.display(), "using local profile store");
    Ok(Arc::new(SqliteProfileStore::open(&path)?))
}

fn fixture_source(config: &ClubConfig) -> Arc<dyn FixtureSource> {
    Arc::from(fixture_source_for(
        &config.fixture_root,
        config.http_timeout_secs,
    ))
}

fn run_team(config: &ClubConfig, args: &[String]) -> Result<()> {
    let fixtures = fixture_source(config);
    let store = open_store(config)?;
    let competition = flag_value(args, "--competition").unwrap_or_else(|| config.competition.clone());

    let mut state = ClubState::new();
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let provider = spawn_season_provider(tx, cmd_rx, Arc::clone(&fixtures), store, state.gate());

    let season = match positional(args) {
        Some(season) => season,
        None => {
            let catalogue = load_seasons(fixtures.as_ref());
            config
                .resolve_current_season(&catalogue)
                .context("no season given and no active season configured")?
        }
    };
    let _ = cmd_tx.send(state.select(&competition, &season));

    while state.loading {
        let delta = rx
            .recv_timeout(SEASON_WAIT)
            .context("timed out waiting for season data")?;
        apply_delta(&mut state, delta);
    }
    let _ = cmd_tx.send(SeasonCommand::Shutdown);
    let _ = provider.join();

    let Some(view) = state.view.as_ref() else {
        bail!("season view missing after load");
    };
    println!("{} {}", view.selection.competition, view.selection.season);
    println!("Record: {}", view.record);
    let form = view.form.iter().map(|f| f.to_string()).collect::<Vec<_>>();
    println!(
        "Form:   {}",
        if form.is_empty() { "-".to_string() } else { form.join(" ") }
    );
    if !view.standings.is_empty() {
        println!();
        for row in &view.standings {
            println!(
                "{:>2}. {:<24} {}-{}-{}",
                row.rank.unwrap_or_default(),
                row.team,
                row.wins,
                row.losses,
                row.ties
            );
        }
    }
    println!();
    println!("Roster ({}):", view.roster.len());
    for member in &view.roster {
        println!(
            "  {:<28} {:<12} {}",
            member.name,
            member.position.as_deref().unwrap_or("-"),
            if member.is_profile_created { "profile" } else { "" }
        );
    }
    for line in &state.logs {
        if line.starts_with("[WARN]") {
            eprintln!("{line}");
        }
    }
    Ok(())
}

fn run_alumni(config: &ClubConfig, args: &[String]) -> Result<()> {
    let fixtures = fixture_source(config);
    let store = open_store(config)?;
    let catalogue = load_seasons(fixtures.as_ref());
    let plan = config
        .alumni_plan(&catalogue)
        .context("no current season configured")?;

    let directory = load_alumni_directory(fixtures.as_ref(), store.as_ref(), &plan, &NameKeyResolver);
    if let Some(reason) = directory.degraded.as_ref() {
        eprintln!("profiles unavailable: {reason}");
    }
    if !directory.skipped_seasons.is_empty() {
        eprintln!("skipped seasons: {}", directory.skipped_seasons.join(", "));
    }

    let filters = AlumniFilters {
        house: flag_value(args, "--house").unwrap_or_default(),
        final_club: flag_value(args, "--club").unwrap_or_default(),
        graduation_year: flag_value(args, "--year").unwrap_or_default(),
    };
    let options = filter_options(chrono::Local::now().year());
    if !filters.graduation_year.is_empty()
        && !options.graduation_years.contains(&filters.graduation_year)
    {
        eprintln!(
            "note: {} is outside the directory's class years",
            filters.graduation_year
        );
    }
    let term = flag_value(args, "--search").unwrap_or_default();

    let hits = apply_search_and_filters(&directory.members, &term, &filters);
    println!("{} alumni", hits.len());
    for member in hits {
        let class = member
            .graduation_year
            .map(|y| format!("'{:02}", y % 100))
            .unwrap_or_default();
        let work = match (member.current_job.as_deref(), member.current_company.as_deref()) {
            (Some(job), Some(company)) => format!("{job} @ {company}"),
            (Some(job), None) => job.to_string(),
            (None, Some(company)) => company.to_string(),
            (None, None) => String::new(),
        };
        println!("  {:<28} {:<4} {}", member.name, class, work);
    }
    Ok(())
}

fn run_profile(config: &ClubConfig, args: &[String]) -> Result<()> {
    let raw = positional(args).context("profile id required")?;
    let id = Uuid::parse_str(raw.trim()).with_context(|| format!("invalid profile id `{raw}`"))?;
    let store = open_store(config)?;
    let profile = store
        .get_profile(id)?
        .with_context(|| format!("no profile {id}"))?;

    let pct = profile_completion(&profile);
    println!("{}", profile.full_name);
    println!(
        "Role:       {}",
        profile.role.map(|r| r.as_str()).unwrap_or("unknown")
    );
    println!("Image:      {}", display_image(&profile));
    println!("Completion: {pct}% ({:?})", completion_band(pct));
    println!("Tip:        {}", completion_tip(&profile));
    Ok(())
}

fn positional(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !arg.contains('=');
            continue;
        }
        if !arg.trim().is_empty() {
            return Some(arg.clone());
        }
    }
    None
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value.trim().to_string());
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            return Some(next.trim().to_string());
        }
    }
    None
}
