use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "crimson_club";
const CACHE_FILE: &str = "fixture_cache.json";
const USER_AGENT: &str = concat!("crimson_club/", env!("CARGO_PKG_VERSION"));

static CACHE: Mutex<Option<FixtureCacheFile>> = Mutex::new(None);
static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client for fixture and backing-service requests. The first caller's timeout sticks.
pub fn shared_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct FixtureCacheFile {
    version: u32,
    entries: HashMap<String, CachedFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFixture {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// GETs a fixture document, revalidating against the on-disk copy.
///
/// `Ok(None)` means the server has no such resource (404/410).
pub fn fetch_fixture_cached(client: &Client, url: &str) -> Result<Option<String>> {
    let cached = cached_entry(url);

    let mut req = client.get(url);
    if let Some(entry) = cached.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("fixture request {url}"))?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        return match cached {
            Some(entry) => {
                debug!(url, "fixture not modified");
                Ok(Some(entry.body))
            }
            None => Err(anyhow!("received 304 for {url} without a cached body")),
        };
    }
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Ok(None);
    }

    let etag = header_string(resp.headers(), ETAG);
    let last_modified = header_string(resp.headers(), LAST_MODIFIED);
    let body = resp.text().context("failed reading fixture body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status} for {url}"));
    }

    store_entry(
        url,
        CachedFixture {
            body: body.clone(),
            etag,
            last_modified,
            fetched_at: now_secs(),
        },
    );
    Ok(Some(body))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn header_string(
    headers: &reqwest::header::HeaderMap,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn cached_entry(url: &str) -> Option<CachedFixture> {
    let mut guard = CACHE.lock().ok()?;
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.entries.get(url).cloned()
}

fn store_entry(url: &str, entry: CachedFixture) {
    let Ok(mut guard) = CACHE.lock() else {
        return;
    };
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(url.to_string(), entry);
    if let Err(err) = save_cache_file(cache) {
        debug!(error = %err, "fixture cache not persisted");
    }
}

fn load_cache_file() -> FixtureCacheFile {
    let Some(raw) = cache_path().and_then(|path| fs::read_to_string(path).ok()) else {
        return FixtureCacheFile::default();
    };
    let cache = serde_json::from_str::<FixtureCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return FixtureCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &FixtureCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize fixture cache")?;
    fs::write(&tmp, json).context("write fixture cache")?;
    fs::rename(&tmp, &path).context("swap fixture cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
