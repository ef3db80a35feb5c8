use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::fixture_cache::shared_client;
use crate::models::MemberProfile;
use crate::profile_image::{ObjectStore, PROFILE_IMAGE_BUCKET};
use crate::profile_store::{NewProfile, ProfileStore, ProfileUpdate};
use crate::session::{AuthUser, Session, SessionProvider};

const PROFILES_TABLE: &str = "profiles";
// Oldest first, so later rows win name-key collisions the same way the SQLite store does.
const PROFILES_LIST_ORDER: &str = "created_at.asc,id.asc";

fn list_profiles_path() -> String {
    format!("rest/v1/{PROFILES_TABLE}?select=*&order={PROFILES_LIST_ORDER}")
}

/// Connection details shared by the backing-service clients. Holds the signed-in user's
/// access token once there is one, so row-level security sees the right user.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    http: &'static Client,
    access_token: Mutex<Option<String>>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, timeout_secs: u64) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http: shared_client(timeout_secs)?,
            access_token: Mutex::new(None),
        }))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.lock() {
            *guard = token;
        }
    }

    fn bearer(&self) -> String {
        let token = self
            .access_token
            .lock()
            .ok()
            .and_then(|t| t.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        format!("Bearer {token}")
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.http
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .header(AUTHORIZATION, self.bearer())
    }
}

fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(anyhow!("{what}: http {status}: {}", error_message(&body)))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// `profiles` table through the REST interface.
pub struct SupabaseProfileStore {
    client: Arc<SupabaseClient>,
}

impl SupabaseProfileStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

impl ProfileStore for SupabaseProfileStore {
    /// Rows come back in creation order, which is the order last-write-wins joins rely on.
    fn list_profiles(&self) -> Result<Vec<MemberProfile>> {
        let resp = self
            .client
            .request(reqwest::Method::GET, &list_profiles_path())
            .send()
            .context("list profiles request failed")?;
        let profiles: Vec<MemberProfile> = check(resp, "list profiles")?
            .json()
            .context("invalid profiles json")?;
        debug!(count = profiles.len(), "profiles listed");
        Ok(profiles)
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<MemberProfile>> {
        let resp = self
            .client
            .request(
                reqwest::Method::GET,
                &format!("rest/v1/{PROFILES_TABLE}?select=*&id=eq.{id}"),
            )
            .send()
            .with_context(|| format!("get profile {id} request failed"))?;
        let mut rows: Vec<MemberProfile> = check(resp, "get profile")?
            .json()
            .context("invalid profile json")?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<()> {
        let body = update.to_json();
        if body.is_empty() {
            return Ok(());
        }
        let resp = self
            .client
            .request(
                reqwest::Method::PATCH,
                &format!("rest/v1/{PROFILES_TABLE}?id=eq.{id}"),
            )
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .with_context(|| format!("update profile {id} request failed"))?;
        check(resp, "update profile")?;
        Ok(())
    }

    fn insert_profile(&self, record: &NewProfile) -> Result<()> {
        let resp = self
            .client
            .request(reqwest::Method::POST, &format!("rest/v1/{PROFILES_TABLE}"))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .context("insert profile request failed")?;
        check(resp, "insert profile")?;
        Ok(())
    }
}

/// Storage bucket for profile images.
pub struct SupabaseObjectStore {
    client: Arc<SupabaseClient>,
    bucket: String,
}

impl SupabaseObjectStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self::with_bucket(client, PROFILE_IMAGE_BUCKET)
    }

    pub fn with_bucket(client: Arc<SupabaseClient>, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

impl ObjectStore for SupabaseObjectStore {
    fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let resp = self
            .client
            .request(
                reqwest::Method::POST,
                &format!("storage/v1/object/{}/{path}", self.bucket),
            )
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .with_context(|| format!("upload {path} request failed"))?;
        check(resp, "upload image")?;
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.client.base_url(),
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    fn remove(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let resp = self
            .client
            .request(
                reqwest::Method::DELETE,
                &format!("storage/v1/object/{}", self.bucket),
            )
            .json(&json!({ "prefixes": paths }))
            .send()
            .context("remove images request failed")?;
        check(resp, "remove images")?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    WithSession { user: AuthUser },
    Bare(AuthUser),
}

/// Password auth against the hosted auth service. The session lives in memory only.
pub struct SupabaseAuth {
    client: Arc<SupabaseClient>,
    session: Mutex<Option<Session>>,
}

impl SupabaseAuth {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            session: Mutex::new(None),
        }
    }

    fn store_session(&self, session: Option<Session>) {
        self.client
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));
        if let Ok(mut guard) = self.session.lock() {
            *guard = session;
        }
    }
}

impl SessionProvider for SupabaseAuth {
    fn current_session(&self) -> Result<Option<Session>> {
        let guard = self
            .session
            .lock()
            .map_err(|_| anyhow!("session lock poisoned"))?;
        Ok(guard.clone())
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let resp = self
            .client
            .request(reqwest::Method::POST, "auth/v1/token?grant_type=password")
            .header(ACCEPT, "application/json")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .context("sign in request failed")?;
        let token: TokenResponse = check(resp, "sign in")?
            .json()
            .context("invalid sign in response")?;
        let session = Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: token.user,
        };
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser> {
        let resp = self
            .client
            .request(reqwest::Method::POST, "auth/v1/signup")
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .context("sign up request failed")?;
        let parsed: SignUpResponse = check(resp, "sign up")?
            .json()
            .context("invalid sign up response")?;
        Ok(match parsed {
            SignUpResponse::WithSession { user } => user,
            SignUpResponse::Bare(user) => user,
        })
    }

    fn sign_out(&self) -> Result<()> {
        let signed_in = self
            .session
            .lock()
            .map(|s| s.is_some())
            .unwrap_or(false);
        if signed_in {
            let resp = self
                .client
                .request(reqwest::Method::POST, "auth/v1/logout")
                .send()
                .context("sign out request failed")?;
            check(resp, "sign out")?;
        }
        self.store_session(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_listing_requests_creation_order() {
        let path = list_profiles_path();
        assert_eq!(
            path,
            "rest/v1/profiles?select=*&order=created_at.asc,id.asc"
        );
    }

    #[test]
    fn clients_share_one_http_client() {
        let a = SupabaseClient::new("https://club.example.co/", "anon", 5).unwrap();
        let b = SupabaseClient::new("https://club.example.co", "anon", 30).unwrap();
        assert!(std::ptr::eq(a.http, b.http));
        assert_eq!(a.base_url(), "https://club.example.co");
    }
}
