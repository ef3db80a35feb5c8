use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::MemberProfile;
use crate::profile_store::{NewProfile, ProfileStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Authentication backend. Owns credentials; this crate only asks it questions.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Result<Option<Session>>;

    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Creates the auth user. `full_name` travels as user metadata.
    fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser>;

    fn sign_out(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedInUser {
    pub user: AuthUser,
    pub profile: Option<MemberProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<SignedInUser>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

type Listener = Arc<dyn Fn(SessionEvent, Option<&Session>) + Send + Sync>;

/// Handle returned by [`AuthService::subscribe`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

/// Session lifecycle for one signed-in client.
pub struct AuthService<P> {
    provider: P,
    state: Mutex<AuthState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl<P: SessionProvider> AuthService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: Mutex::new(AuthState::default()),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> AuthState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Resolves the current session and its profile. Any failure leaves the client signed out.
    pub fn bootstrap(&self, store: &dyn ProfileStore) -> AuthState {
        self.set_state(AuthState {
            user: None,
            loading: true,
        });
        let user = match self.provider.current_session() {
            Ok(Some(session)) => Some(signed_in_user(session.user, store)),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "session bootstrap failed");
                None
            }
        };
        let state = AuthState {
            user,
            loading: false,
        };
        self.set_state(state.clone());
        state
    }

    pub fn sign_in(
        &self,
        email: &str,
        password: &str,
        store: &dyn ProfileStore,
    ) -> Result<Session> {
        let session = self.provider.sign_in(email, password)?;
        self.set_state(AuthState {
            user: Some(signed_in_user(session.user.clone(), store)),
            loading: false,
        });
        info!(user = %session.user.id, "signed in");
        self.notify(SessionEvent::SignedIn, Some(&session));
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.provider.sign_out()?;
        self.set_state(AuthState {
            user: None,
            loading: false,
        });
        self.notify(SessionEvent::SignedOut, None);
        Ok(())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(SessionEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription { id }
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let Ok(mut listeners) = self.listeners.lock() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn set_state(&self, next: AuthState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    fn notify(&self, event: SessionEvent, session: Option<&Session>) {
        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let snapshot: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(event, session);
        }
    }
}

fn signed_in_user(user: AuthUser, store: &dyn ProfileStore) -> SignedInUser {
    let profile = match store.get_profile(user.id) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(user = %user.id, error = %format!("{err:#}"), "profile lookup failed");
            None
        }
    };
    SignedInUser { user, profile }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub graduation_year: String,
}

/// Creates the auth user and its profile row; returns the new member id.
pub fn register_member<P: SessionProvider>(
    auth: &AuthService<P>,
    store: &dyn ProfileStore,
    form: &SignUpForm,
    current_year: i32,
) -> Result<Uuid> {
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        bail!("Please enter your full name");
    }
    let graduation_year = form
        .graduation_year
        .trim()
        .parse::<i32>()
        .map_err(|_| anyhow!("Please enter a valid graduation year"))?;

    let user = auth
        .provider()
        .sign_up(form.email.trim(), &form.password, full_name)
        .context("create auth user")?;
    let email = user
        .email
        .clone()
        .or_else(|| Some(form.email.trim().to_string()));
    let record = NewProfile::new(user.id, full_name, email, graduation_year, current_year);
    store
        .insert_profile(&record)
        .with_context(|| format!("create profile for {}", user.id))?;
    info!(user = %user.id, role = record.role.as_str(), "member registered");
    Ok(user.id)
}
