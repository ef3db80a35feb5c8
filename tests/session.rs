use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use uuid::Uuid;

use crimson_club::models::MemberRole;
use crimson_club::profile_db::SqliteProfileStore;
use crimson_club::profile_store::{NewProfile, ProfileStore};
use crimson_club::session::{
    AuthService, AuthUser, Session, SessionEvent, SessionProvider, SignUpForm, register_member,
};

#[derive(Default)]
struct FakeAuth {
    session: Mutex<Option<Session>>,
    fail_lookup: bool,
}

impl FakeAuth {
    fn signed_in(id: Uuid) -> Self {
        Self {
            session: Mutex::new(Some(session_for(id))),
            fail_lookup: false,
        }
    }
}

fn session_for(id: Uuid) -> Session {
    Session {
        access_token: "token".to_string(),
        refresh_token: None,
        user: AuthUser {
            id,
            email: Some("member@college.edu".to_string()),
        },
    }
}

impl SessionProvider for FakeAuth {
    fn current_session(&self) -> Result<Option<Session>> {
        if self.fail_lookup {
            return Err(anyhow!("auth service unavailable"));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if password != "hunter2" {
            return Err(anyhow!("Invalid login credentials"));
        }
        let mut session = session_for(Uuid::new_v4());
        session.user.email = Some(email.to_string());
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    fn sign_up(&self, email: &str, _password: &str, _full_name: &str) -> Result<AuthUser> {
        Ok(AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        })
    }

    fn sign_out(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

fn store_with(id: Uuid, name: &str) -> SqliteProfileStore {
    let store = SqliteProfileStore::in_memory().unwrap();
    store
        .insert_profile(&NewProfile::new(id, name, None, 2018, 2024))
        .unwrap();
    store
}

#[test]
fn state_starts_loading() {
    let auth = AuthService::new(FakeAuth::default());
    let state = auth.state();
    assert!(state.loading);
    assert!(state.user.is_none());
}

#[test]
fn bootstrap_resolves_session_and_profile() {
    let id = Uuid::new_v4();
    let store = store_with(id, "Sam Lee");
    let auth = AuthService::new(FakeAuth::signed_in(id));

    let state = auth.bootstrap(&store);
    assert!(!state.loading);
    let user = state.user.expect("signed in");
    assert_eq!(user.user.id, id);
    assert_eq!(
        user.profile.map(|p| p.full_name),
        Some("Sam Lee".to_string())
    );
    assert_eq!(auth.state().user.map(|u| u.user.id), Some(id));
}

#[test]
fn bootstrap_failure_leaves_signed_out() {
    let auth = AuthService::new(FakeAuth {
        fail_lookup: true,
        ..FakeAuth::default()
    });
    let state = auth.bootstrap(&SqliteProfileStore::in_memory().unwrap());
    assert!(!state.loading);
    assert!(state.user.is_none());
}

#[test]
fn signed_in_user_without_profile_keeps_session() {
    let id = Uuid::new_v4();
    let auth = AuthService::new(FakeAuth::signed_in(id));
    let state = auth.bootstrap(&SqliteProfileStore::in_memory().unwrap());
    let user = state.user.expect("signed in");
    assert!(user.profile.is_none());
}

#[test]
fn listeners_fire_until_unsubscribed() {
    let auth = AuthService::new(FakeAuth::default());
    let store = SqliteProfileStore::in_memory().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&events);
    let sub = auth.subscribe(move |event, session| {
        sink.lock().unwrap().push((event, session.is_some()));
    });
    assert_eq!(auth.listener_count(), 1);

    auth.sign_in("sam@college.edu", "hunter2", &store).unwrap();
    auth.sign_out().unwrap();
    assert!(auth.sign_in("sam@college.edu", "wrong", &store).is_err());

    assert!(auth.unsubscribe(sub));
    assert_eq!(auth.listener_count(), 0);
    auth.sign_in("sam@college.edu", "hunter2", &store).unwrap();

    let seen = events.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(SessionEvent::SignedIn, true), (SessionEvent::SignedOut, false)]
    );
}

#[test]
fn unsubscribing_twice_reports_false() {
    let auth = AuthService::new(FakeAuth::default());
    let first = auth.subscribe(|_, _| {});
    let _second = auth.subscribe(|_, _| {});
    assert!(auth.unsubscribe(first));
    assert_eq!(auth.listener_count(), 1);
}

#[test]
fn register_member_creates_profile_with_derived_role() {
    let auth = AuthService::new(FakeAuth::default());
    let store = SqliteProfileStore::in_memory().unwrap();

    let player = register_member(
        &auth,
        &store,
        &SignUpForm {
            full_name: " Taylor Reed ".to_string(),
            email: "taylor@college.edu".to_string(),
            password: "pw".to_string(),
            graduation_year: "2027".to_string(),
        },
        2024,
    )
    .unwrap();
    let alum = register_member(
        &auth,
        &store,
        &SignUpForm {
            full_name: "Chris Wong".to_string(),
            email: "chris@example.com".to_string(),
            password: "pw".to_string(),
            graduation_year: "2019".to_string(),
        },
        2024,
    )
    .unwrap();

    let player = store.get_profile(player).unwrap().expect("player profile");
    assert_eq!(player.full_name, "Taylor Reed");
    assert_eq!(player.role, Some(MemberRole::CurrentPlayer));
    assert_eq!(player.email.as_deref(), Some("taylor@college.edu"));
    let alum = store.get_profile(alum).unwrap().expect("alum profile");
    assert_eq!(alum.role, Some(MemberRole::Alumni));
}

#[test]
fn register_member_rejects_bad_input_before_sign_up() {
    let auth = AuthService::new(FakeAuth::default());
    let store = SqliteProfileStore::in_memory().unwrap();
    let form = SignUpForm {
        full_name: "Chris Wong".to_string(),
        email: "chris@example.com".to_string(),
        password: "pw".to_string(),
        graduation_year: "next year".to_string(),
    };
    assert!(register_member(&auth, &store, &form, 2024).is_err());
    let blank_name = SignUpForm {
        full_name: "  ".to_string(),
        graduation_year: "2020".to_string(),
        ..form
    };
    assert!(register_member(&auth, &store, &blank_name, 2024).is_err());
    assert!(store.list_profiles().unwrap().is_empty());
}
