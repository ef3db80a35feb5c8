use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use uuid::Uuid;

use crate::fixture_cache::app_cache_dir;
use crate::models::{MemberProfile, MemberRole};
use crate::profile_store::{FieldValue, NewProfile, ProfileStore, ProfileUpdate};

const PROFILE_COLUMNS: &str = "id, full_name, email, role, graduation_year, position, house, \
    concentration, hometown, final_club, board_position, bio, phone_number, linkedin_url, \
    instagram_url, profile_image_url, current_job, current_company, current_location, \
    profile_completed";

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("profiles.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT NULL,
            role TEXT NULL,
            graduation_year INTEGER NULL,
            position TEXT NULL,
            house TEXT NULL,
            concentration TEXT NULL,
            hometown TEXT NULL,
            final_club TEXT NULL,
            board_position TEXT NULL,
            bio TEXT NULL,
            phone_number TEXT NULL,
            linkedin_url TEXT NULL,
            instagram_url TEXT NULL,
            profile_image_url TEXT NULL,
            current_job TEXT NULL,
            current_company TEXT NULL,
            current_location TEXT NULL,
            profile_completed INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_profiles_role ON profiles(role);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Profile store backed by a local SQLite file. Rows list in insertion order.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

impl SqliteProfileStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_db(path)?),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite")?;
        Self::new(conn)
    }

    /// Inserts or replaces whole rows; returns the number written.
    pub fn upsert_profiles(&self, profiles: &[MemberProfile]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().context("begin profile upsert")?;
        let mut written = 0usize;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20) \
                     ON CONFLICT(id) DO UPDATE SET \
                     full_name = excluded.full_name, email = excluded.email, role = excluded.role, \
                     graduation_year = excluded.graduation_year, position = excluded.position, \
                     house = excluded.house, concentration = excluded.concentration, \
                     hometown = excluded.hometown, final_club = excluded.final_club, \
                     board_position = excluded.board_position, bio = excluded.bio, \
                     phone_number = excluded.phone_number, linkedin_url = excluded.linkedin_url, \
                     instagram_url = excluded.instagram_url, \
                     profile_image_url = excluded.profile_image_url, \
                     current_job = excluded.current_job, current_company = excluded.current_company, \
                     current_location = excluded.current_location, \
                     profile_completed = excluded.profile_completed"
                ))
                .context("prepare profile upsert")?;
            for p in profiles {
                written += stmt
                    .execute(params![
                        p.id.to_string(),
                        p.full_name,
                        p.email,
                        p.role.map(MemberRole::as_str),
                        p.graduation_year,
                        p.position,
                        p.house,
                        p.concentration,
                        p.hometown,
                        p.final_club,
                        p.board_position,
                        p.bio,
                        p.phone_number,
                        p.linkedin_url,
                        p.instagram_url,
                        p.profile_image_url,
                        p.current_job,
                        p.current_company,
                        p.current_location,
                        p.profile_completed,
                    ])
                    .with_context(|| format!("upsert profile {}", p.id))?;
            }
        }
        tx.commit().context("commit profile upsert")?;
        Ok(written)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("profile db lock poisoned"))
    }
}

impl ProfileStore for SqliteProfileStore {
    fn list_profiles(&self) -> Result<Vec<MemberProfile>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY rowid ASC"
            ))
            .context("prepare list profiles")?;
        let rows = stmt
            .query_map([], row_to_profile)
            .context("query profiles")?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read profile row")??);
        }
        Ok(out)
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<MemberProfile>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![id.to_string()],
                row_to_profile,
            )
            .optional()
            .with_context(|| format!("load profile {id}"))?;
        row.transpose()
    }

    fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<()> {
        let changes = update.changes();
        if changes.is_empty() {
            return Ok(());
        }
        let assignments = changes
            .iter()
            .enumerate()
            .map(|(idx, (column, _))| format!("{column} = ?{}", idx + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let mut values: Vec<SqlValue> = changes.into_iter().map(|(_, v)| to_sql(v)).collect();
        values.push(SqlValue::Text(id.to_string()));
        let sql = format!(
            "UPDATE profiles SET {assignments} WHERE id = ?{}",
            values.len()
        );

        let conn = self.lock()?;
        let touched = conn
            .execute(&sql, params_from_iter(values))
            .with_context(|| format!("update profile {id}"))?;
        if touched == 0 {
            return Err(anyhow!("profile {id} not found"));
        }
        Ok(())
    }

    fn insert_profile(&self, record: &NewProfile) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO profiles (id, full_name, email, role, graduation_year, profile_completed) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                record.id.to_string(),
                record.full_name,
                record.email,
                record.role.as_str(),
                record.graduation_year,
            ],
        )
        .with_context(|| format!("insert profile {}", record.id))?;
        Ok(())
    }
}

fn to_sql(value: FieldValue) -> SqlValue {
    match value {
        FieldValue::Text(Some(s)) => SqlValue::Text(s),
        FieldValue::Int(Some(n)) => SqlValue::Integer(i64::from(n)),
        FieldValue::Bool(b) => SqlValue::Integer(i64::from(b)),
        FieldValue::Text(None) | FieldValue::Int(None) => SqlValue::Null,
    }
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Result<MemberProfile>> {
    let raw_id: String = row.get(0)?;
    let role: Option<String> = row.get(3)?;
    let id = match Uuid::parse_str(&raw_id) {
        Ok(id) => id,
        Err(err) => return Ok(Err(anyhow!("bad profile id {raw_id}: {err}"))),
    };
    Ok(Ok(MemberProfile {
        id,
        full_name: row.get(1)?,
        email: row.get(2)?,
        role: role.as_deref().and_then(MemberRole::parse),
        graduation_year: row.get(4)?,
        position: row.get(5)?,
        house: row.get(6)?,
        concentration: row.get(7)?,
        hometown: row.get(8)?,
        final_club: row.get(9)?,
        board_position: row.get(10)?,
        bio: row.get(11)?,
        phone_number: row.get(12)?,
        linkedin_url: row.get(13)?,
        instagram_url: row.get(14)?,
        profile_image_url: row.get(15)?,
        current_job: row.get(16)?,
        current_company: row.get(17)?,
        current_location: row.get(18)?,
        profile_completed: row.get(19)?,
    }))
}
