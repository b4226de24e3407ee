//! Profile Repository
//!
//! SQLite-backed implementation of Repository<UserProfile>.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::db::not_initialized;
use super::traits::Repository;
use crate::domain::{DomainError, DomainResult, UserId, UserProfile};

/// SQLite implementation of the profile repository
pub struct ProfileRepository {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl ProfileRepository {
    pub fn new(conn: Arc<Mutex<Option<Connection>>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Repository<UserProfile> for ProfileRepository {
    async fn create(&self, entity: &UserProfile) -> DomainResult<UserProfile> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (user_id, display_name, email, photo_url, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                entity.user_id.as_str(),
                entity.display_name,
                entity.email,
                entity.photo_url,
                entity.created_at
            ],
        )?;
        if inserted == 0 {
            return Err(DomainError::InvalidInput(format!(
                "Profile {} already exists",
                entity.user_id
            )));
        }

        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<UserProfile>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let profile = conn
            .query_row(
                "SELECT user_id, display_name, email, photo_url, created_at
                 FROM users WHERE user_id = ?",
                params![id.as_str()],
                row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    async fn list(&self) -> DomainResult<Vec<UserProfile>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(
            "SELECT user_id, display_name, email, photo_url, created_at FROM users
             ORDER BY created_at ASC, user_id ASC",
        )?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    async fn update(&self, entity: &UserProfile) -> DomainResult<UserProfile> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute(
            "UPDATE users SET display_name = ?, email = ?, photo_url = ? WHERE user_id = ?",
            params![
                entity.display_name,
                entity.email,
                entity.photo_url,
                entity.user_id.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Profile {}", entity.user_id)));
        }

        Ok(entity.clone())
    }
}

fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        user_id: UserId::new(row.get::<_, String>(0)?),
        display_name: row.get(1)?,
        email: row.get(2)?,
        photo_url: row.get(3)?,
        created_at: row.get(4)?,
    })
}
