//! Profile persistence.
//!
//! `ProfileStore` is the seam between handlers and storage. `PgProfileStore`
//! is used when `DATABASE_URL` is set; `InMemoryProfileStore` otherwise, and in tests.
//! Both derive `profile_completed` from the data on every write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::profile::ProfileRow;
use crate::profile::completeness::is_complete;
use crate::profile::models::{Profile, ProfileData};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile already exists")]
    AlreadyExists,

    #[error("profile not found")]
    NotFound,

    #[error("invalid profile data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Fails with `AlreadyExists` if the user has a profile.
    async fn create(&self, user_id: Uuid, data: ProfileData) -> Result<Profile, StoreError>;

    /// Merges `patch` into the stored data in one atomic step.
    /// Fails with `NotFound` if there is no profile, `InvalidData` if the result does not parse.
    async fn update(&self, user_id: Uuid, patch: &Map<String, Value>) -> Result<Profile, StoreError>;

    /// Fails with `NotFound` if there is no profile.
    async fn delete(&self, user_id: Uuid) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn create(&self, user_id: Uuid, data: ProfileData) -> Result<Profile, StoreError> {
        let completed = is_complete(&data);
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            INSERT INTO profiles (id, data, profile_completed)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(Json(&data))
        .bind(completed)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::AlreadyExists)?;
        info!("Created profile for user {user_id} (completed={completed})");
        Ok(row.into())
    }

    async fn update(&self, user_id: Uuid, patch: &Map<String, Value>) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps concurrent merges from overwriting each other
        let current: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM profiles WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or(StoreError::NotFound)?;

        let data = current.data.0.merged(patch)?;
        let completed = is_complete(&data);
        let row: ProfileRow = sqlx::query_as(
            r#"
            UPDATE profiles
            SET data = $2, profile_completed = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(Json(&data))
        .bind(completed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        info!("Deleted profile for user {user_id}");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, Profile>>,
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn create(&self, user_id: Uuid, data: ProfileData) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&user_id) {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        let profile = Profile {
            id: user_id,
            profile_completed: is_complete(&data),
            data,
            created_at: now,
            updated_at: now,
        };
        profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn update(&self, user_id: Uuid, patch: &Map<String, Value>) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        let data = profile.data.merged(patch)?;
        profile.profile_completed = is_complete(&data);
        profile.data = data;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .remove(&user_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
