use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::profile::models::{Profile, ProfileData};

/// One row of the `profiles` table. The profile document is stored as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub data: Json<ProfileData>,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            data: row.data.0,
            profile_completed: row.profile_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
