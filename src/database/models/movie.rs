use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub genre: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub name: String,
    pub image: Option<String>,
    pub genre: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MovieChanges {
    pub name: Option<String>,
    pub image: Option<Option<String>>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}
