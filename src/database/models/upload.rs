use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An image stored through `/upload`, waiting to be attached to a record.
/// `linked` flips once a record claims it; a reference is claimable once.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub reference: String,
    pub user_id: Uuid,
    pub linked: bool,
    pub created_at: DateTime<Utc>,
}
