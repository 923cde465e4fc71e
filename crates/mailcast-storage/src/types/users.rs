//! User types.

use chrono::{DateTime, Utc};

use super::ids::UserId;

/// User record.
///
/// One row per authenticated identity. The external subject id is unique
/// and never mutated after creation.
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    /// External identity-provider subject id.
    pub subject_id: String,
    /// Externally-exposed opaque id (`usr_…`).
    pub public_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a user.
#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub subject_id: String,
    pub public_id: String,
}
