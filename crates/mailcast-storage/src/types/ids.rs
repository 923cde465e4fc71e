//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Recipient identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecipientId(pub Uuid);

/// Address identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressId(pub Uuid);
