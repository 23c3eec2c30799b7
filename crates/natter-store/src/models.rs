//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` so handlers can return rows directly as
//! JSON, and `sqlx::FromRow` so queries map rows without hand-written glue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A provisioned member identity.
///
/// Members are created by account-management flows outside this service and
/// are immutable here; the backend only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Member {
    /// Unique numeric identifier.
    pub member_id: i64,
    /// Unique email address (matched case-insensitively).
    pub email: String,
    /// Public handle shown in chats.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// When the member was provisioned.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A named group conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Chat {
    /// Unique numeric identifier.
    pub chat_id: i64,
    /// Human-readable chat name.
    pub name: String,
    /// When the chat was created.
    pub created_at: DateTime<Utc>,
}

/// Chat id and name pair returned by the chat-lookup query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ChatSummary {
    pub chat_id: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// One directed contact row joined with the counterpart member's profile.
///
/// `member_id` names the member on the far side of the row: for rows owned by
/// the caller that is the contact, for rows directed at the caller it is the
/// requester.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ContactEntry {
    pub member_id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether this direction of the relationship has been verified.
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Demo note
// ---------------------------------------------------------------------------

/// The worked-example CRUD row: a message keyed by unique name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct DemoNote {
    pub name: String,
    pub message: String,
}
