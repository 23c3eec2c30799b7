//! v001 -- Initial schema creation.
//!
//! Creates the five core tables: `members`, `chats`, `chat_members`,
//! `contacts`, and `demo_notes`.

/// SQL executed when upgrading from version 0 to version 1.
pub const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Members
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS members (
    member_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    email      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    username   TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    created_at TEXT NOT NULL                  -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Chats
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chats (
    chat_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Chat membership.  The composite primary key enforces at most one
-- row per (chat, member) pair; concurrent adds rely on it.
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chat_members (
    chat_id    INTEGER NOT NULL,
    member_id  INTEGER NOT NULL,
    joined_at  TEXT NOT NULL,

    PRIMARY KEY (chat_id, member_id),
    FOREIGN KEY (chat_id)   REFERENCES chats(chat_id)     ON DELETE CASCADE,
    FOREIGN KEY (member_id) REFERENCES members(member_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_chat_members_member ON chat_members(member_id);

-- ----------------------------------------------------------------
-- Contacts.  Directed rows; a mutual contact is two rows, one per
-- direction, each independently verifiable.
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS contacts (
    owner_id   INTEGER NOT NULL,
    other_id   INTEGER NOT NULL,
    verified   INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1
    created_at TEXT NOT NULL,

    PRIMARY KEY (owner_id, other_id),
    FOREIGN KEY (owner_id) REFERENCES members(member_id) ON DELETE CASCADE,
    FOREIGN KEY (other_id) REFERENCES members(member_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_contacts_other ON contacts(other_id);

-- ----------------------------------------------------------------
-- Demo notes (worked example of the storage layer)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS demo_notes (
    name    TEXT PRIMARY KEY NOT NULL,
    message TEXT NOT NULL
);
"#;
