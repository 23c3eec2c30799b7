//! Chat and chat-membership queries.
//!
//! Membership mutations are the hot spot for races (two concurrent adds of
//! the same pair): the composite primary key on `chat_members` plus
//! `INSERT OR IGNORE` makes the terminal insert atomic, and the batch add
//! runs inside a single transaction.

use chrono::Utc;

use crate::database::Store;
use crate::error::Result;
use crate::models::{Chat, ChatSummary, Member};

impl Store {
    // ------------------------------------------------------------------
    // Chats
    // ------------------------------------------------------------------

    /// Create a chat, returning the stored row.
    pub async fn create_chat(&self, name: &str) -> Result<Chat> {
        let chat = sqlx::query_as::<_, Chat>(
            "INSERT INTO chats (name, created_at) VALUES (?1, ?2)
             RETURNING chat_id, name, created_at",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        tracing::info!(chat_id = chat.chat_id, "chat created");
        Ok(chat)
    }

    /// Whether a chat with this id exists.
    pub async fn chat_exists(&self, chat_id: i64) -> Result<bool> {
        let present: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chats WHERE chat_id = ?1)")
                .bind(chat_id)
                .fetch_one(self.pool())
                .await?;

        Ok(present)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Current member-id set of a chat, ordered ascending.
    pub async fn chat_member_ids(&self, chat_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT member_id FROM chat_members WHERE chat_id = ?1 ORDER BY member_id ASC",
        )
        .bind(chat_id)
        .fetch_all(self.pool())
        .await?;

        Ok(ids)
    }

    /// Whether (chat, member) is a current membership.
    pub async fn membership_exists(&self, chat_id: i64, member_id: i64) -> Result<bool> {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM chat_members WHERE chat_id = ?1 AND member_id = ?2)",
        )
        .bind(chat_id)
        .bind(member_id)
        .fetch_one(self.pool())
        .await?;

        Ok(present)
    }

    /// Insert the given members into the chat, skipping pairs that already
    /// exist.  Runs in a single transaction; returns the ids actually added.
    pub async fn add_chat_members(&self, chat_id: i64, member_ids: &[i64]) -> Result<Vec<i64>> {
        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let mut added = Vec::new();
        for &member_id in member_ids {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO chat_members (chat_id, member_id, joined_at)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(chat_id)
            .bind(member_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                added.push(member_id);
            }
        }

        tx.commit().await?;
        Ok(added)
    }

    /// Delete a membership row.  Returns whether a row was actually removed.
    pub async fn remove_chat_member(&self, chat_id: i64, member_id: i64) -> Result<bool> {
        let affected =
            sqlx::query("DELETE FROM chat_members WHERE chat_id = ?1 AND member_id = ?2")
                .bind(chat_id)
                .bind(member_id)
                .execute(self.pool())
                .await?
                .rows_affected();

        Ok(affected > 0)
    }

    /// Member profiles of everyone in the chat.
    pub async fn chat_roster(&self, chat_id: i64) -> Result<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT m.member_id, m.email, m.username, m.first_name, m.last_name, m.created_at
             FROM chat_members cm
             JOIN members m ON m.member_id = cm.member_id
             WHERE cm.chat_id = ?1
             ORDER BY m.member_id ASC",
        )
        .bind(chat_id)
        .fetch_all(self.pool())
        .await?;

        Ok(members)
    }

    /// All chats the member belongs to.
    pub async fn chats_for_member(&self, member_id: i64) -> Result<Vec<ChatSummary>> {
        let chats = sqlx::query_as::<_, ChatSummary>(
            "SELECT c.chat_id, c.name
             FROM chat_members cm
             JOIN chats c ON c.chat_id = cm.chat_id
             WHERE cm.member_id = ?1
             ORDER BY c.chat_id ASC",
        )
        .bind(member_id)
        .fetch_all(self.pool())
        .await?;

        Ok(chats)
    }
}
