//! Contact queries.
//!
//! A contact is a directed row (owner -> other); a mutual, confirmed contact
//! is two rows, one per direction, each independently verifiable.  The
//! confirmation flow touches both directions and therefore runs inside a
//! single transaction.

use chrono::Utc;

use crate::database::Store;
use crate::error::Result;
use crate::models::ContactEntry;

impl Store {
    /// Whether the directed row owner -> other exists.
    pub async fn contact_exists(&self, owner_id: i64, other_id: i64) -> Result<bool> {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM contacts WHERE owner_id = ?1 AND other_id = ?2)",
        )
        .bind(owner_id)
        .bind(other_id)
        .fetch_one(self.pool())
        .await?;

        Ok(present)
    }

    /// Fetch the verified flag of the directed row, if it exists.
    pub async fn contact_verified(&self, owner_id: i64, other_id: i64) -> Result<Option<bool>> {
        let verified: Option<bool> = sqlx::query_scalar(
            "SELECT verified FROM contacts WHERE owner_id = ?1 AND other_id = ?2",
        )
        .bind(owner_id)
        .bind(other_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(verified)
    }

    /// Insert a directed contact row, skipping if it already exists.
    /// Returns whether a row was actually inserted.
    pub async fn insert_contact(&self, owner_id: i64, other_id: i64, verified: bool) -> Result<bool> {
        let affected = sqlx::query(
            "INSERT OR IGNORE INTO contacts (owner_id, other_id, verified, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(owner_id)
        .bind(other_id)
        .bind(verified)
        .bind(Utc::now())
        .execute(self.pool())
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    /// Confirm a pending request from `other` to `owner`: mark the reverse
    /// (other -> owner) row verified and upsert the forward (owner -> other)
    /// row as verified, atomically.
    ///
    /// Returns `false` without changing anything when no reverse row exists;
    /// a caller cannot mint a mutual pair unilaterally.
    pub async fn confirm_contact(&self, owner_id: i64, other_id: i64) -> Result<bool> {
        let mut tx = self.pool().begin().await?;

        let reverse = sqlx::query(
            "UPDATE contacts SET verified = 1 WHERE owner_id = ?1 AND other_id = ?2",
        )
        .bind(other_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if reverse == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO contacts (owner_id, other_id, verified, created_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT (owner_id, other_id) DO UPDATE SET verified = 1",
        )
        .bind(owner_id)
        .bind(other_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(owner_id, other_id, "contact confirmed");
        Ok(true)
    }

    /// Delete the directed row owner -> other.  Returns whether a row was
    /// actually removed.
    pub async fn delete_contact(&self, owner_id: i64, other_id: i64) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM contacts WHERE owner_id = ?1 AND other_id = ?2")
            .bind(owner_id)
            .bind(other_id)
            .execute(self.pool())
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    /// The owner's directed contact rows joined with each counterpart's
    /// profile.
    pub async fn contacts_of(&self, owner_id: i64) -> Result<Vec<ContactEntry>> {
        let entries = sqlx::query_as::<_, ContactEntry>(
            "SELECT m.member_id, m.email, m.username, m.first_name, m.last_name, c.verified
             FROM contacts c
             JOIN members m ON m.member_id = c.other_id
             WHERE c.owner_id = ?1
             ORDER BY m.last_name ASC, m.first_name ASC",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// Rows directed at the member (requests and links from others), joined
    /// with each requester's profile.
    pub async fn contacts_toward(&self, other_id: i64) -> Result<Vec<ContactEntry>> {
        let entries = sqlx::query_as::<_, ContactEntry>(
            "SELECT m.member_id, m.email, m.username, m.first_name, m.last_name, c.verified
             FROM contacts c
             JOIN members m ON m.member_id = c.owner_id
             WHERE c.other_id = ?1
             ORDER BY m.last_name ASC, m.first_name ASC",
        )
        .bind(other_id)
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_member(store: &Store, email: &str) -> i64 {
        store
            .insert_member(email, email, "Test", "Member")
            .await
            .unwrap()
            .member_id
    }

    #[tokio::test]
    async fn insert_is_directed_and_idempotent() {
        let store = Store::open_in_memory().await.unwrap();
        let a = seed_member(&store, "a@example.com").await;
        let b = seed_member(&store, "b@example.com").await;

        assert!(store.insert_contact(a, b, false).await.unwrap());
        assert!(!store.insert_contact(a, b, false).await.unwrap());

        assert!(store.contact_exists(a, b).await.unwrap());
        assert!(!store.contact_exists(b, a).await.unwrap());
        assert_eq!(store.contact_verified(a, b).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn confirm_produces_two_verified_rows() {
        let store = Store::open_in_memory().await.unwrap();
        let a = seed_member(&store, "a@example.com").await;
        let b = seed_member(&store, "b@example.com").await;

        // B requested A earlier; A confirms.
        store.insert_contact(b, a, false).await.unwrap();
        assert!(store.confirm_contact(a, b).await.unwrap());

        assert_eq!(store.contact_verified(a, b).await.unwrap(), Some(true));
        assert_eq!(store.contact_verified(b, a).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn confirm_without_pending_request_changes_nothing() {
        let store = Store::open_in_memory().await.unwrap();
        let a = seed_member(&store, "a@example.com").await;
        let b = seed_member(&store, "b@example.com").await;

        assert!(!store.confirm_contact(a, b).await.unwrap());
        assert!(!store.contact_exists(a, b).await.unwrap());
        assert!(!store.contact_exists(b, a).await.unwrap());
    }

    #[tokio::test]
    async fn listings_follow_row_direction() {
        let store = Store::open_in_memory().await.unwrap();
        let a = seed_member(&store, "a@example.com").await;
        let b = seed_member(&store, "b@example.com").await;

        store.insert_contact(a, b, false).await.unwrap();

        let mine = store.contacts_of(a).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].member_id, b);
        assert!(!mine[0].verified);

        let toward_b = store.contacts_toward(b).await.unwrap();
        assert_eq!(toward_b.len(), 1);
        assert_eq!(toward_b[0].member_id, a);

        assert!(store.contacts_of(b).await.unwrap().is_empty());

        assert!(store.delete_contact(a, b).await.unwrap());
        assert!(!store.delete_contact(a, b).await.unwrap());
        assert!(store.contacts_of(a).await.unwrap().is_empty());
    }
}
