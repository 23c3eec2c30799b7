//! Demo-note queries: the worked example of the storage layer.
//!
//! Kept deliberately small; new contributors can read this file end to end
//! before touching the chat or contact modules.

use crate::database::Store;
use crate::error::Result;
use crate::models::DemoNote;

impl Store {
    /// Insert a note, returning the stored row.
    ///
    /// A duplicate name surfaces as a uniqueness violation in the returned
    /// error ([`StoreError::is_unique_violation`]).
    ///
    /// [`StoreError::is_unique_violation`]: crate::StoreError::is_unique_violation
    pub async fn insert_note(&self, name: &str, message: &str) -> Result<DemoNote> {
        let note = sqlx::query_as::<_, DemoNote>(
            "INSERT INTO demo_notes (name, message) VALUES (?1, ?2)
             RETURNING name, message",
        )
        .bind(name)
        .bind(message)
        .fetch_one(self.pool())
        .await?;

        Ok(note)
    }

    /// Fetch a note by exact name.
    pub async fn get_note(&self, name: &str) -> Result<Option<DemoNote>> {
        let note =
            sqlx::query_as::<_, DemoNote>("SELECT name, message FROM demo_notes WHERE name = ?1")
                .bind(name)
                .fetch_optional(self.pool())
                .await?;

        Ok(note)
    }

    /// All notes, ordered by name.
    pub async fn list_notes(&self) -> Result<Vec<DemoNote>> {
        let notes =
            sqlx::query_as::<_, DemoNote>("SELECT name, message FROM demo_notes ORDER BY name ASC")
                .fetch_all(self.pool())
                .await?;

        Ok(notes)
    }

    /// Update the message of an existing note.  Returns whether a row matched.
    pub async fn update_note(&self, name: &str, message: &str) -> Result<bool> {
        let affected = sqlx::query("UPDATE demo_notes SET message = ?2 WHERE name = ?1")
            .bind(name)
            .bind(message)
            .execute(self.pool())
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    /// Delete a note.  Returns whether a row was actually removed.
    pub async fn delete_note(&self, name: &str) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM demo_notes WHERE name = ?1")
            .bind(name)
            .execute(self.pool())
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn crud_round_trip() {
        let store = Store::open_in_memory().await.unwrap();

        let note = store.insert_note("greeting", "hello").await.unwrap();
        assert_eq!(
            note,
            DemoNote {
                name: "greeting".into(),
                message: "hello".into()
            }
        );

        assert!(store.update_note("greeting", "hi there").await.unwrap());
        let fetched = store.get_note("greeting").await.unwrap().unwrap();
        assert_eq!(fetched.message, "hi there");

        assert_eq!(store.list_notes().await.unwrap().len(), 1);

        assert!(store.delete_note("greeting").await.unwrap());
        assert!(store.get_note("greeting").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_name_is_a_unique_violation() {
        let store = Store::open_in_memory().await.unwrap();

        store.insert_note("greeting", "hello").await.unwrap();
        let err = store.insert_note("greeting", "again").await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = Store::open_in_memory().await.unwrap();

        assert!(!store.update_note("ghost", "boo").await.unwrap());
        assert!(!store.delete_note("ghost").await.unwrap());
    }
}
