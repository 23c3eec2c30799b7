//! Member queries.
//!
//! Members are provisioned outside the HTTP surface (seed scripts, tests,
//! future account flows); everything else here is read-only lookups consumed
//! by the pipeline guards and the directory/search routes.

use chrono::Utc;

use crate::database::Store;
use crate::error::Result;
use crate::models::Member;

impl Store {
    /// Insert a member, returning the stored row.
    ///
    /// A duplicate email surfaces as a uniqueness violation in the returned
    /// error ([`StoreError::is_unique_violation`]).
    ///
    /// [`StoreError::is_unique_violation`]: crate::StoreError::is_unique_violation
    pub async fn insert_member(
        &self,
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Member> {
        let member = sqlx::query_as::<_, Member>(
            "INSERT INTO members (email, username, first_name, last_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING member_id, email, username, first_name, last_name, created_at",
        )
        .bind(email)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        Ok(member)
    }

    /// Whether a member with this id exists.
    pub async fn member_exists(&self, member_id: i64) -> Result<bool> {
        let present: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE member_id = ?1)")
                .bind(member_id)
                .fetch_one(self.pool())
                .await?;

        Ok(present)
    }

    /// Fetch a single member profile.
    pub async fn get_member(&self, member_id: i64) -> Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT member_id, email, username, first_name, last_name, created_at
             FROM members WHERE member_id = ?1",
        )
        .bind(member_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(member)
    }

    /// Resolve an email address to its member id.
    pub async fn member_id_for_email(&self, email: &str) -> Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT member_id FROM members WHERE email = ?1")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        Ok(id)
    }

    /// Of the given ids, return the ones that exist, ordered ascending.
    pub async fn existing_member_ids(&self, member_ids: &[i64]) -> Result<Vec<i64>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT member_id FROM members WHERE member_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in member_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY member_id ASC");

        let found: Vec<i64> = qb.build_query_scalar().fetch_all(self.pool()).await?;
        Ok(found)
    }

    /// Case-insensitive substring search over names, username and email.
    pub async fn search_members(&self, query: &str) -> Result<Vec<Member>> {
        let pattern = format!("%{}%", query.to_lowercase());

        let members = sqlx::query_as::<_, Member>(
            "SELECT member_id, email, username, first_name, last_name, created_at
             FROM members
             WHERE lower(first_name) LIKE ?1
                OR lower(last_name)  LIKE ?1
                OR lower(username)   LIKE ?1
                OR lower(email)      LIKE ?1
             ORDER BY last_name ASC, first_name ASC",
        )
        .bind(&pattern)
        .fetch_all(self.pool())
        .await?;

        Ok(members)
    }

    /// Every member except the given one (the directory view).
    pub async fn list_members_except(&self, member_id: i64) -> Result<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT member_id, email, username, first_name, last_name, created_at
             FROM members
             WHERE member_id != ?1
             ORDER BY last_name ASC, first_name ASC",
        )
        .bind(member_id)
        .fetch_all(self.pool())
        .await?;

        Ok(members)
    }
}
