//! Chat operations: creation, membership add/remove, roster, lookup.

use std::collections::HashSet;

use async_trait::async_trait;
use natter_store::{Chat, ChatSummary, Member, Store};
use serde::Serialize;

use crate::context::{OpContext, Params};
use crate::engine::{Pipeline, Terminal};
use crate::error::PipelineError;
use crate::guards::{Exists, Field, MembershipPresent, Shape};

// ---------------------------------------------------------------------------
// chat-create
// ---------------------------------------------------------------------------

struct InsertChat;

#[async_trait]
impl Terminal<Chat> for InsertChat {
    fn name(&self) -> &'static str {
        "insert_chat"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<Chat, PipelineError> {
        Ok(store.create_chat(ctx.require_name()?).await?)
    }
}

/// Create a chat with the given name.
pub async fn create_chat(store: &Store, params: Params) -> Result<Chat, PipelineError> {
    Pipeline::new("chat.create")
        .guard(Shape::require(&[Field::Name]))
        .run(store, OpContext::new(params), InsertChat)
        .await
}

// ---------------------------------------------------------------------------
// chat-membership-add
// ---------------------------------------------------------------------------

/// Result of the batched membership add.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JoinOutcome {
    pub chat_id: i64,
    /// Ids actually inserted by this request, in request order.
    pub added: Vec<i64>,
    /// Requested ids that were already members and were silently skipped.
    pub already_present: Vec<i64>,
}

/// Terminal: batched insert-or-skip of the requested members.
///
/// The whole batch runs in one transaction, and each insert is atomic against
/// the membership primary key, so members already present -- including ones
/// added by a concurrent request after the guards ran -- are skipped rather
/// than failed.
struct AddMembers;

#[async_trait]
impl Terminal<JoinOutcome> for AddMembers {
    fn name(&self) -> &'static str {
        "add_members"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<JoinOutcome, PipelineError> {
        let chat_id = ctx.require_chat_id()?;

        let mut requested = ctx.member_ids.clone();
        let mut seen = HashSet::new();
        requested.retain(|id| seen.insert(*id));

        let added = store.add_chat_members(chat_id, &requested).await?;
        let already_present: Vec<i64> = requested
            .iter()
            .copied()
            .filter(|id| !added.contains(id))
            .collect();

        tracing::info!(
            chat_id,
            added = added.len(),
            skipped = already_present.len(),
            "chat members added"
        );

        Ok(JoinOutcome {
            chat_id,
            added,
            already_present,
        })
    }
}

/// Add the listed members to a chat, skipping those already present.
pub async fn join_chat(store: &Store, params: Params) -> Result<JoinOutcome, PipelineError> {
    Pipeline::new("chat.join")
        .guard(Shape::require(&[Field::ChatId, Field::MemberIds]))
        .guard(Exists::chat())
        .guard(Exists::member_list())
        .run(store, OpContext::new(params), AddMembers)
        .await
}

// ---------------------------------------------------------------------------
// chat-membership-remove
// ---------------------------------------------------------------------------

/// Result of a membership removal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub chat_id: i64,
    /// The member id the request's email resolved to.
    pub member_id: i64,
}

/// Terminal: delete the membership row.
///
/// The affected-row count re-verifies the precondition, so losing a race to
/// another remove still reports NotFound rather than silent success.
struct RemoveMember;

#[async_trait]
impl Terminal<LeaveOutcome> for RemoveMember {
    fn name(&self) -> &'static str {
        "remove_member"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<LeaveOutcome, PipelineError> {
        let chat_id = ctx.require_chat_id()?;
        let member_id = ctx.require_member_id()?;

        if !store.remove_chat_member(chat_id, member_id).await? {
            return Err(PipelineError::not_found(format!(
                "member {member_id} is not in chat {chat_id}"
            )));
        }

        tracing::info!(chat_id, member_id, "chat member removed");
        Ok(LeaveOutcome { chat_id, member_id })
    }
}

/// Remove the member identified by email from a chat.
pub async fn leave_chat(store: &Store, params: Params) -> Result<LeaveOutcome, PipelineError> {
    Pipeline::new("chat.leave")
        .guard(Shape::require(&[Field::ChatId, Field::Email]))
        .guard(Exists::chat())
        .guard(Exists::email_owner())
        .guard(MembershipPresent)
        .run(store, OpContext::new(params), RemoveMember)
        .await
}

// ---------------------------------------------------------------------------
// chat-roster / chat-lookup
// ---------------------------------------------------------------------------

struct ReadRoster;

#[async_trait]
impl Terminal<Vec<Member>> for ReadRoster {
    fn name(&self) -> &'static str {
        "read_roster"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<Vec<Member>, PipelineError> {
        Ok(store.chat_roster(ctx.require_chat_id()?).await?)
    }
}

/// Member profiles of everyone in the chat.
pub async fn chat_roster(store: &Store, params: Params) -> Result<Vec<Member>, PipelineError> {
    Pipeline::new("chat.roster")
        .guard(Shape::require(&[Field::ChatId]))
        .guard(Exists::chat())
        .run(store, OpContext::new(params), ReadRoster)
        .await
}

struct ReadMemberChats;

#[async_trait]
impl Terminal<Vec<ChatSummary>> for ReadMemberChats {
    fn name(&self) -> &'static str {
        "read_member_chats"
    }

    async fn apply(
        &self,
        store: &Store,
        ctx: OpContext,
    ) -> Result<Vec<ChatSummary>, PipelineError> {
        Ok(store.chats_for_member(ctx.require_member_id()?).await?)
    }
}

/// All chats the member belongs to.  A member in no chats yields an empty
/// list, not an error.
pub async fn chats_for_member(
    store: &Store,
    params: Params,
) -> Result<Vec<ChatSummary>, PipelineError> {
    Pipeline::new("chat.lookup")
        .guard(Shape::require(&[Field::MemberId]))
        .guard(Exists::member())
        .run(store, OpContext::new(params), ReadMemberChats)
        .await
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

    fn join_params(chat_id: &str, member_ids: Vec<i64>) -> Params {
        Params {
            chat_id: Some(chat_id.into()),
            member_ids: Some(member_ids),
            ..Params::default()
        }
    }

    #[tokio::test]
    async fn add_inserts_only_the_set_difference() {
        let store = Store::open_in_memory().await.unwrap();
        let chat = store.create_chat("lounge").await.unwrap();
        let m1 = seed_member(&store, "m1@example.com").await;
        let m2 = seed_member(&store, "m2@example.com").await;
        let m3 = seed_member(&store, "m3@example.com").await;
        let m4 = seed_member(&store, "m4@example.com").await;

        store.add_chat_members(chat.chat_id, &[m1, m2]).await.unwrap();

        let outcome = join_chat(
            &store,
            join_params(&chat.chat_id.to_string(), vec![m2, m3, m4]),
        )
        .await
        .unwrap();

        assert_eq!(outcome.added, vec![m3, m4]);
        assert_eq!(outcome.already_present, vec![m2]);
        assert_eq!(
            store.chat_member_ids(chat.chat_id).await.unwrap(),
            vec![m1, m2, m3, m4]
        );
    }

    #[tokio::test]
    async fn add_with_unknown_member_is_not_found() {
        let store = Store::open_in_memory().await.unwrap();
        let chat = store.create_chat("lounge").await.unwrap();
        let m1 = seed_member(&store, "m1@example.com").await;

        let err = join_chat(&store, join_params(&chat.chat_id.to_string(), vec![m1, 99]))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
        // Nothing was inserted for the valid id either.
        assert!(store.chat_member_ids(chat.chat_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_to_unknown_chat_is_not_found() {
        let store = Store::open_in_memory().await.unwrap();
        let m1 = seed_member(&store, "m1@example.com").await;

        let err = join_chat(&store, join_params("99", vec![m1]))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_chat_id_fails_before_any_store_access() {
        let store = Store::open_in_memory().await.unwrap();
        // Drop the schema: any store access now errors, so a Store variant in
        // the result would prove a guard hit the database.
        sqlx::raw_sql("DROP TABLE chat_members; DROP TABLE chats;")
            .execute(store.pool())
            .await
            .unwrap();

        let err = join_chat(&store, join_params("abc", vec![1]))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn concurrent_adds_of_one_pair_leave_one_membership() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("race.db").display());
        let store = Store::connect(&url, 4).await.unwrap();

        let chat = store.create_chat("lounge").await.unwrap();
        let m1 = seed_member(&store, "m1@example.com").await;
        let params = || join_params(&chat.chat_id.to_string(), vec![m1]);

        let (a, b) = tokio::join!(join_chat(&store, params()), join_chat(&store, params()));
        a.unwrap();
        b.unwrap();

        assert_eq!(store.chat_member_ids(chat.chat_id).await.unwrap(), vec![m1]);
        store.close().await;
    }

    #[tokio::test]
    async fn leave_resolves_email_and_removes() {
        let store = Store::open_in_memory().await.unwrap();
        let chat = store.create_chat("lounge").await.unwrap();
        let m1 = seed_member(&store, "m1@example.com").await;
        store.add_chat_members(chat.chat_id, &[m1]).await.unwrap();

        let outcome = leave_chat(
            &store,
            Params {
                chat_id: Some(chat.chat_id.to_string()),
                email: Some("m1@example.com".into()),
                ..Params::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.member_id, m1);
        assert!(!store.membership_exists(chat.chat_id, m1).await.unwrap());
    }

    #[tokio::test]
    async fn leave_when_not_a_member_is_not_found() {
        let store = Store::open_in_memory().await.unwrap();
        let chat = store.create_chat("lounge").await.unwrap();
        seed_member(&store, "m1@example.com").await;

        let err = leave_chat(
            &store,
            Params {
                chat_id: Some(chat.chat_id.to_string()),
                email: Some("m1@example.com".into()),
                ..Params::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn lookup_returns_chats_or_not_found() {
        let store = Store::open_in_memory().await.unwrap();
        let chat = store.create_chat("lounge").await.unwrap();
        let m1 = seed_member(&store, "m1@example.com").await;
        store.add_chat_members(chat.chat_id, &[m1]).await.unwrap();

        let chats = chats_for_member(
            &store,
            Params {
                member_id: Some(m1.to_string()),
                ..Params::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].chat_id, chat.chat_id);

        // Member with no chats: success with an empty list.
        let m2 = seed_member(&store, "m2@example.com").await;
        let chats = chats_for_member(
            &store,
            Params {
                member_id: Some(m2.to_string()),
                ..Params::default()
            },
        )
        .await
        .unwrap();
        assert!(chats.is_empty());

        // Unknown member: NotFound, never InvalidInput or Store.
        let err = chats_for_member(
            &store,
            Params {
                member_id: Some("99".into()),
                ..Params::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let store = Store::open_in_memory().await.unwrap();

        let chat = create_chat(
            &store,
            Params {
                name: Some("weekend plans".into()),
                ..Params::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(chat.name, "weekend plans");

        let err = create_chat(&store, Params::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn roster_requires_the_chat_to_exist() {
        let store = Store::open_in_memory().await.unwrap();

        let err = chat_roster(
            &store,
            Params {
                chat_id: Some("7".into()),
                ..Params::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}
