//! Contact operations: request, confirm, remove.

use async_trait::async_trait;
use natter_store::Store;
use serde::Serialize;

use crate::context::{OpContext, Params};
use crate::engine::{Pipeline, Terminal};
use crate::error::PipelineError;
use crate::guards::{ContactAbsent, ContactPresent, Exists, Field, NotSelf, Shape};

/// Result of a contact-add, either branch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContactOutcome {
    /// The member on the far side of the relationship.
    pub member_id: i64,
    /// Whether the relationship is now mutually verified.
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// contact-add
// ---------------------------------------------------------------------------

/// Terminal for a fresh request: insert one unverified caller -> member row.
///
/// The insert-or-skip re-verifies the precondition atomically; losing a race
/// to an identical add reports Conflict, the same answer the guard would have
/// given.
struct RequestContact;

#[async_trait]
impl Terminal<ContactOutcome> for RequestContact {
    fn name(&self) -> &'static str {
        "request_contact"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<ContactOutcome, PipelineError> {
        let owner = ctx.require_caller()?;
        let other = ctx.require_member_id()?;

        if !store.insert_contact(owner, other, false).await? {
            return Err(PipelineError::conflict(format!(
                "member {other} is already a contact"
            )));
        }

        tracing::info!(owner, other, "contact requested");
        Ok(ContactOutcome {
            member_id: other,
            verified: false,
        })
    }
}

/// Terminal for a confirmation: upgrade the pending reverse row and upsert
/// the forward row, atomically, producing the mutual verified pair.
///
/// Requires the reverse row to actually exist -- a caller cannot mint a
/// mutual pair unilaterally by claiming confirmation.
struct ConfirmContact;

#[async_trait]
impl Terminal<ContactOutcome> for ConfirmContact {
    fn name(&self) -> &'static str {
        "confirm_contact"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<ContactOutcome, PipelineError> {
        let owner = ctx.require_caller()?;
        let other = ctx.require_member_id()?;

        if !store.confirm_contact(owner, other).await? {
            return Err(PipelineError::not_found(format!(
                "no pending contact request from member {other}"
            )));
        }

        Ok(ContactOutcome {
            member_id: other,
            verified: true,
        })
    }
}

/// Add a contact for the caller.
///
/// The confirmation flag selects the mutation branch, not a different
/// pipeline shape: a fresh request must not collide with an existing row and
/// inserts a single unverified one; a confirmation requires a pending reverse
/// row and upgrades both directions.
pub async fn add_contact(store: &Store, params: Params) -> Result<ContactOutcome, PipelineError> {
    let confirm = params.confirm.unwrap_or(false);

    let pipeline = Pipeline::new(if confirm {
        "contact.confirm"
    } else {
        "contact.request"
    })
    .guard(Shape::require(&[Field::Caller, Field::MemberId]))
    .guard(NotSelf)
    .guard(Exists::member());

    if confirm {
        pipeline
            .run(store, OpContext::new(params), ConfirmContact)
            .await
    } else {
        pipeline
            .guard(ContactAbsent)
            .run(store, OpContext::new(params), RequestContact)
            .await
    }
}

// ---------------------------------------------------------------------------
// contact-remove
// ---------------------------------------------------------------------------

/// Terminal: delete the caller's directed row.  The affected-row count
/// re-verifies the precondition under races.
struct DeleteContact;

#[async_trait]
impl Terminal<i64> for DeleteContact {
    fn name(&self) -> &'static str {
        "delete_contact"
    }

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<i64, PipelineError> {
        let owner = ctx.require_caller()?;
        let other = ctx.require_member_id()?;

        if !store.delete_contact(owner, other).await? {
            return Err(PipelineError::not_found(format!(
                "member {other} is not a contact"
            )));
        }

        tracing::info!(owner, other, "contact removed");
        Ok(other)
    }
}

/// Remove a contact of the caller.  Only the caller's directed row is
/// deleted; the counterpart's row, if any, is untouched.
pub async fn remove_contact(store: &Store, params: Params) -> Result<i64, PipelineError> {
    Pipeline::new("contact.remove")
        .guard(Shape::require(&[Field::Caller, Field::MemberId]))
        .guard(Exists::member())
        .guard(ContactPresent)
        .run(store, OpContext::new(params), DeleteContact)
        .await
}
