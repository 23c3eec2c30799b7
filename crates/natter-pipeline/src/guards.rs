//! Shared guard implementations.
//!
//! Every operation assembles its chain from these: [`Shape`] (required
//! fields present, ids parse), [`Exists`] (referenced entity exists,
//! parameterized over the subject), and the relationship-state guards
//! ([`ContactAbsent`], [`ContactPresent`], [`MembershipPresent`],
//! [`NotSelf`]).

use async_trait::async_trait;
use natter_store::Store;

use crate::context::OpContext;
use crate::engine::Guard;
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Request fields a [`Shape`] guard can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Caller,
    ChatId,
    MemberId,
    Email,
    MemberIds,
    Name,
}

/// Shape validation: required fields are present and identifier fields parse
/// as numbers.  The only writer of the context's typed slots, and the only
/// guard that never touches the store.
pub struct Shape {
    required: &'static [Field],
}

impl Shape {
    pub fn require(required: &'static [Field]) -> Self {
        Self { required }
    }
}

#[async_trait]
impl Guard for Shape {
    fn name(&self) -> &'static str {
        "shape"
    }

    async fn check(&self, _store: &Store, mut ctx: OpContext) -> Result<OpContext, PipelineError> {
        for field in self.required {
            match field {
                Field::Caller => {
                    ctx.caller = Some(
                        ctx.params
                            .caller
                            .ok_or_else(|| PipelineError::invalid("caller identity is required"))?,
                    );
                }
                Field::ChatId => {
                    ctx.chat_id = Some(parse_id(ctx.params.chat_id.as_deref(), "chat id")?);
                }
                Field::MemberId => {
                    ctx.member_id = Some(parse_id(ctx.params.member_id.as_deref(), "member id")?);
                }
                Field::Email => {
                    let email = required_text(ctx.params.email.as_deref(), "email")?;
                    ctx.email = Some(email);
                }
                Field::MemberIds => {
                    let ids = ctx
                        .params
                        .member_ids
                        .clone()
                        .ok_or_else(|| PipelineError::invalid("member list is required"))?;
                    if ids.is_empty() {
                        return Err(PipelineError::invalid("member list must not be empty"));
                    }
                    ctx.member_ids = ids;
                }
                Field::Name => {
                    let name = required_text(ctx.params.name.as_deref(), "name")?;
                    ctx.name = Some(name);
                }
            }
        }

        Ok(ctx)
    }
}

fn parse_id(raw: Option<&str>, what: &str) -> Result<i64, PipelineError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::invalid(format!("{what} is required")))?;

    raw.parse::<i64>()
        .map_err(|_| PipelineError::invalid(format!("{what} must be a number")))
}

fn required_text(raw: Option<&str>, what: &str) -> Result<String, PipelineError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::invalid(format!("{what} is required")))
}

// ---------------------------------------------------------------------------
// Existence
// ---------------------------------------------------------------------------

/// What must exist for an [`Exists`] guard to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    Chat,
    Member,
    MemberList,
    EmailOwner,
}

/// Existence validation, parameterized over what "existence" means for the
/// operation: the chat, the target member, every member of the requested
/// list, or a member resolved from an email address.
pub struct Exists {
    subject: Subject,
}

impl Exists {
    /// The chat named by `chat_id` exists.
    pub fn chat() -> Self {
        Self {
            subject: Subject::Chat,
        }
    }

    /// The member named by `member_id` exists.
    pub fn member() -> Self {
        Self {
            subject: Subject::Member,
        }
    }

    /// Every member in `member_ids` exists.
    pub fn member_list() -> Self {
        Self {
            subject: Subject::MemberList,
        }
    }

    /// The email resolves to a member.  Rewrites the context's `member_id` to
    /// the resolved id; the email is never read again downstream.
    pub fn email_owner() -> Self {
        Self {
            subject: Subject::EmailOwner,
        }
    }
}

#[async_trait]
impl Guard for Exists {
    fn name(&self) -> &'static str {
        match self.subject {
            Subject::Chat => "chat_exists",
            Subject::Member => "member_exists",
            Subject::MemberList => "members_exist",
            Subject::EmailOwner => "email_resolves",
        }
    }

    async fn check(&self, store: &Store, mut ctx: OpContext) -> Result<OpContext, PipelineError> {
        match self.subject {
            Subject::Chat => {
                let chat_id = ctx.require_chat_id()?;
                if !store.chat_exists(chat_id).await? {
                    return Err(PipelineError::not_found(format!(
                        "chat {chat_id} does not exist"
                    )));
                }
            }
            Subject::Member => {
                let member_id = ctx.require_member_id()?;
                if !store.member_exists(member_id).await? {
                    return Err(PipelineError::not_found(format!(
                        "member {member_id} does not exist"
                    )));
                }
            }
            Subject::MemberList => {
                let found = store.existing_member_ids(&ctx.member_ids).await?;
                if let Some(missing) = ctx.member_ids.iter().find(|id| !found.contains(id)) {
                    return Err(PipelineError::not_found(format!(
                        "member {missing} does not exist"
                    )));
                }
            }
            Subject::EmailOwner => {
                let email = ctx.require_email()?.to_string();
                let resolved = store.member_id_for_email(&email).await?;
                let member_id = resolved.ok_or_else(|| {
                    PipelineError::not_found(format!("no member with email {email}"))
                })?;
                ctx.member_id = Some(member_id);
            }
        }

        Ok(ctx)
    }
}

// ---------------------------------------------------------------------------
// Relationship state
// ---------------------------------------------------------------------------

/// Add precondition: the caller -> member contact must not already exist.
pub struct ContactAbsent;

#[async_trait]
impl Guard for ContactAbsent {
    fn name(&self) -> &'static str {
        "contact_absent"
    }

    async fn check(&self, store: &Store, ctx: OpContext) -> Result<OpContext, PipelineError> {
        let owner = ctx.require_caller()?;
        let other = ctx.require_member_id()?;

        if store.contact_exists(owner, other).await? {
            return Err(PipelineError::conflict(format!(
                "member {other} is already a contact"
            )));
        }

        Ok(ctx)
    }
}

/// Remove precondition: the caller -> member contact must exist.
pub struct ContactPresent;

#[async_trait]
impl Guard for ContactPresent {
    fn name(&self) -> &'static str {
        "contact_present"
    }

    async fn check(&self, store: &Store, ctx: OpContext) -> Result<OpContext, PipelineError> {
        let owner = ctx.require_caller()?;
        let other = ctx.require_member_id()?;

        if !store.contact_exists(owner, other).await? {
            return Err(PipelineError::not_found(format!(
                "member {other} is not a contact"
            )));
        }

        Ok(ctx)
    }
}

/// Remove precondition: the (chat, member) membership must exist.
pub struct MembershipPresent;

#[async_trait]
impl Guard for MembershipPresent {
    fn name(&self) -> &'static str {
        "membership_present"
    }

    async fn check(&self, store: &Store, ctx: OpContext) -> Result<OpContext, PipelineError> {
        let chat_id = ctx.require_chat_id()?;
        let member_id = ctx.require_member_id()?;

        if !store.membership_exists(chat_id, member_id).await? {
            return Err(PipelineError::not_found(format!(
                "member {member_id} is not in chat {chat_id}"
            )));
        }

        Ok(ctx)
    }
}

/// The target member must differ from the caller.
pub struct NotSelf;

#[async_trait]
impl Guard for NotSelf {
    fn name(&self) -> &'static str {
        "not_self"
    }

    async fn check(&self, _store: &Store, ctx: OpContext) -> Result<OpContext, PipelineError> {
        if ctx.require_caller()? == ctx.require_member_id()? {
            return Err(PipelineError::invalid(
                "member id must differ from the caller",
            ));
        }

        Ok(ctx)
    }
}
