//! Parameters and accumulated context for a pipeline run.

use crate::error::PipelineError;

/// Raw operation parameters as received from the transport.
///
/// Identifier fields arrive as strings (path segments) and stay strings until
/// the shape guard parses them; body-sourced fields (member lists, flags)
/// arrive already typed from JSON deserialization.  Unused fields are simply
/// left `None`.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Authenticated caller, when the operation requires one.
    pub caller: Option<i64>,
    /// Chat identifier, unparsed.
    pub chat_id: Option<String>,
    /// Member identifier, unparsed.
    pub member_id: Option<String>,
    /// Email address identifying a member.
    pub email: Option<String>,
    /// Member-id list for the batched membership add.
    pub member_ids: Option<Vec<i64>>,
    /// Contact confirmation flag.
    pub confirm: Option<bool>,
    /// Name field (chat creation).
    pub name: Option<String>,
}

/// Accumulated state threaded through a pipeline run.
///
/// Starts as the raw [`Params`]; the shape guard parses identifier fields
/// into the typed slots, and later guards may rewrite them (the email guard
/// resolves the address to `member_id`, after which the email is never read
/// again).
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// The raw input, read only by the shape guard.
    pub params: Params,
    pub caller: Option<i64>,
    pub chat_id: Option<i64>,
    pub member_id: Option<i64>,
    pub email: Option<String>,
    pub member_ids: Vec<i64>,
    pub name: Option<String>,
}

impl OpContext {
    /// Start a run from raw request parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Caller identity, validated by the shape guard.
    pub fn require_caller(&self) -> Result<i64, PipelineError> {
        self.caller
            .ok_or_else(|| PipelineError::invalid("caller identity is required"))
    }

    /// Chat id, validated by the shape guard.
    pub fn require_chat_id(&self) -> Result<i64, PipelineError> {
        self.chat_id
            .ok_or_else(|| PipelineError::invalid("chat id is required"))
    }

    /// Member id, validated by the shape guard (or resolved from an email).
    pub fn require_member_id(&self) -> Result<i64, PipelineError> {
        self.member_id
            .ok_or_else(|| PipelineError::invalid("member id is required"))
    }

    /// Email address, validated by the shape guard.
    pub fn require_email(&self) -> Result<&str, PipelineError> {
        self.email
            .as_deref()
            .ok_or_else(|| PipelineError::invalid("email is required"))
    }

    /// Name field, validated by the shape guard.
    pub fn require_name(&self) -> Result<&str, PipelineError> {
        self.name
            .as_deref()
            .ok_or_else(|| PipelineError::invalid("name is required"))
    }
}
