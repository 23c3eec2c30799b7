//! # natter-pipeline
//!
//! The guarded mutation pipeline: every chat-membership and contact operation
//! in the backend is an ordered chain of validation stages ending in exactly
//! one terminal read or atomic mutation.
//!
//! The chain always runs in the same order -- shape validation, existence
//! validation, relationship-state validation, terminal -- stopping at the
//! first stage that fails.  Operations differ only in which guards they
//! select and in their terminal stage; the guard implementations themselves
//! are shared (the existence guard, for instance, is parameterized over what
//! must exist: a chat, a member, every member of a list, or a member resolved
//! from an email address).
//!
//! Pipelines hold no state between runs.  The [`Store`] handle is injected
//! into every run, never reached through a global.
//!
//! [`Store`]: natter_store::Store

pub mod context;
pub mod engine;
pub mod guards;
pub mod ops;

mod error;

pub use context::{OpContext, Params};
pub use engine::{Guard, Pipeline, Terminal};
pub use error::PipelineError;
