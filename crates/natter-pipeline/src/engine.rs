//! The pipeline engine: ordered guard stages ending in one terminal stage.
//!
//! Guards validate -- request shape, entity existence, relationship state --
//! and hand the (possibly updated) context to the next stage.  The terminal
//! performs the operation's single read or atomic mutation and produces the
//! result payload.  Splitting the two keeps "a run ends in exactly one
//! terminal" a type-level invariant rather than a runtime convention.
//!
//! A run stops at the first failing stage; later stages never execute, and
//! nothing is rolled back (terminals are atomic, guards do not mutate).

use async_trait::async_trait;
use natter_store::Store;

use crate::context::OpContext;
use crate::error::PipelineError;

/// A validation or precondition stage.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Short stage name used in trace output.
    fn name(&self) -> &'static str;

    /// Check the stage's predicate against the injected store.
    ///
    /// On success the guard returns the context for the next stage, possibly
    /// with derived values filled in; on failure the pipeline run ends with
    /// the returned error.
    async fn check(&self, store: &Store, ctx: OpContext) -> Result<OpContext, PipelineError>;
}

/// The terminal stage: one read or atomic mutation producing the result.
#[async_trait]
pub trait Terminal<T>: Send + Sync {
    /// Short stage name used in trace output.
    fn name(&self) -> &'static str;

    async fn apply(&self, store: &Store, ctx: OpContext) -> Result<T, PipelineError>;
}

/// An ordered chain of guards for one named operation.
///
/// Assembled per operation from the shared guard implementations, then run
/// with that operation's terminal:
///
/// ```ignore
/// Pipeline::new("chat.roster")
///     .guard(Shape::require(&[Field::ChatId]))
///     .guard(Exists::chat())
///     .run(&store, OpContext::new(params), ReadRoster)
///     .await
/// ```
pub struct Pipeline {
    op: &'static str,
    guards: Vec<Box<dyn Guard>>,
}

impl Pipeline {
    /// Start assembling the pipeline for the named operation.
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            guards: Vec::new(),
        }
    }

    /// Append a guard stage.
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Run the guards in order, then the terminal.
    ///
    /// The first guard failure aborts the run and becomes its result; the
    /// terminal executes only after every guard has passed.
    pub async fn run<T>(
        &self,
        store: &Store,
        mut ctx: OpContext,
        terminal: impl Terminal<T>,
    ) -> Result<T, PipelineError> {
        for guard in &self.guards {
            ctx = match guard.check(store, ctx).await {
                Ok(next) => next,
                Err(err) => {
                    tracing::debug!(
                        op = self.op,
                        stage = guard.name(),
                        kind = err.kind(),
                        "guard failed"
                    );
                    return Err(err);
                }
            };
        }

        match terminal.apply(store, ctx).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::debug!(
                    op = self.op,
                    stage = terminal.name(),
                    kind = err.kind(),
                    "terminal failed"
                );
                Err(err)
            }
        }
    }
}
