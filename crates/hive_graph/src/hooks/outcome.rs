//! Values hooks return and dispatch produces.
//!
//! A hook either lets execution [`Continue`](HookAction::Continue) or asks the
//! executor to [`Skip`](HookAction::Skip) the node, handing over the result to
//! use in its place. Anything else that goes wrong inside a hook is a
//! [`HookError`], which dispatch logs and moves past.

use core::any::Any;
use core::fmt;

use crate::node::NodeResult;

/// Result type returned by every hook invocation.
pub type HookResult = Result<HookAction, HookError>;

// ─────────────────────────────────────────────────────────────────────────────
// HookAction
// ─────────────────────────────────────────────────────────────────────────────

/// What a hook asks the dispatcher to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum HookAction {
    /// Proceed to the next hook.
    Continue,
    /// Stop running hooks and substitute this result for the node's work.
    Skip(NodeResult),
}

impl HookAction {
    /// Shorthand for [`HookAction::Skip`].
    #[must_use]
    pub fn skip(result: NodeResult) -> Self {
        Self::Skip(result)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookFlow
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of dispatching one hook sequence.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a skipped dispatch carries the result to use instead of running the node"]
pub enum HookFlow {
    /// Every hook ran (or failed and was logged) without requesting a skip.
    Continue,
    /// A hook requested a skip; later hooks did not run.
    Skip(NodeResult),
}

impl HookFlow {
    /// Returns `true` if a hook requested a skip.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, HookFlow::Skip(_))
    }

    /// Returns the substitute result if a hook requested a skip.
    #[must_use]
    pub fn into_skip_result(self) -> Option<NodeResult> {
        match self {
            HookFlow::Skip(result) => Some(result),
            HookFlow::Continue => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookStage
// ─────────────────────────────────────────────────────────────────────────────

/// Which hook sequence a dispatch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Before the node executes; no result is available yet.
    PreExecution,
    /// After the node executes, with its result.
    PostExecution,
}

impl HookStage {
    /// Returns a short, stable name for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HookStage::PreExecution => "pre_execution",
            HookStage::PostExecution => "post_execution",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookError
// ─────────────────────────────────────────────────────────────────────────────

/// A failure raised inside a hook.
///
/// Dispatch never propagates these: they are logged and the next hook runs.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The hook reported a failure with a message.
    #[error("{0}")]
    Message(String),

    /// The hook failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn core::error::Error + Send + Sync>),

    /// The hook panicked while running.
    #[error("hook panicked: {0}")]
    Panicked(String),
}

impl HookError {
    /// Creates a failure from a message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wraps an arbitrary error.
    #[must_use]
    pub fn other(error: impl core::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }

    /// Converts a caught panic payload into a failure.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_owned()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::Panicked(message)
    }
}
