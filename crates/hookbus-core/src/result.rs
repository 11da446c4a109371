//! Convenience result type alias for HookBus.

use crate::error::HookError;

/// A specialized `Result` type for registry, dispatch and lifecycle operations.
pub type HookResult<T> = Result<T, HookError>;
