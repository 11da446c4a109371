//! Shared value types.

pub mod lifecycle;
