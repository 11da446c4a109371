//! Handler traits and their type-erased forms stored by the registry.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use hookbus_core::{HookError, HookResult};

use crate::api::context::HookContext;

/// Handler invoked for its side effect when an action is dispatched.
#[async_trait]
pub trait ActionHandler<P>: Send + Sync
where
    P: Send + Sync + 'static,
{
    /// Handles one dispatch. Returning an error halts the dispatch.
    async fn handle(&self, ctx: &HookContext, payload: &P) -> HookResult<()>;
}

/// Handler that transforms a value flowing through a filter pipeline.
#[async_trait]
pub trait FilterHandler<V>: Send + Sync
where
    V: Send + 'static,
{
    /// Returns the transformed value. Returning an error halts the pipeline.
    async fn filter(&self, ctx: &HookContext, value: V) -> HookResult<V>;
}

/// Whether an event slot holds actions or filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Side-effect handlers.
    Action,
    /// Value-transforming handlers.
    Filter,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => f.write_str("action"),
            Self::Filter => f.write_str("filter"),
        }
    }
}

/// Kind and payload type bound to an event name by its first registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Action or filter.
    pub kind: HookKind,
    type_id: TypeId,
    type_name: &'static str,
}

impl Signature {
    /// Signature of an action carrying `P`.
    pub fn action<P: 'static>() -> Self {
        Self {
            kind: HookKind::Action,
            type_id: TypeId::of::<P>(),
            type_name: type_name::<P>(),
        }
    }

    /// Signature of a filter over `V`.
    pub fn filter<V: 'static>() -> Self {
        Self {
            kind: HookKind::Filter,
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.kind, self.type_name)
    }
}

pub(crate) type BoxedValue = Box<dyn Any + Send>;

fn mismatch<T>(event: &str, found: &str) -> HookError {
    HookError::TypeMismatch {
        event: event.to_string(),
        expected: type_name::<T>().to_string(),
        found: found.to_string(),
    }
}

#[async_trait]
pub(crate) trait ErasedAction: Send + Sync {
    async fn call(
        &self,
        event: &str,
        ctx: &HookContext,
        payload: &(dyn Any + Send + Sync),
    ) -> HookResult<()>;
}

#[async_trait]
pub(crate) trait ErasedFilter: Send + Sync {
    async fn call(&self, event: &str, ctx: &HookContext, value: BoxedValue)
    -> HookResult<BoxedValue>;
}

pub(crate) struct TypedAction<P: Send + Sync + 'static> {
    inner: Arc<dyn ActionHandler<P>>,
}

impl<P: Send + Sync + 'static> TypedAction<P> {
    pub(crate) fn erase(inner: Arc<dyn ActionHandler<P>>) -> Arc<dyn ErasedAction> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl<P: Send + Sync + 'static> ErasedAction for TypedAction<P> {
    async fn call(
        &self,
        event: &str,
        ctx: &HookContext,
        payload: &(dyn Any + Send + Sync),
    ) -> HookResult<()> {
        let payload = payload
            .downcast_ref::<P>()
            .ok_or_else(|| mismatch::<P>(event, "an unrelated payload type"))?;
        self.inner.handle(ctx, payload).await
    }
}

pub(crate) struct TypedFilter<V: Send + 'static> {
    inner: Arc<dyn FilterHandler<V>>,
}

impl<V: Send + 'static> TypedFilter<V> {
    pub(crate) fn erase(inner: Arc<dyn FilterHandler<V>>) -> Arc<dyn ErasedFilter> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl<V: Send + 'static> ErasedFilter for TypedFilter<V> {
    async fn call(
        &self,
        event: &str,
        ctx: &HookContext,
        value: BoxedValue,
    ) -> HookResult<BoxedValue> {
        let value = value
            .downcast::<V>()
            .map_err(|_| mismatch::<V>(event, "an unrelated value type"))?;
        let out = self.inner.filter(ctx, *value).await?;
        Ok(Box::new(out))
    }
}
