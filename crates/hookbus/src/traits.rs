//! Closure-based handlers for quick handler creation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use hookbus_core::HookResult;

use crate::api::context::HookContext;
use crate::hooks::handler::{ActionHandler, FilterHandler};

type ActionClosure<P> = dyn Fn(HookContext, P) -> BoxFuture<'static, HookResult<()>> + Send + Sync;
type FilterClosure<V> = dyn Fn(HookContext, V) -> BoxFuture<'static, HookResult<V>> + Send + Sync;

/// An action handler backed by an async closure.
///
/// The closure receives owned clones of the context and payload, so the
/// returned future may outlive the dispatch borrow.
pub struct ActionFn<P> {
    handler: Arc<ActionClosure<P>>,
}

impl<P: 'static> ActionFn<P> {
    /// Creates a new closure-based action handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(HookContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<()>> + Send + 'static,
    {
        Self {
            handler: Arc::new(
                move |ctx: HookContext, payload: P| -> BoxFuture<'static, HookResult<()>> {
                    Box::pin(handler(ctx, payload))
                },
            ),
        }
    }
}

impl<P> fmt::Debug for ActionFn<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionFn")
            .field("handler", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl<P> ActionHandler<P> for ActionFn<P>
where
    P: Clone + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &HookContext, payload: &P) -> HookResult<()> {
        (self.handler)(ctx.clone(), payload.clone()).await
    }
}

/// A filter handler backed by an async closure.
pub struct FilterFn<V> {
    handler: Arc<FilterClosure<V>>,
}

impl<V: 'static> FilterFn<V> {
    /// Creates a new closure-based filter handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(HookContext, V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<V>> + Send + 'static,
    {
        Self {
            handler: Arc::new(
                move |ctx: HookContext, value: V| -> BoxFuture<'static, HookResult<V>> {
                    Box::pin(handler(ctx, value))
                },
            ),
        }
    }
}

impl<V> fmt::Debug for FilterFn<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterFn")
            .field("handler", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl<V> FilterHandler<V> for FilterFn<V>
where
    V: Send + 'static,
{
    async fn filter(&self, ctx: &HookContext, value: V) -> HookResult<V> {
        (self.handler)(ctx.clone(), value).await
    }
}

/// Wraps an async closure into a shareable action handler.
pub fn action_fn<P, F, Fut>(handler: F) -> Arc<dyn ActionHandler<P>>
where
    P: Clone + Send + Sync + 'static,
    F: Fn(HookContext, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookResult<()>> + Send + 'static,
{
    Arc::new(ActionFn::new(handler))
}

/// Wraps an async closure into a shareable filter handler.
pub fn filter_fn<V, F, Fut>(handler: F) -> Arc<dyn FilterHandler<V>>
where
    V: Send + 'static,
    F: Fn(HookContext, V) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HookResult<V>> + Send + 'static,
{
    Arc::new(FilterFn::new(handler))
}
