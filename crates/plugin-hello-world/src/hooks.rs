//! Hook implementations for the Hello World plugin.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hookbus::prelude::*;

/// Filter applied to a page title before it is rendered.
pub const THE_TITLE: FilterKey<String> = FilterKey::new("the_title");

/// Action fired after a post has been saved.
pub const POST_SAVED: ActionKey<PostSaved> = ActionKey::new("post_saved");

/// Payload of [`POST_SAVED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSaved {
    /// Post identifier.
    pub post_id: u64,
    /// Title as saved.
    pub title: String,
}

/// Filter for `the_title`: prefixes the greeting.
#[derive(Debug)]
pub struct GreetingTitleFilter {
    /// Greeting read from settings at activation.
    greeting: String,
}

impl GreetingTitleFilter {
    /// Create a new title filter.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
        }
    }
}

#[async_trait]
impl FilterHandler<String> for GreetingTitleFilter {
    async fn filter(&self, _ctx: &HookContext, title: String) -> HookResult<String> {
        if title.is_empty() {
            return Ok(self.greeting.clone());
        }
        Ok(format!("{}, {}", self.greeting, title))
    }
}

/// Action for `post_saved`: counts saves.
#[derive(Debug)]
pub struct SaveCounter {
    /// Shared with the plugin so it survives reactivation.
    count: Arc<AtomicU64>,
}

impl SaveCounter {
    /// Create a counter over a shared total.
    pub fn new(count: Arc<AtomicU64>) -> Self {
        Self { count }
    }
}

#[async_trait]
impl ActionHandler<PostSaved> for SaveCounter {
    async fn handle(&self, ctx: &HookContext, post: &PostSaved) -> HookResult<()> {
        let total = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            post_id = post.post_id,
            request_id = %ctx.request_id,
            total = total,
            "Hello World counted a saved post"
        );
        Ok(())
    }
}
