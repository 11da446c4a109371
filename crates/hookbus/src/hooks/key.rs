//! Typed event keys binding an event name to its payload type.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Key for an action event whose handlers receive `&P`.
///
/// ```rust,ignore
/// pub const SAVE_POST: ActionKey<PostSaved> = ActionKey::new("core/save_post");
/// ```
pub struct ActionKey<P> {
    name: Cow<'static, str>,
    _payload: PhantomData<fn() -> P>,
}

impl<P> ActionKey<P> {
    /// Creates a key from a static event name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _payload: PhantomData,
        }
    }

    /// Creates a key from a runtime event name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _payload: PhantomData,
        }
    }

    /// Returns the event name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Key for a filter whose handlers transform a `V` into a `V`.
pub struct FilterKey<V> {
    name: Cow<'static, str>,
    _value: PhantomData<fn() -> V>,
}

impl<V> FilterKey<V> {
    /// Creates a key from a static filter name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _value: PhantomData,
        }
    }

    /// Creates a key from a runtime filter name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _value: PhantomData,
        }
    }

    /// Returns the filter name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

// Manual impls so that `P`/`V` need not be `Clone` or `Debug`.

impl<P> Clone for ActionKey<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<V> Clone for FilterKey<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _value: PhantomData,
        }
    }
}

impl<P> fmt::Debug for ActionKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionKey")
            .field("name", &self.name)
            .field("payload", &std::any::type_name::<P>())
            .finish()
    }
}

impl<V> fmt::Debug for FilterKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterKey")
            .field("name", &self.name)
            .field("value", &std::any::type_name::<V>())
            .finish()
    }
}

impl<P> fmt::Display for ActionKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<V> fmt::Display for FilterKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
