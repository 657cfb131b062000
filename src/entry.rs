//! Named interceptor entries and their builder.
//!
//! An entry pairs a unique name with an interceptor function. The name is the
//! replacement key: registering a second entry under the same name swaps the
//! function in place without moving the entry's position in the chain. An
//! entry may also carry its own execution context, overriding the chain
//! default for that entry only.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::chain::Next;
use crate::error::{StrategyError, StrategyResult};

/// An interceptor function: receives the continuation, the execution context,
/// and the arguments forwarded by the previous link in the chain.
///
/// Call `next.call(args)` to proceed to the following interceptor (or the
/// target once the sequence is exhausted), skip it to short-circuit, or call
/// it more than once for branching/retry shapes.
pub type StrategyFn<C, A, R> = Arc<dyn Fn(&Next<'_, C, A, R>, &C, A) -> R + Send + Sync>;

/// A named interceptor registered on a strategy chain.
pub struct StrategyEntry<C, A, R> {
    name: SmolStr,
    func: StrategyFn<C, A, R>,
    context: Option<Arc<C>>,
}

// Entries are Arc-backed, so cloning is cheap and needs no bounds on the
// chain's type parameters.
impl<C, A, R> Clone for StrategyEntry<C, A, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
            context: self.context.clone(),
        }
    }
}

impl<C, A, R> StrategyEntry<C, A, R> {
    /// Create an entry from a name and an interceptor function.
    pub fn new<F>(name: impl Into<SmolStr>, func: F) -> Self
    where
        F: Fn(&Next<'_, C, A, R>, &C, A) -> R + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            context: None,
        }
    }

    /// Override the execution context for this entry only.
    pub fn with_context(mut self, context: impl Into<Arc<C>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Start building an entry field by field.
    pub fn builder() -> EntryBuilder<C, A, R> {
        EntryBuilder::new()
    }

    /// The entry's unique name within its chain.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entry's context override, if any.
    pub fn context(&self) -> Option<&C> {
        self.context.as_deref()
    }

    pub(crate) fn key(&self) -> SmolStr {
        self.name.clone()
    }

    /// Invoke the interceptor, resolving the context override against the
    /// chain default.
    pub(crate) fn invoke(&self, next: &Next<'_, C, A, R>, fallback: &C, args: A) -> R {
        let context = self.context.as_deref().unwrap_or(fallback);
        (self.func)(next, context, args)
    }
}

impl<C, A, R> fmt::Debug for StrategyEntry<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyEntry")
            .field("name", &self.name)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

/// Builder for [`StrategyEntry`].
///
/// Unlike [`StrategyEntry::new`], which makes missing fields unrepresentable,
/// the builder validates at `build()` time and rejects an entry with no name
/// or no handler with [`StrategyError::InvalidEntry`]. An empty name is
/// accepted; only an *unset* one is an error.
pub struct EntryBuilder<C, A, R> {
    name: Option<SmolStr>,
    func: Option<StrategyFn<C, A, R>>,
    context: Option<Arc<C>>,
}

impl<C, A, R> EntryBuilder<C, A, R> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            name: None,
            func: None,
            context: None,
        }
    }

    /// Set the entry name.
    pub fn name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the interceptor function.
    pub fn handler<F>(mut self, func: F) -> Self
    where
        F: Fn(&Next<'_, C, A, R>, &C, A) -> R + Send + Sync + 'static,
    {
        self.func = Some(Arc::new(func));
        self
    }

    /// Set the per-entry context override.
    pub fn context(mut self, context: impl Into<Arc<C>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Build the entry, validating that both name and handler were supplied.
    pub fn build(self) -> StrategyResult<StrategyEntry<C, A, R>> {
        let name = self
            .name
            .ok_or_else(|| StrategyError::invalid_entry("entry has no name"))?;
        let func = self
            .func
            .ok_or_else(|| StrategyError::invalid_entry("entry has no handler"))?;
        Ok(StrategyEntry {
            name,
            func,
            context: self.context,
        })
    }
}

impl<C, A, R> Default for EntryBuilder<C, A, R> {
    fn default() -> Self {
        Self::new()
    }
}
