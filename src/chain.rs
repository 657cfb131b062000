//! The active strategy chain and its continuation.
//!
//! The chain executes entries in registration order, with each interceptor
//! able to:
//! - transform arguments before passing them on
//! - short-circuit by not calling [`Next::call`]
//! - call [`Next::call`] more than once (branching, retry)
//!
//! The walk terminates at the captured target method. Each invocation gets a
//! fresh cursor, so chains are reentrant; within one invocation the cursor is
//! shared by every `next` call, which is what lets a repeated `next` advance
//! through the remaining entries instead of re-entering the same one.

use std::cell::Cell;

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::trace;

use crate::entry::StrategyEntry;
use crate::owner::Method;

/// An ordered chain of named interceptors terminating at a target method.
///
/// Entry names are unique: registering a name that already exists replaces
/// the entry in place, preserving its position in the execution order.
pub struct StrategyChain<C, A, R> {
    target: Method<C, A, R>,
    entries: IndexMap<SmolStr, StrategyEntry<C, A, R>>,
    context: Arc<C>,
}

impl<C, A, R> StrategyChain<C, A, R> {
    /// Create an empty chain around a target and a default execution context.
    pub fn new(target: Method<C, A, R>, context: impl Into<Arc<C>>) -> Self {
        Self {
            target,
            entries: IndexMap::new(),
            context: context.into(),
        }
    }

    /// Invoke the chain with the given arguments.
    ///
    /// With no entries registered this is exactly a call to the target with
    /// the chain's default context.
    pub fn call(&self, args: A) -> R {
        let next = Next {
            chain: self,
            cursor: Cell::new(0),
        };
        next.call(args)
    }

    /// Register an entry at the end of the chain, or replace the existing
    /// entry with the same name in place.
    pub fn use_strategy(&mut self, entry: StrategyEntry<C, A, R>) {
        trace!(name = entry.name(), "registering strategy");
        self.entries.insert(entry.key(), entry);
    }

    /// Clear every registered entry. Target and context are untouched.
    pub fn reset(&mut self) {
        trace!(count = self.entries.len(), "resetting strategies");
        self.entries.clear();
    }

    /// The captured original method.
    pub fn target(&self) -> Method<C, A, R> {
        Arc::clone(&self.target)
    }

    /// Iterate the registered entries in execution order.
    pub fn strategies(&self) -> impl ExactSizeIterator<Item = &StrategyEntry<C, A, R>> {
        self.entries.values()
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The chain's default execution context.
    pub fn context(&self) -> Arc<C> {
        Arc::clone(&self.context)
    }

    /// Replace the chain's default execution context.
    pub fn set_context(&mut self, context: impl Into<Arc<C>>) {
        self.context = context.into();
    }
}

/// The continuation handed to each interceptor.
///
/// Calling it proceeds to the next entry in the chain, or to the target once
/// the entries are exhausted. The cursor lives for a single invocation of the
/// chain and is shared across nested `call`s within it.
pub struct Next<'a, C, A, R> {
    chain: &'a StrategyChain<C, A, R>,
    cursor: Cell<usize>,
}

impl<C, A, R> Next<'_, C, A, R> {
    /// Advance the chain: dispatch to the entry at the current cursor, or to
    /// the target if the cursor has moved past the end.
    ///
    /// The entry runs under its own context override when it has one,
    /// otherwise under the chain default. The target always runs under the
    /// chain default.
    pub fn call(&self, args: A) -> R {
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        match self.chain.entries.get_index(index) {
            Some((name, entry)) => {
                trace!(index, strategy = name.as_str(), "dispatching to strategy");
                entry.invoke(self, &self.chain.context, args)
            }
            None => {
                trace!(index, "dispatching to target");
                (self.chain.target)(&self.chain.context, args)
            }
        }
    }
}
