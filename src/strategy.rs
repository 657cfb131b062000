//! The strategy handle: construction, lazy initialization, and dispatch.
//!
//! A [`Strategy`] wraps a method resolved from a [`MethodTable`] behind an
//! indirection cell with two states:
//!
//! - **pass-through** — no chain allocated; calls forward straight to the
//!   original target. This is the `lazy_init` starting state, for methods
//!   that may never need interception.
//! - **active** — a [`StrategyChain`] is in place and dispatch walks it.
//!
//! The first [`Strategy::use_strategy`] on a pass-through handle swaps the
//! cell to active and then registers the entry, so the composite is only
//! allocated once a strategy actually exists. A non-lazy handle is active
//! from construction.
//!
//! Handles are cheap to clone and share one state cell. Access to the entry
//! sequence is serialized with a read/write lock: `call` holds the read side
//! for the whole walk, mutators take the write side. Registering a strategy
//! from inside one of the chain's own interceptors would deadlock and is not
//! supported.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use crate::chain::StrategyChain;
use crate::entry::StrategyEntry;
use crate::error::{StrategyError, StrategyResult};
use crate::owner::{Method, MethodTable};

enum HandleState<C, A, R> {
    PassThrough {
        target: Method<C, A, R>,
        context: Arc<C>,
    },
    Active(StrategyChain<C, A, R>),
}

/// A method wrapped for interception.
pub struct Strategy<C, A, R> {
    state: Arc<RwLock<HandleState<C, A, R>>>,
}

impl<C, A, R> fmt::Debug for Strategy<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = matches!(&*self.state.read(), HandleState::Active(_));
        f.debug_struct("Strategy").field("active", &active).finish()
    }
}

impl<C, A, R> Clone for Strategy<C, A, R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<C, A, R> Strategy<C, A, R> {
    /// Start building a strategy over `owner`'s method named `prop`.
    pub fn builder<'o>(
        owner: &'o MethodTable<C, A, R>,
        prop: impl Into<SmolStr>,
    ) -> StrategyBuilder<'o, C, A, R> {
        StrategyBuilder {
            owner,
            prop: prop.into(),
            context: None,
            lazy_init: false,
        }
    }

    /// Invoke the composite: walk the chain if active, otherwise call the
    /// target directly.
    pub fn call(&self, args: A) -> R {
        let state = self.state.read();
        match &*state {
            HandleState::PassThrough { target, context } => target(context, args),
            HandleState::Active(chain) => chain.call(args),
        }
    }

    /// Register an entry, activating a pass-through handle first.
    ///
    /// Appends to the end of the sequence, or replaces the existing entry
    /// with the same name in place.
    pub fn use_strategy(&self, entry: StrategyEntry<C, A, R>) {
        let mut state = self.state.write();
        if let HandleState::PassThrough { target, context } = &*state {
            debug!("activating strategy chain on first registration");
            let chain = StrategyChain::new(Arc::clone(target), Arc::clone(context));
            *state = HandleState::Active(chain);
        }
        if let HandleState::Active(chain) = &mut *state {
            chain.use_strategy(entry);
        }
    }

    /// Clear every registered entry; target and context are untouched.
    ///
    /// A no-op on a handle that is still pass-through.
    pub fn reset(&self) {
        if let HandleState::Active(chain) = &mut *self.state.write() {
            chain.reset();
        }
    }

    /// The captured original method, in either state.
    pub fn target(&self) -> Method<C, A, R> {
        match &*self.state.read() {
            HandleState::PassThrough { target, .. } => Arc::clone(target),
            HandleState::Active(chain) => chain.target(),
        }
    }

    /// Snapshot of the registered entries in execution order.
    ///
    /// A defensive copy: mutating the returned vector has no effect on the
    /// chain. Entries are `Arc`-backed, so the copy is cheap.
    pub fn strategies(&self) -> Vec<StrategyEntry<C, A, R>> {
        match &*self.state.read() {
            HandleState::PassThrough { .. } => Vec::new(),
            HandleState::Active(chain) => chain.strategies().cloned().collect(),
        }
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        match &*self.state.read() {
            HandleState::PassThrough { .. } => 0,
            HandleState::Active(chain) => chain.len(),
        }
    }

    /// Check if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the composite chain has been allocated.
    ///
    /// `false` only for a `lazy_init` handle that has never seen a
    /// registration.
    pub fn is_active(&self) -> bool {
        matches!(&*self.state.read(), HandleState::Active(_))
    }

    /// The default execution context.
    pub fn context(&self) -> Arc<C> {
        match &*self.state.read() {
            HandleState::PassThrough { context, .. } => Arc::clone(context),
            HandleState::Active(chain) => chain.context(),
        }
    }

    /// Replace the default execution context.
    pub fn set_context(&self, new_context: impl Into<Arc<C>>) {
        let new_context = new_context.into();
        match &mut *self.state.write() {
            HandleState::PassThrough { context, .. } => *context = new_context,
            HandleState::Active(chain) => chain.set_context(new_context),
        }
    }
}

impl<C, A, R> Strategy<C, A, R>
where
    C: Send + Sync + 'static,
    A: 'static,
    R: 'static,
{
    /// Adapt the handle into a [`Method`] so it can be installed back into a
    /// [`MethodTable`] in place of the original.
    ///
    /// The caller-side context argument is ignored: the chain's own default
    /// context governs dispatch, exactly as direct `call` does. Strategies
    /// registered after installation still take effect, since the installed
    /// callable shares the handle's state.
    pub fn as_method(&self) -> Method<C, A, R> {
        let state = Arc::clone(&self.state);
        Arc::new(move |_caller_context: &C, args: A| {
            let state = state.read();
            match &*state {
                HandleState::PassThrough { target, context } => target(context, args),
                HandleState::Active(chain) => chain.call(args),
            }
        })
    }
}

/// Builder for [`Strategy`].
///
/// ```rust
/// use stratagem::{MethodTable, Strategy};
///
/// let mut owner: MethodTable<(), u32, u32> = MethodTable::new(());
/// owner.define("bump", |_ctx, n| n + 1);
///
/// let strategy = Strategy::builder(&owner, "bump").lazy_init(true).build().unwrap();
/// assert_eq!(strategy.call(1), 2);
/// ```
pub struct StrategyBuilder<'o, C, A, R> {
    owner: &'o MethodTable<C, A, R>,
    prop: SmolStr,
    context: Option<Arc<C>>,
    lazy_init: bool,
}

impl<C, A, R> StrategyBuilder<'_, C, A, R> {
    /// Override the default execution context.
    ///
    /// When unset, the owner's own state is the context.
    pub fn context(mut self, context: impl Into<Arc<C>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Defer chain allocation until the first registration.
    pub fn lazy_init(mut self, lazy: bool) -> Self {
        self.lazy_init = lazy;
        self
    }

    /// Resolve the target and build the handle.
    ///
    /// Fails with [`StrategyError::InvalidTarget`] when the owner has no
    /// method under the requested name.
    pub fn build(self) -> StrategyResult<Strategy<C, A, R>> {
        let target = self
            .owner
            .method(&self.prop)
            .ok_or_else(|| StrategyError::invalid_target(self.prop.clone()))?;
        let context = self.context.unwrap_or_else(|| self.owner.context());
        let state = if self.lazy_init {
            HandleState::PassThrough { target, context }
        } else {
            HandleState::Active(StrategyChain::new(target, context))
        };
        Ok(Strategy {
            state: Arc::new(RwLock::new(state)),
        })
    }
}
