//! The owner side of a strategy chain: named methods over shared state.
//!
//! A [`MethodTable`] is the crate's rendition of "an object holding methods":
//! owner state (the default execution context) plus an insertion-ordered map
//! of named callables. Chain construction resolves its target through the
//! table, and a missing name is the construction failure — strategies can
//! only target methods.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// A callable method: explicit execution context plus one argument value.
///
/// `A` carries the whole argument list; use a tuple when the wrapped method
/// takes more than one position (for example `(String, Callback)` for a
/// message plus a callback-style last argument).
pub type Method<C, A, R> = Arc<dyn Fn(&C, A) -> R + Send + Sync>;

/// Owner state plus its named methods.
pub struct MethodTable<C, A, R> {
    context: Arc<C>,
    methods: IndexMap<SmolStr, Method<C, A, R>>,
}

impl<C, A, R> MethodTable<C, A, R> {
    /// Create a table around the owner state.
    ///
    /// The state doubles as the default execution context for chains built
    /// over this table.
    pub fn new(context: impl Into<Arc<C>>) -> Self {
        Self {
            context: context.into(),
            methods: IndexMap::new(),
        }
    }

    /// Define a method under the given name, replacing any existing one.
    pub fn define<F>(&mut self, name: impl Into<SmolStr>, func: F)
    where
        F: Fn(&C, A) -> R + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(func));
    }

    /// Install an already-built callable under the given name.
    ///
    /// This is how an embedder puts a composite chain in place of the
    /// original method once construction returned it.
    pub fn install(&mut self, name: impl Into<SmolStr>, method: Method<C, A, R>) {
        self.methods.insert(name.into(), method);
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<Method<C, A, R>> {
        self.methods.get(name).map(Arc::clone)
    }

    /// Invoke a named method with the table's own context.
    pub fn call(&self, name: &str, args: A) -> Option<R> {
        self.methods.get(name).map(|m| m(&self.context, args))
    }

    /// Check whether a method exists under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Remove a method, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Method<C, A, R>> {
        self.methods.shift_remove(name)
    }

    /// Number of defined methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if no methods are defined.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// The owner state / default execution context.
    pub fn context(&self) -> Arc<C> {
        Arc::clone(&self.context)
    }
}

impl<C, A, R> fmt::Debug for MethodTable<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
