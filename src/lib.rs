//! # stratagem
//!
//! Composable strategy chains for synchronous method interception.
//!
//! A strategy chain wraps an existing method so additional behavior can be
//! layered around it without touching its source. Named interceptors are
//! registered in order and threaded together with a continuation ([`Next`]):
//! each interceptor may transform arguments before forwarding, short-circuit
//! by never calling the continuation, or call it more than once. The chain
//! terminates at the original method (the "target").
//!
//! ## Wrapping a method
//!
//! ```rust
//! use stratagem::{MethodTable, Next, Strategy, StrategyEntry};
//!
//! struct Greeter {
//!     name: String,
//! }
//!
//! // An "owner object": state plus named methods over that state.
//! let mut owner: MethodTable<Greeter, String, String> = MethodTable::new(Greeter {
//!     name: "Jimbabwe".into(),
//! });
//! owner.define("greet", |ctx: &Greeter, msg: String| {
//!     format!("Hi, {} - {}", ctx.name, msg)
//! });
//!
//! let strategy = Strategy::builder(&owner, "greet").build().unwrap();
//! strategy.use_strategy(StrategyEntry::new(
//!     "embellish",
//!     |next: &Next<'_, Greeter, String, String>, _ctx, msg: String| {
//!         next.call(format!("Yo dawg...{msg}"))
//!     },
//! ));
//!
//! assert_eq!(strategy.call("hello".into()), "Hi, Jimbabwe - Yo dawg...hello");
//! ```
//!
//! ## Lazy initialization
//!
//! With `lazy_init`, the composite chain is only allocated once a strategy is
//! actually registered; until then calls pass straight through to the target:
//!
//! ```rust
//! use stratagem::{MethodTable, Strategy, StrategyEntry};
//!
//! let mut owner: MethodTable<(), u32, u32> = MethodTable::new(());
//! owner.define("bump", |_ctx, n| n + 1);
//!
//! let strategy = Strategy::builder(&owner, "bump").lazy_init(true).build().unwrap();
//! assert!(!strategy.is_active());
//!
//! strategy.use_strategy(StrategyEntry::new("double", |next, _ctx, n| next.call(n * 2)));
//! assert!(strategy.is_active());
//! assert_eq!(strategy.call(3), 7);
//! ```
//!
//! ## Semantics
//!
//! - Registration order is execution order; there is no priority mechanism.
//! - Entry names are unique per chain. Re-registering a name replaces the
//!   entry *in place*, so execution order stays stable across idempotent
//!   setup code.
//! - A chain with no entries behaves exactly like the target called with the
//!   chain's default context.
//! - Each invocation gets a fresh cursor; within one invocation every
//!   `next.call` advances the same cursor, which permits multi-shot
//!   continuations.
//! - The chain never catches errors: a panic in an interceptor or the target
//!   unwinds to the caller as if the method had been called directly.
//!
//! Everything is synchronous; there is no async variant of the chain.

pub mod chain;
pub mod entry;
pub mod error;
pub mod owner;
pub mod strategy;

pub use chain::{Next, StrategyChain};
pub use entry::{EntryBuilder, StrategyEntry, StrategyFn};
pub use error::{StrategyError, StrategyResult};
pub use owner::{Method, MethodTable};
pub use strategy::{Strategy, StrategyBuilder};
