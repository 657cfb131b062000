//! Integration tests for the full wrap/register/invoke lifecycle.
//!
//! The wrapped method here follows a callback-style convention: it takes a
//! message plus a callback as its final argument and reports its result
//! through the callback, exercising the chain's argument-shape agnosticism.

use std::sync::{Arc, Mutex, Once};

use stratagem::{Method, MethodTable, Next, Strategy, StrategyEntry};

static TRACING: Once = Once::new();

/// Opt-in trace output: run with `RUST_LOG=stratagem=trace` to see
/// registration and dispatch events while the tests execute.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct Person {
    name: String,
}

type Callback = Arc<dyn Fn(String) + Send + Sync>;
type Args = (String, Callback);

/// Shared slot a callback writes its message into.
fn capture() -> (Callback, Arc<Mutex<Option<String>>>) {
    let slot = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    let cb: Callback = Arc::new(move |msg| {
        *sink.lock().unwrap() = Some(msg);
    });
    (cb, slot)
}

fn jimbabwe() -> MethodTable<Person, Args, ()> {
    init_tracing();
    let mut owner = MethodTable::new(Person {
        name: "Jimbabwe".into(),
    });
    owner.define("do_stuff", |ctx: &Person, (msg, cb): Args| {
        cb(format!("Hi, {} - {}", ctx.name, msg));
    });
    owner
}

#[test]
fn test_zero_strategies_matches_direct_target_call() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();

    let (cb, via_chain) = capture();
    strategy.call(("here's your msg...".into(), cb));

    let (cb, direct) = capture();
    strategy.target()(&owner.context(), ("here's your msg...".into(), cb));

    assert_eq!(
        via_chain.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - here's your msg...")
    );
    assert_eq!(*via_chain.lock().unwrap(), *direct.lock().unwrap());
}

#[test]
fn test_single_strategy_transforms_arguments() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(StrategyEntry::new(
        "test1",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("Yo dawg...{msg}"), cb));
        },
    ));

    let (cb, slot) = capture();
    strategy.call(("here's your msg...".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - Yo dawg...here's your msg...")
    );
}

#[test]
fn test_strategy_specific_context_overrides_chain_default() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(
        StrategyEntry::new(
            "test1",
            |next: &Next<'_, Person, Args, ()>, ctx: &Person, (msg, cb): Args| {
                next.call((format!("Yo dawg...{} says '{msg}'", ctx.name), cb));
            },
        )
        .with_context(Person {
            name: "Your mom".into(),
        }),
    );

    let (cb, slot) = capture();
    strategy.call(("here's your msg...".into(), cb));
    // The strategy ran under its own context, the target under the owner's.
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - Yo dawg...Your mom says 'here's your msg...'")
    );
}

#[test]
fn test_replacing_an_entry_keeps_first_position_and_second_handler() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(StrategyEntry::new(
        "x",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("first({msg})"), cb));
        },
    ));
    strategy.use_strategy(StrategyEntry::new(
        "tail",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("tail({msg})"), cb));
        },
    ));
    strategy.use_strategy(StrategyEntry::new(
        "x",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("second({msg})"), cb));
        },
    ));

    let names: Vec<String> = strategy
        .strategies()
        .iter()
        .map(|e| e.name().to_owned())
        .collect();
    assert_eq!(names, vec!["x", "tail"]);

    let (cb, slot) = capture();
    strategy.call(("m".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - tail(second(m))")
    );
}

#[test]
fn test_reset_restores_unwrapped_behavior() {
    let owner = jimbabwe();
    let original = owner.method("do_stuff").unwrap();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(StrategyEntry::new(
        "test1",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("Yo dawg...{msg}"), cb));
        },
    ));
    strategy.reset();

    assert_eq!(strategy.strategies().len(), 0);
    assert!(Arc::ptr_eq(&strategy.target(), &original));

    let (cb, slot) = capture();
    strategy.call(("here's your msg...".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - here's your msg...")
    );
}

#[test]
fn test_lazy_init_without_registration_leaves_owner_untouched() {
    let owner = jimbabwe();
    let original = owner.method("do_stuff").unwrap();
    let strategy = Strategy::builder(&owner, "do_stuff")
        .lazy_init(true)
        .build()
        .unwrap();

    // No composite allocated; the owner's slot is still the original method.
    assert!(!strategy.is_active());
    assert!(Arc::ptr_eq(&owner.method("do_stuff").unwrap(), &original));

    let (cb, slot) = capture();
    strategy.call(("here's your msg...".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - here's your msg...")
    );
}

#[test]
fn test_lazy_init_first_registration_activates_and_is_honored() {
    let mut owner = jimbabwe();
    let original = owner.method("do_stuff").unwrap();
    let strategy = Strategy::builder(&owner, "do_stuff")
        .lazy_init(true)
        .build()
        .unwrap();

    strategy.use_strategy(StrategyEntry::new(
        "test1",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("Yo dawg...{msg}"), cb));
        },
    ));
    assert!(strategy.is_active());
    assert_eq!(strategy.strategies().len(), 1);
    assert_eq!(strategy.strategies()[0].name(), "test1");

    // Install the composite in place of the original; the slot is now a new
    // callable, but the captured target is unchanged.
    owner.install("do_stuff", strategy.as_method());
    assert!(!Arc::ptr_eq(&owner.method("do_stuff").unwrap(), &original));
    assert!(Arc::ptr_eq(&strategy.target(), &original));

    let (cb, slot) = capture();
    let _ = owner.call("do_stuff", ("here's your msg...".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - Yo dawg...here's your msg...")
    );
}

#[test]
fn test_short_circuit_answers_without_reaching_target() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(StrategyEntry::new(
        "gate",
        |_next: &Next<'_, Person, Args, ()>, _ctx, (_msg, cb): Args| {
            cb("denied".into());
        },
    ));

    let (cb, slot) = capture();
    strategy.call(("here's your msg...".into(), cb));
    assert_eq!(slot.lock().unwrap().as_deref(), Some("denied"));
}

#[test]
fn test_multi_shot_continuation_reaches_target_per_call() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(StrategyEntry::new(
        "fanout",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("{msg} (take 1)"), Arc::clone(&cb)));
            next.call((format!("{msg} (take 2)"), cb));
        },
    ));

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let cb: Callback = Arc::new(move |msg| sink.lock().unwrap().push(msg));
    strategy.call(("m".into(), cb));

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "Hi, Jimbabwe - m (take 1)".to_owned(),
            "Hi, Jimbabwe - m (take 2)".to_owned(),
        ]
    );
}

#[test]
fn test_chain_is_shareable_across_threads() {
    let mut owner: MethodTable<(), u32, u32> = MethodTable::new(());
    owner.define("bump", |_ctx, n| n + 1);
    let strategy = Strategy::builder(&owner, "bump").build().unwrap();
    strategy.use_strategy(StrategyEntry::new("double", |next: &Next<'_, (), u32, u32>, _ctx, n| {
        next.call(n * 2)
    }));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let strategy = strategy.clone();
            std::thread::spawn(move || strategy.call(i))
        })
        .collect();
    let mut results: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_unstable();
    assert_eq!(results, vec![1, 3, 5, 7]);
}

#[test]
fn test_install_also_works_without_lazy_init() {
    // The non-lazy flow from the embedding contract: build, then assign the
    // composite back onto the owner's slot yourself.
    let mut owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    owner.install("do_stuff", strategy.as_method());

    strategy.use_strategy(StrategyEntry::new(
        "test1",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("Yo dawg...{msg}"), cb));
        },
    ));

    let (cb, slot) = capture();
    let _ = owner.call("do_stuff", ("here's your msg...".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Jimbabwe - Yo dawg...here's your msg...")
    );
}

#[test]
fn test_wrapping_a_missing_method_fails() {
    let owner = jimbabwe();
    let err = Strategy::builder(&owner, "no_such_method")
        .build()
        .unwrap_err();
    assert!(err.is_invalid_target());
}

#[test]
fn test_builder_supplied_context_governs_target() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff")
        .context(Person {
            name: "Somebody else".into(),
        })
        .build()
        .unwrap();

    let (cb, slot) = capture();
    strategy.call(("msg".into(), cb));
    assert_eq!(
        slot.lock().unwrap().as_deref(),
        Some("Hi, Somebody else - msg")
    );
}

#[test]
fn test_target_accessor_returns_a_usable_method() {
    let owner = jimbabwe();
    let strategy = Strategy::builder(&owner, "do_stuff").build().unwrap();
    strategy.use_strategy(StrategyEntry::new(
        "noise",
        |next: &Next<'_, Person, Args, ()>, _ctx, (msg, cb): Args| {
            next.call((format!("[{msg}]"), cb));
        },
    ));

    // target() bypasses the chain entirely.
    let target: Method<Person, Args, ()> = strategy.target();
    let (cb, slot) = capture();
    target(&owner.context(), ("plain".into(), cb));
    assert_eq!(slot.lock().unwrap().as_deref(), Some("Hi, Jimbabwe - plain"));
}
