//! Singleton behavior of the shared config store.
//!
//! Runs in its own test binary so the first `get_or_create` call below is the
//! first one in the process.

use nullforge::core::config_store::ConfigStore;
use serde_json::{json, Value};
use std::sync::Barrier;
use std::thread;

#[test]
fn first_caller_decides_and_instance_is_shared() {
    assert!(ConfigStore::try_get().is_none());

    // Concurrent first callers all receive the same instance.
    let barrier = Barrier::new(8);
    let addresses: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    let store = ConfigStore::get_or_create(&format!("env-{}", i));
                    store as *const ConfigStore as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));

    let first = ConfigStore::get_or_create("a");
    let second = ConfigStore::get_or_create("b");
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.env_name(), second.env_name());
    assert!(first.env_name().starts_with("env-"));

    // Settings written through one handle are visible through another.
    first.set("proyecto", "patrones_iac_locales");
    assert_eq!(
        second.get("proyecto", Value::Null),
        json!("patrones_iac_locales")
    );
    assert_eq!(second.get("missing", json!("fallback")), json!("fallback"));
    assert!(std::ptr::eq(ConfigStore::try_get().unwrap(), first));
}
