//! Common fixtures for formlink integration tests.

// Allow dead code because these utilities are shared across test files and
// not every file uses every helper.
#![allow(dead_code)]

use formlink::core::EntityId;
use formlink::selection::DependentOption;
use formlink::store::memory::MemoryStore;

/// Initialize tracing output for a test run (respects `RUST_LOG`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A store seeded with the holder namespaces the policy screens use.
///
/// `individual` and `organization` deliberately share the raw id `7`: the two
/// namespaces are unrelated and the selection rules must keep them apart.
pub async fn holder_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .seed_namespace(
            "individual",
            [
                DependentOption::new(7, "Ana Souza"),
                DependentOption::new(8, "Bruno Lima"),
            ],
        )
        .await;
    store
        .seed_namespace(
            "organization",
            [
                DependentOption::new(7, "Acme Transportes"),
                DependentOption::new(21, "Birch Seguros"),
            ],
        )
        .await;
    store
}

/// A store seeded with a brand → model → year vehicle catalog.
pub async fn vehicle_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .seed_namespace("brand", [DependentOption::new(1, "Fiat"), DependentOption::new(2, "VW")])
        .await;
    store
        .seed_namespace(
            "model:1",
            [DependentOption::new(10, "Uno"), DependentOption::new(11, "Argo")],
        )
        .await;
    store
        .seed_namespace("model:2", [DependentOption::new(20, "Gol")])
        .await;
    store
        .seed_namespace(
            "year:10",
            [DependentOption::new(2022, "2022"), DependentOption::new(2023, "2023")],
        )
        .await;
    store
}

/// Build a `Vec` of numeric ids (ordering helper for assertions).
pub fn ids(values: &[i64]) -> Vec<EntityId> {
    values.iter().map(|&v| EntityId::from(v)).collect()
}
