//! Brand → model → year chains driven through the fetch loop.

use formlink::core::EntityId;
use formlink::selection::ValidationState;
use formlink::selection::cascade::{CascadeController, LevelSpec};
use formlink::store::OptionSource;
use formlink::store::memory::MemoryStore;

use crate::common;

/// Drain the cascade's pending fetches against an option source.
async fn pump(cascade: &mut CascadeController, store: &MemoryStore) {
    while let Some(fetch) = cascade.next_fetch() {
        let result = store.fetch_options(&fetch.namespace).await;
        cascade.complete_fetch(fetch, result);
    }
}

fn vehicle_cascade() -> CascadeController {
    CascadeController::new([
        LevelSpec::required("brand"),
        LevelSpec::required("model"),
        LevelSpec::optional("year"),
    ])
}

#[tokio::test]
async fn walking_down_the_chain_loads_scoped_namespaces() {
    common::init_tracing();
    let store = common::vehicle_store().await;
    let mut cascade = vehicle_cascade();

    pump(&mut cascade, &store).await;
    cascade.select(0, Some(EntityId::from(1))).unwrap();

    pump(&mut cascade, &store).await;
    // Models are scoped to Fiat (namespace "model:1").
    let models: Vec<_> =
        cascade.loaded_options(1).unwrap().iter().map(|o| o.label.clone()).collect();
    assert_eq!(models, vec!["Uno", "Argo"]);

    cascade.select(1, Some(EntityId::from(10))).unwrap();
    pump(&mut cascade, &store).await;
    cascade.select(2, Some(EntityId::from(2022))).unwrap();

    assert_eq!(cascade.validation_state(), ValidationState::Valid);
}

#[tokio::test]
async fn changing_the_brand_resets_model_and_year() {
    common::init_tracing();
    let store = common::vehicle_store().await;
    let mut cascade = vehicle_cascade();

    pump(&mut cascade, &store).await;
    cascade.select(0, Some(EntityId::from(1))).unwrap();
    pump(&mut cascade, &store).await;
    cascade.select(1, Some(EntityId::from(10))).unwrap();
    pump(&mut cascade, &store).await;
    cascade.select(2, Some(EntityId::from(2022))).unwrap();

    // New brand: the whole downstream chain is invalid.
    cascade.select(0, Some(EntityId::from(2))).unwrap();
    assert!(cascade.selected(1).is_none());
    assert!(cascade.selected(2).is_none());
    assert_eq!(cascade.validation_state(), ValidationState::Incomplete);

    // The loop reloads models for VW; Fiat's Uno is no longer selectable.
    pump(&mut cascade, &store).await;
    assert!(cascade.select(1, Some(EntityId::from(10))).is_err());
    cascade.select(1, Some(EntityId::from(20))).unwrap();
    assert_eq!(cascade.validation_state(), ValidationState::Valid);
}

#[tokio::test]
async fn missing_catalog_level_is_unavailable_not_stuck() {
    common::init_tracing();
    let store = common::vehicle_store().await;
    let mut cascade = vehicle_cascade();

    pump(&mut cascade, &store).await;
    cascade.select(0, Some(EntityId::from(2))).unwrap();
    pump(&mut cascade, &store).await;
    cascade.select(1, Some(EntityId::from(20))).unwrap();

    // No "year:20" namespace is seeded: the fetch fails, the level becomes
    // unavailable, and validation still passes because year is optional.
    pump(&mut cascade, &store).await;
    assert!(cascade.loaded_options(2).is_none());
    assert_eq!(cascade.validation_state(), ValidationState::Valid);
}
