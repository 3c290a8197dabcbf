//! Association lifecycle across repeated saves of the same parent.

use std::collections::BTreeSet;

use formlink::core::EntityId;
use formlink::reconcile::reconcile;
use formlink::store::memory::MemoryStore;
use formlink::test_utils::id_set;

use crate::common;

#[tokio::test]
async fn association_set_follows_the_edits_across_saves() {
    common::init_tracing();
    let store = MemoryStore::new();
    let policy = EntityId::from(501);

    // First save: the policy gains its initial coverage list.
    let outcome = reconcile(&store, &policy, &id_set(&[1, 2])).await.unwrap();
    assert_eq!(outcome.added, common::ids(&[1, 2]));
    assert!(outcome.removed.is_empty());

    // Second save: one coverage swapped.
    let outcome = reconcile(&store, &policy, &id_set(&[2, 3])).await.unwrap();
    assert_eq!(outcome.added, common::ids(&[3]));
    assert_eq!(outcome.removed, common::ids(&[1]));
    assert_eq!(outcome.unchanged, common::ids(&[2]));
    assert_eq!(store.associations_of(&policy).await, id_set(&[2, 3]));

    // Saving again without edits touches nothing.
    store.clear_join_log().await;
    let outcome = reconcile(&store, &policy, &id_set(&[2, 3])).await.unwrap();
    assert!(outcome.is_noop());
    assert_eq!(store.join_op_count().await, 0);

    // Clearing the list is a legal terminal state.
    let outcome = reconcile(&store, &policy, &BTreeSet::new()).await.unwrap();
    assert_eq!(outcome.removed, common::ids(&[2, 3]));
    assert!(store.associations_of(&policy).await.is_empty());
}

#[tokio::test]
async fn parents_do_not_interfere() {
    common::init_tracing();
    let store = MemoryStore::new();
    let policy_a = EntityId::from(1);
    let policy_b = EntityId::from(2);

    reconcile(&store, &policy_a, &id_set(&[10, 11])).await.unwrap();
    reconcile(&store, &policy_b, &id_set(&[11, 12])).await.unwrap();

    // Emptying A's list leaves B's rows alone, even for the shared child 11.
    reconcile(&store, &policy_a, &BTreeSet::new()).await.unwrap();
    assert!(store.associations_of(&policy_a).await.is_empty());
    assert_eq!(store.associations_of(&policy_b).await, id_set(&[11, 12]));
}

#[tokio::test]
async fn widget_serialization_does_not_cause_spurious_writes() {
    common::init_tracing();
    let store = MemoryStore::new();
    let vehicle = EntityId::from(77);
    store.seed_associations(vehicle.clone(), id_set(&[4, 5])).await;

    // The screen round-trips ids as strings; the persisted rows are numeric.
    let desired: BTreeSet<EntityId> =
        [EntityId::from("4"), EntityId::from("5")].into_iter().collect();
    let outcome = reconcile(&store, &vehicle, &desired).await.unwrap();

    assert!(outcome.is_noop());
    assert_eq!(store.join_op_count().await, 0);
}
