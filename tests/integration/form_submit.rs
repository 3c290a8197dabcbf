//! Full submissions: ordering, failure severities, config-driven policies.

use serde_json::json;

use formlink::config::PolicyConfig;
use formlink::core::{EntityId, FormlinkError, Severity, user_friendly_error};
use formlink::form::{FormFlow, SubmitOutcome};
use formlink::selection::AlwaysRequired;
use formlink::store::memory::MemoryStore;
use formlink::test_utils::{FlakyAssociationStore, id_set};

use crate::common;

async fn holder_form(store: &MemoryStore) -> FormFlow<String> {
    let mut form: FormFlow<String> = FormFlow::new();
    let ticket = form.selection_mut().set_classifier(Some("individual".to_string())).unwrap();
    form.fetch_into(store, ticket).await.unwrap();
    form.selection_mut().set_dependent(Some(EntityId::from(7))).unwrap();
    form
}

#[tokio::test]
async fn the_happy_path_saves_and_links_in_order() {
    common::init_tracing();
    let store = common::holder_store().await;
    let mut form = holder_form(&store).await;
    form.set_desired_children(id_set(&[31, 32]));

    let outcome = form
        .submit(&json!({ "kind": "policy", "premium": 1200 }), &store, &store, &AlwaysRequired)
        .await
        .unwrap();

    assert!(outcome.fully_applied());
    let parent = outcome.parent().clone();
    assert_eq!(store.parent_record(&parent).await.unwrap()["premium"], 1200);
    assert_eq!(store.associations_of(&parent).await, id_set(&[31, 32]));
}

#[tokio::test]
async fn editing_an_existing_record_reconciles_instead_of_rewriting() {
    common::init_tracing();
    let store = common::holder_store().await;
    let policy = EntityId::from(9);
    store.seed_associations(policy.clone(), id_set(&[1, 2, 3])).await;

    let mut form = holder_form(&store).await;
    form.set_desired_children(id_set(&[2, 3, 4]));

    let outcome = form
        .submit(&json!({ "id": 9, "kind": "policy" }), &store, &store, &AlwaysRequired)
        .await
        .unwrap();

    let SubmitOutcome::Saved { parent, links } = outcome else {
        panic!("expected full save");
    };
    assert_eq!(parent, policy);
    // The untouched overlap is exactly {2, 3}: two operations total, not a
    // delete-all-then-reinsert of five rows.
    assert_eq!(links.added, common::ids(&[4]));
    assert_eq!(links.removed, common::ids(&[1]));
    assert_eq!(links.unchanged, common::ids(&[2, 3]));
    assert_eq!(store.join_op_count().await, 2);
}

#[tokio::test]
async fn the_two_failure_severities_stay_distinct() {
    common::init_tracing();
    let parents = common::holder_store().await;
    let assoc = FlakyAssociationStore::new();
    assoc.fail_add(EntityId::from(32)).await;

    let mut form = holder_form(&parents).await;
    form.set_desired_children(id_set(&[31, 32]));

    // Association failure after a successful save: warning severity, the
    // message says the record itself went through.
    let outcome = form.submit(&json!({}), &parents, &assoc, &AlwaysRequired).await.unwrap();
    let warning = outcome.link_failure().expect("partial links");
    let rendered = user_friendly_error(warning);
    assert_eq!(rendered.severity, Severity::Warning);

    // Validation failure before any save: error severity.
    let mut blank: FormFlow<String> = FormFlow::new();
    let err = blank.submit(&json!({}), &parents, &assoc, &AlwaysRequired).await.unwrap_err();
    let rendered = user_friendly_error(err);
    assert_eq!(rendered.severity, Severity::Error);
}

#[tokio::test]
async fn config_policy_drives_what_the_form_requires() {
    common::init_tracing();
    let store = common::holder_store().await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("formlink.toml");
    std::fs::write(
        &path,
        r#"
default_requires_dependent = false

[forms.policy_editor.require]
individual = true
"#,
    )
    .unwrap();
    let config = PolicyConfig::load(&path).unwrap();

    // On the policy editor an individual holder must be chosen...
    let mut form: FormFlow<String> = FormFlow::new();
    let ticket = form.selection_mut().set_classifier(Some("individual".to_string())).unwrap();
    form.fetch_into(&store, ticket).await.unwrap();

    let policy = config.for_form("policy_editor");
    let err = form.submit(&json!({}), &store, &store, &policy).await.unwrap_err();
    assert!(matches!(err, FormlinkError::IncompleteForm { .. }));

    // ...but the same empty dependent submits fine on other screens.
    let other = config.for_form("vehicle_editor");
    let outcome = form.submit(&json!({}), &store, &store, &other).await.unwrap();
    assert!(outcome.fully_applied());
}
