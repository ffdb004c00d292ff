//! Template materialization and repair tests over the full engine.

use dochub_core::types::EntityKind;

use crate::helpers;

#[tokio::test]
async fn test_nested_template_materializes_whole_subtree() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.directory.insert_deal("d1", "Retrofit", Some("c1")).await;
    eng.seed_template(
        EntityKind::Deal,
        &[
            ("01. Contracts", None),
            ("Drafts", Some(0)),
            ("Signed", Some(0)),
            ("02. Archive", None),
        ],
    )
    .await;

    let mapping = eng
        .reconciler
        .ensure_structure(EntityKind::Deal, "d1")
        .await
        .unwrap();

    let names = eng.child_names(&mapping.external_folder_id).await;
    assert_eq!(names, vec!["01. Contracts", "02. Archive"]);

    let contracts = eng
        .sole_child(&mapping.external_folder_id, "01. Contracts")
        .await;
    assert_eq!(eng.child_names(&contracts).await, vec!["Drafts", "Signed"]);
}

#[tokio::test]
async fn test_entity_without_active_template_gets_empty_folder() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.directory.insert_deal("d1", "Bare", Some("c1")).await;

    let mapping = eng
        .reconciler
        .ensure_structure(EntityKind::Deal, "d1")
        .await
        .unwrap();

    assert!(eng.child_names(&mapping.external_folder_id).await.is_empty());
}

#[tokio::test]
async fn test_repair_heals_out_of_band_deletion() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.directory.insert_deal("d1", "Retrofit", Some("c1")).await;
    eng.seed_template(
        EntityKind::Deal,
        &[("01. Intake", None), ("02. Quotes", None), ("03. Archive", None)],
    )
    .await;

    let mapping = eng
        .reconciler
        .ensure_structure(EntityKind::Deal, "d1")
        .await
        .unwrap();
    let deal_folder = mapping.external_folder_id.clone();

    let quotes = eng.sole_child(&deal_folder, "02. Quotes").await;
    eng.store.delete_out_of_band(&quotes).await;

    assert!(
        eng.reconciler
            .repair_structure(EntityKind::Deal, "d1")
            .await
            .unwrap()
    );

    // The deleted folder is back (as a new folder) and its siblings were
    // not duplicated.
    eng.sole_child(&deal_folder, "01. Intake").await;
    let healed = eng.sole_child(&deal_folder, "02. Quotes").await;
    assert_ne!(healed, quotes);
    eng.sole_child(&deal_folder, "03. Archive").await;
}

#[tokio::test]
async fn test_repair_heals_nested_deletion_after_no_op_repair() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.directory.insert_deal("d1", "Retrofit", Some("c1")).await;
    eng.seed_template(
        EntityKind::Deal,
        &[("00. Admin", None), ("Invoices", Some(0))],
    )
    .await;

    let mapping = eng
        .reconciler
        .ensure_structure(EntityKind::Deal, "d1")
        .await
        .unwrap();

    // A repair of an intact structure reuses every node and leaves the
    // listing cache warm at every level.
    assert!(
        eng.reconciler
            .repair_structure(EntityKind::Deal, "d1")
            .await
            .unwrap()
    );

    let admin = eng.sole_child(&mapping.external_folder_id, "00. Admin").await;
    let invoices = eng.sole_child(&admin, "Invoices").await;
    eng.store.delete_out_of_band(&invoices).await;

    assert!(
        eng.reconciler
            .repair_structure(EntityKind::Deal, "d1")
            .await
            .unwrap()
    );

    let healed = eng.sole_child(&admin, "Invoices").await;
    assert_ne!(healed, invoices);
}

#[tokio::test]
async fn test_repair_is_a_no_op_when_structure_is_intact() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.seed_template(EntityKind::Company, &[("Documents", None)])
        .await;

    eng.reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap();
    let creates_before = eng.store.create_calls().await;

    assert!(
        eng.reconciler
            .repair_structure(EntityKind::Company, "c1")
            .await
            .unwrap()
    );

    assert_eq!(eng.store.create_calls().await, creates_before);
}

#[tokio::test]
async fn test_store_outage_surfaces_retryable_error_and_resumes() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.seed_template(EntityKind::Company, &[("Documents", None)])
        .await;

    eng.store.fail_next_creates(1).await;
    let err = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    // The caller retries; the run converges without duplicates.
    let mapping = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap();
    eng.sole_child(&mapping.external_folder_id, "Documents").await;
    assert_eq!(eng.mappings.row_count().await, 2);
}
