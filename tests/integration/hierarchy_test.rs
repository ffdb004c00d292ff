//! End-to-end hierarchy reconciliation tests.

use dochub_core::error::ErrorKind;
use dochub_core::types::{EntityKind, EntityRef};
use dochub_database::repositories::MappingRepository;

use crate::helpers;

const DEAL_TEMPLATE: &[(&str, Option<usize>)] = &[
    ("01. Intake", None),
    ("02. Quotes", None),
    ("03. Contracts", None),
    ("04. Engineering", None),
    ("05. Procurement", None),
    ("06. Delivery", None),
    ("07. Invoicing", None),
    ("08. Correspondence", None),
    ("09. Archive", None),
];

#[tokio::test]
async fn test_deal_provisioning_builds_full_hierarchy() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.directory
        .insert_deal("d1", "Furnace Retrofit", Some("c1"))
        .await;
    eng.seed_template(EntityKind::Deal, DEAL_TEMPLATE).await;

    let mapping = eng
        .reconciler
        .ensure_structure(EntityKind::Deal, "d1")
        .await
        .unwrap();

    // Root -> company -> structural deals folder -> deal folder.
    let root = eng
        .mappings
        .find_by_entity(&EntityRef::system_root())
        .await
        .unwrap()
        .expect("system root should be provisioned");
    let company_folder = eng.sole_child(&root.external_folder_id, "Acme").await;
    let deals_folder = eng.sole_child(&company_folder, "02. Deals").await;
    let deal_folder = eng
        .sole_child(&deals_folder, "Deal - Furnace Retrofit")
        .await;
    assert_eq!(mapping.external_folder_id, deal_folder);

    // All nine template folders exist beneath the deal folder.
    let names = eng.child_names(&deal_folder).await;
    let expected: Vec<&str> = DEAL_TEMPLATE.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, expected);

    // Company mapping was provisioned on the way down.
    let company = eng
        .mappings
        .find_by_entity(&EntityRef::new(EntityKind::Company, "c1"))
        .await
        .unwrap()
        .expect("company should be provisioned");
    assert_eq!(company.external_folder_id, company_folder);
}

#[tokio::test]
async fn test_ensure_is_idempotent() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;

    let first = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap();
    let creates_after_first = eng.store.create_calls().await;
    let folders_after_first = eng.store.folder_count().await;

    for _ in 0..5 {
        let again = eng
            .reconciler
            .ensure_structure(EntityKind::Company, "c1")
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.external_folder_id, first.external_folder_id);
    }

    // Subsequent calls hit the fast path and never touch the store.
    assert_eq!(eng.store.create_calls().await, creates_after_first);
    assert_eq!(eng.store.folder_count().await, folders_after_first);
    // One row for the system root, one for the company.
    assert_eq!(eng.mappings.row_count().await, 2);
}

#[tokio::test]
async fn test_concurrent_ensure_yields_one_live_mapping() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;

    let (a, b) = tokio::join!(
        eng.reconciler.ensure_structure(EntityKind::Company, "c1"),
        eng.reconciler.ensure_structure(EntityKind::Company, "c1"),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // Both callers observe the same live mapping, whoever won the race.
    let live = eng
        .mappings
        .find_by_entity(&EntityRef::new(EntityKind::Company, "c1"))
        .await
        .unwrap()
        .expect("one live mapping must exist");
    assert_eq!(a.id, live.id);
    assert_eq!(b.id, live.id);

    // A raced loser may leave an orphan folder; it never leaves a row.
    let root = eng
        .mappings
        .find_by_entity(&EntityRef::system_root())
        .await
        .unwrap()
        .unwrap();
    let candidates = eng
        .store
        .folders_named(&root.external_folder_id, "Acme")
        .await;
    assert!(candidates.contains(&live.external_folder_id));
    assert_eq!(eng.mappings.row_count().await, 2);
}

#[tokio::test]
async fn test_same_id_across_kinds_does_not_collide() {
    let eng = helpers::engine();
    eng.directory.insert_company("x1", "Globex").await;
    eng.directory.insert_lead("x1", "Hank", Some("x1")).await;

    let company = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "x1")
        .await
        .unwrap();
    let lead = eng
        .reconciler
        .ensure_structure(EntityKind::Lead, "x1")
        .await
        .unwrap();

    assert_ne!(company.external_folder_id, lead.external_folder_id);

    // The lead folder sits in the structural leads folder of its company.
    let leads_folder = eng
        .sole_child(&company.external_folder_id, "01. Leads")
        .await;
    let lead_folder = eng.sole_child(&leads_folder, "Lead - Hank").await;
    assert_eq!(lead.external_folder_id, lead_folder);
}

#[tokio::test]
async fn test_lead_without_company_lands_under_root() {
    let eng = helpers::engine();
    eng.directory.insert_lead("l9", "Solo", None).await;

    let lead = eng
        .reconciler
        .ensure_structure(EntityKind::Lead, "l9")
        .await
        .unwrap();

    let root = eng
        .mappings
        .find_by_entity(&EntityRef::system_root())
        .await
        .unwrap()
        .unwrap();
    let folder = eng.sole_child(&root.external_folder_id, "Lead - Solo").await;
    assert_eq!(lead.external_folder_id, folder);
}

#[tokio::test]
async fn test_unknown_entity_is_not_found() {
    let eng = helpers::engine();

    let err = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "ghost")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Nothing was persisted for the failed ensure beyond the system root.
    assert!(eng.mappings.row_count().await <= 1);
}

#[tokio::test]
async fn test_retired_mapping_is_never_silently_recreated() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;

    let original = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap();

    assert!(
        eng.reconciler
            .retire_structure(EntityKind::Company, "c1", "ana", "offboarded")
            .await
            .unwrap()
    );
    // Retiring again is a no-op.
    assert!(
        !eng.reconciler
            .retire_structure(EntityKind::Company, "c1", "ana", "offboarded")
            .await
            .unwrap()
    );

    // A plain ensure refuses to resurrect the structure.
    let err = eng
        .reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    // Reinstating provisions a fresh folder; the retired row stays put.
    let reinstated = eng
        .reconciler
        .reinstate_structure(EntityKind::Company, "c1")
        .await
        .unwrap();
    assert_ne!(reinstated.id, original.id);
    assert_ne!(reinstated.external_folder_id, original.external_folder_id);

    let history = eng
        .mappings
        .find_by_entity_including_deleted(&EntityRef::new(EntityKind::Company, "c1"))
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|m| m.is_deleted()).count(), 1);

    // Reinstate is idempotent once a live mapping exists.
    let again = eng
        .reconciler
        .reinstate_structure(EntityKind::Company, "c1")
        .await
        .unwrap();
    assert_eq!(again.id, reinstated.id);
}

#[tokio::test]
async fn test_repair_without_mapping_reports_nothing_to_do() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;

    assert!(
        !eng.reconciler
            .repair_structure(EntityKind::Company, "c1")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_system_root_is_a_singleton() {
    let eng = helpers::engine();
    eng.directory.insert_company("c1", "Acme").await;
    eng.directory.insert_company("c2", "Globex").await;

    eng.reconciler
        .ensure_structure(EntityKind::Company, "c1")
        .await
        .unwrap();
    eng.reconciler
        .ensure_structure(EntityKind::Company, "c2")
        .await
        .unwrap();

    // Root plus two companies; a second root would add a fourth row.
    assert_eq!(eng.mappings.row_count().await, 3);

    let root = eng
        .reconciler
        .ensure_structure(EntityKind::SystemRoot, "companies-root")
        .await
        .unwrap();
    eng.sole_child(&root.external_folder_id, "Acme").await;
    eng.sole_child(&root.external_folder_id, "Globex").await;
}
