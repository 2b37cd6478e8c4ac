//! Crate-level integration and BDD tests.

use crate::{
    ApplyCoordinator, EntityId, EntityStore, GroupingKey, InMemoryStore, Ownership, RenameSet,
    SkipReason, StoredEntity, TransformSpec,
};

mod behaviour;

#[test]
fn shared_store_commit_skips_foreign_items_and_reloads() {
    let mut store = InMemoryStore::new()
        .with_entity("Doors", StoredEntity::new(10, "Single Flush"))
        .with_entity("Doors", StoredEntity::new(11, "Double Flush"))
        .with_entity("Doors", StoredEntity::new(12, "Sliding"));
    store.set_shared(true);
    assert!(store.set_ownership(EntityId::new(11), Ownership::OwnedByOther));
    assert!(store.set_ownership(EntityId::new(12), Ownership::Unowned));

    let mut batch = RenameSet::load(&store, GroupingKey::from("Doors")).expect("group loads");
    batch.set_transform_spec(TransformSpec::new().with_suffix(" - Int"));
    let report = batch
        .commit(&mut store, &ApplyCoordinator::new("Rename doors"))
        .expect("commit succeeds");

    assert_eq!(report.committed_count(), 2);
    assert_eq!(report.skipped()[0].reason, SkipReason::OwnedElsewhere);
    assert_eq!(store.name_of(EntityId::new(11)), Some("Double Flush"));
    assert_eq!(store.name_of(EntityId::new(12)), Some("Sliding - Int"));
    assert_eq!(store.ownership_of(EntityId::new(12)), Ownership::SelfOrNone);
    assert_eq!(batch.statistics().total, 3);
}
