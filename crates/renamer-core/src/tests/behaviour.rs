//! Behaviour-driven tests for batch renaming.

use std::collections::HashMap;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::apply::{ApplyCoordinator, CommitError, CommitReport, FailureReason};
use crate::memory::{InMemoryStore, StoredEntity};
use crate::rename_set::{RenameSet, RenameSetError};
use crate::store::{EntityId, EntityStore, GroupingKey};
use crate::transform::TransformSpec;
use crate::validation::InvalidReason;

const GROUP: &str = "Types";

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    store: InMemoryStore,
    ids: HashMap<String, EntityId>,
    batch: Option<RenameSet>,
    commits_before: usize,
    outcome: Option<Result<CommitReport, RenameSetError>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn id_of(world: &TestWorld, name: &str) -> EntityId {
    match world.ids.get(name) {
        Some(id) => *id,
        None => panic!("no type named '{name}' in the batch"),
    }
}

fn batch(world: &mut TestWorld) -> &mut RenameSet {
    let store = &world.store;
    world
        .batch
        .get_or_insert_with(|| RenameSet::load(store, GroupingKey::from(GROUP)).expect("batch loads"))
}

fn report(world: &TestWorld) -> &CommitReport {
    world
        .outcome
        .as_ref()
        .expect("no commit attempted")
        .as_ref()
        .expect("expected commit to succeed")
}

fn failure_of<'a>(world: &'a TestWorld, name: &str) -> &'a FailureReason {
    let id = id_of(world, name);
    let detail = report(world)
        .failed()
        .iter()
        .find(|detail| detail.id == id)
        .unwrap_or_else(|| panic!("rename of '{name}' did not fail"));
    &detail.reason
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a batch of types named \"{names}\"")]
fn given_batch(world: &mut TestWorld, names: String) {
    let mut store = InMemoryStore::new();
    for (name, raw) in names.split(", ").zip(1_u64..) {
        store.insert(GroupingKey::from(GROUP), StoredEntity::new(raw, name));
        world.ids.insert(name.to_owned(), EntityId::new(raw));
    }
    world.store = store;
}

#[given("the store locks \"{name}\"")]
fn given_locked(world: &mut TestWorld, name: String) {
    let id = id_of(world, &name);
    assert!(world.store.lock(id), "lock '{name}'");
}

#[given("the store is shared without write access")]
fn given_shared_read_only(world: &mut TestWorld) {
    world.store.set_shared(true);
    world.store.set_write_access(false);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the operator replaces \"{find}\" with \"{replace}\" ignoring case")]
fn when_replace_ignoring_case(world: &mut TestWorld, find: String, replace: String) {
    batch(world).set_transform_spec(
        TransformSpec::new()
            .with_find(find, replace)
            .ignoring_case(true),
    );
}

#[when("the operator replaces \"{find}\" with \"{replace}\"")]
fn when_replace(world: &mut TestWorld, find: String, replace: String) {
    batch(world).set_transform_spec(TransformSpec::new().with_find(find, replace));
}

#[when("the operator adds the prefix \"{prefix}\"")]
fn when_prefix(world: &mut TestWorld, prefix: String) {
    batch(world).set_transform_spec(TransformSpec::new().with_prefix(prefix));
}

#[when("the operator adds the suffix \"{suffix}\"")]
fn when_suffix(world: &mut TestWorld, suffix: String) {
    batch(world).set_transform_spec(TransformSpec::new().with_suffix(suffix));
}

#[when("the operator applies an empty transform")]
fn when_empty_transform(world: &mut TestWorld) {
    batch(world).set_transform_spec(TransformSpec::default());
}

#[when("the operator deselects \"{name}\"")]
fn when_deselect(world: &mut TestWorld, name: String) {
    let id = id_of(world, &name);
    batch(world).set_selection(id, false);
}

#[when("another user renames \"{name}\" to \"{new_name}\"")]
fn when_concurrent_rename(world: &mut TestWorld, name: String, new_name: String) {
    let id = id_of(world, &name);
    batch(world);
    let store = &mut world.store;
    let transaction = store
        .begin_transaction("concurrent edit")
        .expect("transaction opens");
    store
        .set_name(&transaction, id, &new_name)
        .expect("concurrent rename accepted");
    store.commit(&transaction).expect("concurrent rename commits");
}

#[when("the operator commits the batch")]
fn when_commit(world: &mut TestWorld) {
    batch(world);
    world.commits_before = world.store.commits();
    let coordinator = ApplyCoordinator::new("Batch rename");
    let Some(set) = world.batch.as_mut() else {
        panic!("batch not loaded");
    };
    let outcome = set.commit(&mut world.store, &coordinator);
    world.outcome = Some(outcome);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the type \"{name}\" becomes \"{candidate}\"")]
fn then_becomes(world: &mut TestWorld, name: String, candidate: String) {
    let id = id_of(world, &name);
    let item = batch(world).item(id).expect("item exists");
    assert_eq!(item.candidate_name(), candidate);
    assert!(item.is_accepted(), "'{name}' should be accepted");
}

#[then("the type \"{name}\" keeps its name")]
fn then_keeps_name(world: &mut TestWorld, name: String) {
    let id = id_of(world, &name);
    let item = batch(world).item(id).expect("item exists");
    assert_eq!(item.candidate_name(), name);
    assert!(!item.will_change());
}

#[then("{count} types are marked as duplicates")]
fn then_duplicates(world: &mut TestWorld, count: usize) {
    let duplicates = batch(world)
        .items()
        .iter()
        .filter(|item| item.invalid_reason() == Some(InvalidReason::Duplicate))
        .count();
    assert_eq!(duplicates, count);
}

#[then("the batch cannot be committed")]
fn then_cannot_commit(world: &mut TestWorld) {
    assert!(!batch(world).can_commit());
}

#[then("the batch can be committed")]
fn then_can_commit(world: &mut TestWorld) {
    assert!(batch(world).can_commit());
}

#[then("{count} types will change")]
fn then_will_change(world: &mut TestWorld, count: usize) {
    assert_eq!(batch(world).statistics().will_change, count);
}

#[then("{count} renames are committed")]
fn then_committed(world: &mut TestWorld, count: usize) {
    assert_eq!(report(world).committed_count(), count);
}

#[then("the rename of \"{name}\" is refused as an invalid name")]
fn then_refused_invalid(world: &mut TestWorld, name: String) {
    let reason = failure_of(world, &name);
    assert!(
        matches!(reason, FailureReason::InvalidName(_)),
        "expected InvalidName, got {reason:?}"
    );
}

#[then("the rename of \"{name}\" is refused as not modifiable")]
fn then_refused_locked(world: &mut TestWorld, name: String) {
    let reason = failure_of(world, &name);
    assert!(
        matches!(reason, FailureReason::CannotModify(_)),
        "expected CannotModify, got {reason:?}"
    );
}

#[then("the store committed the batch exactly once")]
fn then_committed_once(world: &mut TestWorld) {
    assert_eq!(world.store.commits() - world.commits_before, 1);
    assert_eq!(world.store.rollbacks(), 0);
}

#[then("the commit aborts because write access is unavailable")]
fn then_aborts(world: &mut TestWorld) {
    let error = world
        .outcome
        .as_ref()
        .expect("no commit attempted")
        .as_ref()
        .expect_err("expected commit to abort");
    assert_eq!(
        error,
        &RenameSetError::Commit {
            source: CommitError::WriteAccessUnavailable
        }
    );
}

#[then("the store names are unchanged")]
fn then_store_unchanged(world: &mut TestWorld) {
    assert_eq!(world.store.commits(), 0);
    for (name, id) in &world.ids {
        assert_eq!(world.store.name_of(*id), Some(name.as_str()));
    }
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/batch_rename.feature")]
fn batch_rename_behaviour(world: TestWorld) {
    let _ = world;
}
