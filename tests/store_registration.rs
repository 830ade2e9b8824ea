mod common;

use common::*;
use rxreduce::{field_lens, Mutator, Store, StoreBuilder, StoreError};

#[test]
fn test_build_without_mutators_fails() {
    let builder: StoreBuilder<AppState, AppAction> = Store::builder(AppState::default());

    match builder.build() {
        Err(err @ StoreError::MissingMutators { .. }) => {
            assert!(err.is_fatal());
            assert_eq!(
                err,
                StoreError::MissingMutators {
                    missing: vec!["counter", "users"]
                }
            );
        }
        other => panic!("Expected MissingMutators, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_build_with_partial_coverage_fails() {
    let builder = Store::builder(AppState::default())
        .mutator(counter_mutator())
        .unwrap();

    assert_eq!(builder.missing_partitions(), vec![AppPartition::Users]);
    assert_eq!(
        builder.build().unwrap_err(),
        StoreError::MissingMutators {
            missing: vec!["users"]
        }
    );
}

#[test]
fn test_build_succeeds_with_one_mutator_per_partition() {
    let builder = app_builder();
    assert!(builder.missing_partitions().is_empty());

    let store = builder.build().unwrap();
    assert_eq!(store.current(), AppState::default());
}

#[tokio::test]
async fn test_duplicate_mutator_is_rejected_and_first_stays_active() {
    let mut builder = app_builder();
    let doubling: Mutator<AppState, i64, AppAction> = Mutator::new(
        AppPartition::Counter,
        field_lens!(AppState, counter),
        |state, action| match action {
            AppAction::Increase(delta) => state.counter + delta * 2,
            _ => state.counter,
        },
    );

    let err = builder.register(doubling).unwrap_err();
    assert_eq!(
        err,
        StoreError::MutatorAlreadyExists {
            partition: "counter"
        }
    );
    assert!(!err.is_fatal());
    assert_eq!(err.error_type(), "mutator_already_exists");

    // Registration errors are recoverable: the builder is still usable.
    let store = builder.build().unwrap();
    let states = emitted(store.dispatch(AppAction::Increase(10))).await;
    assert_eq!(states, vec![state(10, &[])]);
}

#[test]
fn test_mutator_for_unknown_partition_is_fatal() {
    let mut builder: StoreBuilder<AppState, AppAction> =
        StoreBuilder::with_partitions(AppState::default(), [AppPartition::Counter]);

    let err = builder.register(users_mutator()).unwrap_err();
    assert_eq!(err, StoreError::UnknownPartition { partition: "users" });
    assert!(err.is_fatal());

    // A store covering only the declared manifest still builds.
    builder.register(counter_mutator()).unwrap();
    assert!(builder.build().is_ok());
}

#[test]
fn test_manifest_duplicates_count_once() {
    let builder: StoreBuilder<AppState, AppAction> = StoreBuilder::with_partitions(
        AppState::default(),
        [
            AppPartition::Users,
            AppPartition::Counter,
            AppPartition::Users,
        ],
    );

    assert_eq!(
        builder.missing_partitions(),
        vec![AppPartition::Users, AppPartition::Counter]
    );
}

#[test]
fn test_chained_registration_reports_duplicate() {
    let result = app_builder().mutator(counter_mutator());
    assert!(matches!(
        result,
        Err(StoreError::MutatorAlreadyExists {
            partition: "counter"
        })
    ));
}
