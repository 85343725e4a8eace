//! Conformance checks for [`LivenessStore`] and [`SecretStore`] implementations.
//!
//! Each function exercises one part of the store contract against a fresh
//! store and panics on violation. Backends run the same checks from their
//! integration tests:
//!
//! ```no_run
//! use deadswitch::storage::{conformance, MemorySecretStore};
//!
//! #[tokio::test]
//! async fn secret_put_does_not_overwrite() {
//!     conformance::secret_put_does_not_overwrite(&MemorySecretStore::new()).await;
//! }
//! ```

use std::sync::Arc;

use crate::domain::{ClientId, Liveness, SecretId};
use crate::storage::{LivenessStore, PutOutcome, SecretStore};

fn client(id: &str) -> ClientId {
    ClientId::parse(id).expect("valid client id")
}

fn secret(id: &str) -> SecretId {
    SecretId::parse(id).expect("valid secret id")
}

// ============================================================================
// Liveness
// ============================================================================

/// An unknown client has no last-seen time.
pub async fn liveness_missing_client_is_none<S: LivenessStore + ?Sized>(store: &S) {
    let seen = store.get_last_seen(&client("nobody")).await.expect("get_last_seen");
    assert_eq!(seen, None);
}

/// A heartbeat is readable afterwards.
pub async fn liveness_heartbeat_then_get<S: LivenessStore + ?Sized>(store: &S) {
    store.record_heartbeat(&client("alice"), 1_000).await.expect("record");
    let seen = store.get_last_seen(&client("alice")).await.expect("get");
    assert_eq!(seen, Some(1_000));
}

/// Heartbeats overwrite unconditionally, including with an earlier time.
pub async fn liveness_heartbeat_overwrites<S: LivenessStore + ?Sized>(store: &S) {
    let alice = client("alice");
    store.record_heartbeat(&alice, 1_000).await.expect("first");
    store.record_heartbeat(&alice, 5_000).await.expect("second");
    assert_eq!(store.get_last_seen(&alice).await.expect("get"), Some(5_000));

    store.record_heartbeat(&alice, 2_000).await.expect("earlier");
    assert_eq!(store.get_last_seen(&alice).await.expect("get"), Some(2_000));
}

/// Clients do not see each other's heartbeats.
pub async fn liveness_clients_are_independent<S: LivenessStore + ?Sized>(store: &S) {
    store.record_heartbeat(&client("alice"), 10).await.expect("alice");
    store.record_heartbeat(&client("bob"), 20).await.expect("bob");

    assert_eq!(store.get_last_seen(&client("alice")).await.expect("get"), Some(10));
    assert_eq!(store.get_last_seen(&client("bob")).await.expect("get"), Some(20));
}

/// Seeding writes only when nothing is stored.
pub async fn liveness_record_if_absent_keeps_existing<S: LivenessStore + ?Sized>(store: &S) {
    let alice = client("alice");
    assert_eq!(store.record_if_absent(&alice, 100).await.expect("seed"), Liveness::seeded(100));
    assert_eq!(store.record_if_absent(&alice, 900).await.expect("reseed"), Liveness::seeded(100));
    assert_eq!(store.get_last_seen(&alice).await.expect("get"), Some(100));

    store.record_heartbeat(&alice, 500).await.expect("heartbeat");
    assert_eq!(
        store.record_if_absent(&alice, 900).await.expect("reseed"),
        Liveness::heartbeat(500)
    );
}

/// A heartbeat replaces a first-contact record and clears its mark.
pub async fn liveness_heartbeat_clears_seed_mark<S: LivenessStore + ?Sized>(store: &S) {
    let alice = client("alice");
    store.record_if_absent(&alice, 100).await.expect("seed");
    assert_eq!(store.get_liveness(&alice).await.expect("get"), Some(Liveness::seeded(100)));

    store.record_heartbeat(&alice, 100).await.expect("heartbeat");
    assert_eq!(store.get_liveness(&alice).await.expect("get"), Some(Liveness::heartbeat(100)));
    assert_eq!(store.get_liveness(&client("bob")).await.expect("get"), None);
}

// ============================================================================
// Secrets
// ============================================================================

/// An absent key reads as `None`.
pub async fn secret_missing_is_none<S: SecretStore + ?Sized>(store: &S) {
    let found = store.get(&client("alice"), &secret("nothing")).await.expect("get");
    assert!(found.is_none());
}

/// A stored secret comes back with payload and wait periods intact.
pub async fn secret_put_then_get<S: SecretStore + ?Sized>(store: &S) {
    let (alice, s1) = (client("alice"), secret("s1"));
    let outcome = store.put(&alice, &s1, "{\"k\":\"v\"} ünïcode", 7).await.expect("put");
    assert_eq!(outcome, PutOutcome::Created);

    let found = store.get(&alice, &s1).await.expect("get").expect("present");
    assert_eq!(found.client_id, alice);
    assert_eq!(found.secret_id, s1);
    assert_eq!(found.payload, "{\"k\":\"v\"} ünïcode");
    assert_eq!(found.wait_periods, 7);
}

/// A second put on a taken key reports a conflict and keeps the original.
pub async fn secret_put_does_not_overwrite<S: SecretStore + ?Sized>(store: &S) {
    let (alice, s1) = (client("alice"), secret("s1"));
    assert_eq!(store.put(&alice, &s1, "original", 1).await.expect("put"), PutOutcome::Created);
    assert_eq!(store.put(&alice, &s1, "replacement", 9).await.expect("put"), PutOutcome::Conflict);

    let found = store.get(&alice, &s1).await.expect("get").expect("present");
    assert_eq!(found.payload, "original");
    assert_eq!(found.wait_periods, 1);
}

/// The same secret id under different clients names different secrets.
pub async fn secret_keys_are_scoped_by_client<S: SecretStore + ?Sized>(store: &S) {
    let s1 = secret("s1");
    store.put(&client("alice"), &s1, "a", 1).await.expect("alice");
    store.put(&client("bob"), &s1, "b", 2).await.expect("bob");

    let alice = store.get(&client("alice"), &s1).await.expect("get").expect("present");
    let bob = store.get(&client("bob"), &s1).await.expect("get").expect("present");
    assert_eq!(alice.payload, "a");
    assert_eq!(bob.payload, "b");
}

/// Zero wait periods and the largest count are both stored as given.
pub async fn secret_wait_period_extremes<S: SecretStore + ?Sized>(store: &S) {
    let alice = client("alice");
    store.put(&alice, &secret("zero"), "z", 0).await.expect("zero");
    store.put(&alice, &secret("max"), "m", u32::MAX).await.expect("max");

    let zero = store.get(&alice, &secret("zero")).await.expect("get").expect("present");
    let max = store.get(&alice, &secret("max")).await.expect("get").expect("present");
    assert_eq!(zero.wait_periods, 0);
    assert_eq!(max.wait_periods, u32::MAX);
}

/// Deleting removes the secret and frees the key for a new deposit.
pub async fn secret_delete_frees_key<S: SecretStore + ?Sized>(store: &S) {
    let (alice, s1) = (client("alice"), secret("s1"));
    store.put(&alice, &s1, "first", 1).await.expect("put");
    store.delete(&alice, &s1).await.expect("delete");
    assert!(store.get(&alice, &s1).await.expect("get").is_none());

    assert_eq!(store.put(&alice, &s1, "second", 2).await.expect("put"), PutOutcome::Created);
    let found = store.get(&alice, &s1).await.expect("get").expect("present");
    assert_eq!(found.payload, "second");
}

/// Deleting an absent key succeeds.
pub async fn secret_delete_missing_is_noop<S: SecretStore + ?Sized>(store: &S) {
    let result = store.delete(&client("alice"), &secret("ghost")).await;
    assert!(result.is_ok(), "delete of missing secret should not error: {result:?}");
}

/// Racing puts on one key produce exactly one winner.
pub async fn secret_concurrent_puts_single_winner<S: SecretStore + ?Sized + 'static>(
    store: Arc<S>,
) {
    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.put(&client("alice"), &secret("race"), &format!("payload-{i}"), 1).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.expect("join").expect("put") == PutOutcome::Created {
            created += 1;
        }
    }
    assert_eq!(created, 1, "exactly one concurrent put should win");
}
