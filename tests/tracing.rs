//! Events emitted with the `tracing` feature

#![cfg(feature = "tracing")]

use bulwark::prelude::*;
use bulwark::store::Bounded;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured(run: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, run);
    capture.contents()
}

#[test]
fn rejection_is_logged_with_role_and_element() {
    let logs = captured(|| {
        let mut set = GuardedCollection::predicated(BTreeSet::new(), less_than(10)).unwrap();
        assert!(set.add(42).is_err());
    });

    assert!(logs.contains("rejected element"), "logs: {logs}");
    assert!(logs.contains("role=member"), "logs: {logs}");
    assert!(logs.contains("element=42"), "logs: {logs}");
}

#[test]
fn store_failure_and_rollback_are_logged() {
    let logs = captured(|| {
        let mut set = GuardedCollection::builder(Bounded::new(BTreeSet::new(), 2))
            .bulk_policy(BulkPolicy::Rollback)
            .build()
            .unwrap();
        assert!(set.add_all([1, 2, 3]).is_err());
        assert!(set.is_empty());
    });

    assert!(logs.contains("decorated store failed"), "logs: {logs}");
    assert!(logs.contains("rolling back partial add_all"), "logs: {logs}");
}

#[test]
fn wrap_failure_is_logged() {
    let seed: BTreeSet<i32> = [-1, 1, -2].into_iter().collect();
    let logs = captured(|| {
        assert!(GuardedCollection::predicated(seed, greater_than(0)).is_err());
    });

    assert!(logs.contains("existing collection members failed validation"), "logs: {logs}");
    assert!(logs.contains("rejected=2"), "logs: {logs}");
}

#[test]
fn composite_collision_is_logged() {
    let logs = captured(|| {
        let a: BTreeSet<u8> = [1, 2].into_iter().collect();
        let b: BTreeSet<u8> = [2, 3].into_iter().collect();
        let mut union = CompositeSet::new().with_strategy(FirstDelegate);
        union.add_composited(a).unwrap();
        union.add_composited(b).unwrap();
    });

    assert!(logs.contains("composited set collides with delegate"), "logs: {logs}");
}
