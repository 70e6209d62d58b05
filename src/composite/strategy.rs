//! Collision-resolution strategies

use std::fmt::Debug;

use crate::store::SetStore;

/// Decides where new items go in a [`CompositeSet`](super::CompositeSet) and
/// how overlapping delegates are reconciled.
///
/// A composite without a strategy refuses both plain `add` and any
/// `add_composited` that would overlap.
pub trait CollisionStrategy<S: SetStore>: Send + Sync {
    /// Index of the delegate that should receive `item`.
    ///
    /// `None` (or an out-of-range index) makes the add fail as unsupported.
    fn select(&self, delegates: &[S], item: &S::Item) -> Option<usize>;

    /// Reconcile `existing` and `incoming`, which both hold every item of
    /// `overlap`.
    ///
    /// Afterwards no item of `overlap` may be in both sets, otherwise the
    /// composite reports the collision as unresolved and `incoming` is not
    /// added.
    fn resolve_collision(&self, existing: &mut S, incoming: &mut S, overlap: &[S::Item]);
}

/// Adds new items to the first delegate; on collision the incoming set
/// gives up its copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstDelegate;

impl<S: SetStore> CollisionStrategy<S> for FirstDelegate {
    fn select(&self, delegates: &[S], _item: &S::Item) -> Option<usize> {
        if delegates.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn resolve_collision(&self, _existing: &mut S, incoming: &mut S, overlap: &[S::Item]) {
        for item in overlap {
            incoming.remove(item);
        }
    }
}

/// Adds new items to the most recently composited delegate; on collision
/// the existing delegate gives up its copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferIncoming;

impl<S: SetStore> CollisionStrategy<S> for PreferIncoming {
    fn select(&self, delegates: &[S], _item: &S::Item) -> Option<usize> {
        delegates.len().checked_sub(1)
    }

    fn resolve_collision(&self, existing: &mut S, _incoming: &mut S, overlap: &[S::Item]) {
        for item in overlap {
            existing.remove(item);
        }
    }
}

/// Render items for error messages and log fields.
pub(crate) fn render<T: Debug>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| format!("{:?}", item)).collect()
}
