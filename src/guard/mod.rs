//! Guarded facades over maps and collections
//!
//! A guarded container owns a decorated store and intercepts every mutating
//! operation. Each candidate element is transformed first and validated
//! second; only an element that passes reaches the store. A rejected element
//! leaves the store exactly as it was.
//!
//! - [`GuardedMap`]: key and value transformers and predicates over a
//!   [`MapStore`](crate::store::MapStore)
//! - [`GuardedCollection`]: one transformer and predicate over a
//!   [`Store`](crate::store::Store) (set, bag or list)
//!
//! # Bulk operations
//!
//! `put_all`/`add_all` transform and validate the whole batch before touching
//! the store, so a rejected element fails the batch with nothing applied.
//! Store failures can still happen part way through the inserts. What
//! happens then is chosen with [`BulkPolicy`].

mod collection;
mod map;

pub use collection::{GuardedCollection, GuardedCollectionBuilder};
pub use map::{GuardedEntry, GuardedMap, GuardedMapBuilder};

use std::fmt::Debug;

use crate::error::{GuardError, PredicateError, Role, TransformError, ValidationError};
use crate::predicate::Predicate;
use crate::transformer::Transformer;

/// What a bulk operation does when the store fails part way through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkPolicy {
    /// Leave the elements inserted before the failure in place.
    #[default]
    NoRollback,
    /// Undo every insert of the batch before returning the error.
    Rollback,
}

/// Run a transformer, tagging a failure with the element's role.
pub(crate) fn convert<In, T>(role: Role, input: In, transformer: &T) -> Result<T::Output, TransformError>
where
    T: Transformer<In> + ?Sized,
{
    transformer.transform(input).map_err(|err| {
        let err = err.in_role(role);
        #[cfg(feature = "tracing")]
        tracing::debug!(role = %role, error = %err, "transformer failed");
        err
    })
}

/// Why an element was turned away before reaching the store.
#[derive(Debug)]
pub(crate) enum Refusal {
    Untransformable(TransformError),
    Invalid(ValidationError),
    Failed(PredicateError),
}

impl From<TransformError> for Refusal {
    fn from(err: TransformError) -> Self {
        Refusal::Untransformable(err)
    }
}

impl<E> From<Refusal> for GuardError<E> {
    fn from(refusal: Refusal) -> Self {
        match refusal {
            Refusal::Untransformable(err) => GuardError::Transform(err),
            Refusal::Invalid(err) => GuardError::Validation(err),
            Refusal::Failed(err) => GuardError::Predicate(err),
        }
    }
}

/// Run a predicate, turning a `false` answer into a validation error.
pub(crate) fn admit<T, P>(role: Role, value: T, predicate: &P) -> Result<T, Refusal>
where
    T: Debug,
    P: Predicate<T> + ?Sized,
{
    match predicate.try_check(&value) {
        Ok(true) => Ok(value),
        Ok(false) => Err(Refusal::Invalid(rejection(role, &value, predicate))),
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(role = %role, error = %err, "predicate failed");
            Err(Refusal::Failed(err))
        }
    }
}

/// Build the validation error for a rejected element.
pub(crate) fn rejection<T, P>(role: Role, value: &T, predicate: &P) -> ValidationError
where
    T: Debug + ?Sized,
    P: Predicate<T> + ?Sized,
{
    let mut err = ValidationError::new(role, value);
    if let Some(reason) = predicate.describe() {
        err = err.with_reason(reason);
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(role = %role, element = %err.element(), "rejected element");
    err
}

pub(crate) fn delegate_failed<E: Debug>(err: E) -> GuardError<E> {
    #[cfg(feature = "tracing")]
    tracing::warn!(error = ?err, "decorated store failed");
    GuardError::Delegate(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{fallible, greater_than, named, PredicateExt};
    use crate::transformer::{parse, try_from_fn};

    #[test]
    fn test_admit_passes_accepted_value_through() {
        assert!(matches!(admit(Role::Value, 5, &greater_than(0)), Ok(5)));
    }

    #[test]
    fn test_admit_reports_reason() {
        let p = named("must be positive", greater_than(0));
        match admit(Role::Key, -1, &p) {
            Err(Refusal::Invalid(err)) => {
                assert_eq!(err.role(), Role::Key);
                assert_eq!(err.element(), "-1");
                assert_eq!(err.reason(), Some("must be positive"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_admit_reports_reason_through_combinator() {
        let p = named("must be positive", greater_than(0)).and(|n: &i32| n % 2 == 0);
        match admit(Role::Member, 3, &p) {
            Err(Refusal::Invalid(err)) => assert_eq!(err.reason(), Some("must be positive")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_refusal_converts_to_guard_error() {
        let p = fallible(|_: &i32| Err::<bool, _>("offline"));
        let refusal = admit(Role::Member, 1, &p).unwrap_err();
        let err: GuardError<std::convert::Infallible> = refusal.into();
        assert!(matches!(err, GuardError::Predicate(_)));
    }

    #[test]
    fn test_convert_tags_role() {
        let err = convert(Role::Key, "x", &parse::<i32>()).unwrap_err();
        assert_eq!(err.role(), Some(Role::Key));

        let t = try_from_fn(|_: i32| Err::<i32, _>(TransformError::new("nope")));
        assert_eq!(convert(Role::Value, 1, &t).unwrap_err().message(), "nope");
    }

    #[test]
    fn test_bulk_policy_default() {
        assert_eq!(BulkPolicy::default(), BulkPolicy::NoRollback);
    }

    #[cfg(feature = "tracing")]
    mod tracing_tests {
        use super::*;
        use tracing_test::traced_test;

        #[test]
        #[traced_test]
        fn rejection_emits_debug_event() {
            let _ = admit(Role::Value, -3, &greater_than(0));
            assert!(logs_contain("rejected element"));
            assert!(logs_contain("element=-3"));
        }

        #[test]
        #[traced_test]
        fn failing_predicate_emits_warning() {
            let p = fallible(|_: &i32| Err::<bool, _>("offline"));
            let _ = admit(Role::Key, 1, &p);
            assert!(logs_contain("predicate failed"));
        }
    }
}
