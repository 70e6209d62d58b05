//! Core predicate trait and logical combinators
//!
//! `and`/`or`/`all_of`/`any_of` stop at the first member that decides the
//! outcome. `none_of` and `one_of` evaluate every member, since both need the
//! number of satisfied members.

use std::borrow::Cow;
use std::fmt;

use crate::error::PredicateError;

/// A composable admission test over values of type T.
///
/// Predicates must not have side effects. `check` must answer for every
/// well-typed input. A predicate that can fail outright overrides
/// `try_check`, and guarded containers report that failure as
/// [`GuardError::Predicate`](crate::GuardError::Predicate).
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let is_valid_age = at_least(0).and(at_most(150));
/// assert!(is_valid_age.check(&25));
/// assert!(!is_valid_age.check(&-5));
/// ```
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Check if the value satisfies this predicate.
    fn check(&self, value: &T) -> bool;

    /// Check the value, surfacing a predicate failure instead of answering.
    #[inline]
    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        Ok(self.check(value))
    }

    /// Human readable requirement, reported with rejections.
    fn describe(&self) -> Option<Cow<'static, str>> {
        None
    }
}

// Blanket impl for closures
impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn check(&self, value: &T) -> bool {
        self(value)
    }
}

/// Extension trait for predicate combinators.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let p = greater_than(0).and(less_than(100)).not();
/// assert!(p.check(&-5));
/// assert!(!p.check(&50));
/// ```
pub trait PredicateExt<T: ?Sized>: Predicate<T> + Sized {
    /// Combine with AND logic. `other` is skipped when `self` is false.
    fn and<P: Predicate<T>>(self, other: P) -> And<Self, P> {
        And(self, other)
    }

    /// Combine with OR logic. `other` is skipped when `self` is true.
    fn or<P: Predicate<T>>(self, other: P) -> Or<Self, P> {
        Or(self, other)
    }

    /// Invert the predicate.
    fn not(self) -> Not<Self> {
        Not(self)
    }

    /// Erase the concrete type, for mixing predicates in `all_of` and friends.
    fn boxed(self) -> BoxedPredicate<T>
    where
        Self: 'static,
    {
        BoxedPredicate(Box::new(self))
    }
}

impl<T: ?Sized, P: Predicate<T>> PredicateExt<T> for P {}

/// AND combinator - both predicates must be true.
#[derive(Clone, Copy, Debug)]
pub struct And<P1, P2>(pub P1, pub P2);

impl<T: ?Sized, P1: Predicate<T>, P2: Predicate<T>> Predicate<T> for And<P1, P2> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) && self.1.check(value)
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        Ok(self.0.try_check(value)? && self.1.try_check(value)?)
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        self.0.describe().or_else(|| self.1.describe())
    }
}

/// OR combinator - either predicate must be true.
#[derive(Clone, Copy, Debug)]
pub struct Or<P1, P2>(pub P1, pub P2);

impl<T: ?Sized, P1: Predicate<T>, P2: Predicate<T>> Predicate<T> for Or<P1, P2> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) || self.1.check(value)
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        Ok(self.0.try_check(value)? || self.1.try_check(value)?)
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        self.0.describe().or_else(|| self.1.describe())
    }
}

/// NOT combinator - inverts the predicate.
#[derive(Clone, Copy, Debug)]
pub struct Not<P>(pub P);

impl<T: ?Sized, P: Predicate<T>> Predicate<T> for Not<P> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        !self.0.check(value)
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        self.0.try_check(value).map(|ok| !ok)
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        self.0.describe().map(|desc| format!("not ({})", desc).into())
    }
}

/// A type-erased predicate.
///
/// Lets predicates of different concrete types share one `all_of` array.
pub struct BoxedPredicate<T: ?Sized>(Box<dyn Predicate<T>>);

impl<T: ?Sized> BoxedPredicate<T> {
    /// Box a predicate.
    pub fn new<P: Predicate<T> + 'static>(predicate: P) -> Self {
        BoxedPredicate(Box::new(predicate))
    }
}

impl<T: ?Sized> Predicate<T> for BoxedPredicate<T> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value)
    }

    #[inline]
    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        self.0.try_check(value)
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        self.0.describe()
    }
}

impl<T: ?Sized> fmt::Debug for BoxedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.describe() {
            Some(desc) => write!(f, "BoxedPredicate({})", desc),
            None => f.write_str("BoxedPredicate"),
        }
    }
}

/// Box a predicate.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let p = all_of([boxed(greater_than(0)), boxed(|x: &i32| x % 2 == 0)]);
/// assert!(p.check(&4));
/// assert!(!p.check(&3));
/// ```
pub fn boxed<T: ?Sized, P: Predicate<T> + 'static>(predicate: P) -> BoxedPredicate<T> {
    BoxedPredicate::new(predicate)
}

/// Satisfied when every member is satisfied.
///
/// Stops at the first member that is not.
#[derive(Clone, Copy, Debug)]
pub struct AllOf<P, const N: usize>(pub [P; N]);

impl<T: ?Sized, P: Predicate<T>, const N: usize> Predicate<T> for AllOf<P, N> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.iter().all(|p| p.check(value))
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        for p in &self.0 {
            if !p.try_check(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Create a predicate satisfied when all given predicates are.
///
/// An empty array is always satisfied.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let bounds = all_of([greater_than(0), greater_than(-10), greater_than(-100)]);
/// assert!(bounds.check(&50));
/// assert!(!bounds.check(&-50));
/// ```
pub fn all_of<P, const N: usize>(predicates: [P; N]) -> AllOf<P, N> {
    AllOf(predicates)
}

/// Satisfied when at least one member is satisfied.
#[derive(Clone, Copy, Debug)]
pub struct AnyOf<P, const N: usize>(pub [P; N]);

impl<T: ?Sized, P: Predicate<T>, const N: usize> Predicate<T> for AnyOf<P, N> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.iter().any(|p| p.check(value))
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        for p in &self.0 {
            if p.try_check(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Create a predicate satisfied when any given predicate is.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let special = any_of([equal_to(1), equal_to(5), equal_to(10)]);
/// assert!(special.check(&5));
/// assert!(!special.check(&7));
/// ```
pub fn any_of<P, const N: usize>(predicates: [P; N]) -> AnyOf<P, N> {
    AnyOf(predicates)
}

/// Satisfied when no member is satisfied.
#[derive(Clone, Copy, Debug)]
pub struct NoneOf<P, const N: usize>(pub [P; N]);

impl<T: ?Sized, P: Predicate<T>, const N: usize> Predicate<T> for NoneOf<P, N> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        satisfied_count(&self.0, value) == 0
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        Ok(try_satisfied_count(&self.0, value)? == 0)
    }
}

/// Create a predicate satisfied when none of the given predicates are.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let ordinary = none_of([equal_to(1), equal_to(5), equal_to(10)]);
/// assert!(ordinary.check(&7));
/// assert!(!ordinary.check(&5));
/// ```
pub fn none_of<P, const N: usize>(predicates: [P; N]) -> NoneOf<P, N> {
    NoneOf(predicates)
}

/// Satisfied when exactly one member is satisfied.
#[derive(Clone, Copy, Debug)]
pub struct OneOf<P, const N: usize>(pub [P; N]);

impl<T: ?Sized, P: Predicate<T>, const N: usize> Predicate<T> for OneOf<P, N> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        satisfied_count(&self.0, value) == 1
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        Ok(try_satisfied_count(&self.0, value)? == 1)
    }
}

/// Create a predicate satisfied when exactly one given predicate is.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let p = one_of([less_than(10), greater_than(5)]);
/// assert!(p.check(&3));
/// assert!(p.check(&12));
/// assert!(!p.check(&7)); // both
/// ```
pub fn one_of<P, const N: usize>(predicates: [P; N]) -> OneOf<P, N> {
    OneOf(predicates)
}

fn satisfied_count<T: ?Sized, P: Predicate<T>>(predicates: &[P], value: &T) -> usize {
    predicates.iter().filter(|p| p.check(value)).count()
}

fn try_satisfied_count<T: ?Sized, P: Predicate<T>>(
    predicates: &[P],
    value: &T,
) -> Result<usize, PredicateError> {
    let mut count = 0;
    for p in predicates {
        if p.try_check(value)? {
            count += 1;
        }
    }
    Ok(count)
}
