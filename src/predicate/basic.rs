//! Basic element predicates
//!
//! Constant, comparison, membership and option predicates, plus adapters
//! for fallible closures and for attaching a description.

use std::borrow::Cow;
use std::fmt;

use super::combinators::Predicate;
use crate::error::PredicateError;

/// Predicate that accepts everything.
#[derive(Clone, Copy, Default, Debug)]
pub struct Always;

impl<T: ?Sized> Predicate<T> for Always {
    #[inline]
    fn check(&self, _value: &T) -> bool {
        true
    }
}

/// Accept every element.
pub fn always() -> Always {
    Always
}

/// Predicate that rejects everything.
#[derive(Clone, Copy, Default, Debug)]
pub struct Never;

impl<T: ?Sized> Predicate<T> for Never {
    #[inline]
    fn check(&self, _value: &T) -> bool {
        false
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("nothing is accepted"))
    }
}

/// Reject every element.
pub fn never() -> Never {
    Never
}

/// Predicate for equality.
#[derive(Clone, Copy, Debug)]
pub struct EqualTo<T>(pub T);

impl<T: PartialEq + Send + Sync> Predicate<T> for EqualTo<T> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        *value == self.0
    }
}

/// Create a predicate that checks for equality.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// assert!(equal_to(5).check(&5));
/// assert!(!equal_to(5).check(&4));
/// ```
pub fn equal_to<T: PartialEq + Send + Sync>(value: T) -> EqualTo<T> {
    EqualTo(value)
}

/// Predicate for inequality.
#[derive(Clone, Copy, Debug)]
pub struct NotEqualTo<T>(pub T);

impl<T: PartialEq + Send + Sync> Predicate<T> for NotEqualTo<T> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        *value != self.0
    }
}

/// Create a predicate that checks for inequality.
pub fn not_equal_to<T: PartialEq + Send + Sync>(value: T) -> NotEqualTo<T> {
    NotEqualTo(value)
}

/// How a [`Compare`] predicate relates the value to its bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// value > bound
    Above,
    /// value < bound
    Below,
    /// value >= bound
    AtLeast,
    /// value <= bound
    AtMost,
}

/// Ordering predicate against a single bound.
#[derive(Clone, Copy, Debug)]
pub struct Compare<T> {
    bound: T,
    kind: Bound,
}

impl<T: PartialOrd + Send + Sync> Predicate<T> for Compare<T> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        match self.kind {
            Bound::Above => *value > self.bound,
            Bound::Below => *value < self.bound,
            Bound::AtLeast => *value >= self.bound,
            Bound::AtMost => *value <= self.bound,
        }
    }
}

/// value > bound
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// assert!(greater_than(5).check(&6));
/// assert!(!greater_than(5).check(&5));
/// ```
pub fn greater_than<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    Compare {
        bound,
        kind: Bound::Above,
    }
}

/// value < bound
pub fn less_than<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    Compare {
        bound,
        kind: Bound::Below,
    }
}

/// value >= bound
pub fn at_least<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    Compare {
        bound,
        kind: Bound::AtLeast,
    }
}

/// value <= bound
pub fn at_most<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    Compare {
        bound,
        kind: Bound::AtMost,
    }
}

/// Inclusive range predicate.
#[derive(Clone, Copy, Debug)]
pub struct InRange<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Send + Sync> Predicate<T> for InRange<T> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        *value >= self.min && *value <= self.max
    }
}

/// min <= value <= max
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let p = in_range(0, 100);
/// assert!(p.check(&0));
/// assert!(p.check(&100));
/// assert!(!p.check(&101));
/// ```
pub fn in_range<T: PartialOrd + Send + Sync>(min: T, max: T) -> InRange<T> {
    InRange { min, max }
}

/// Short for [`equal_to`].
#[inline]
pub fn eq<T: PartialEq + Send + Sync>(value: T) -> EqualTo<T> {
    equal_to(value)
}

/// Short for [`not_equal_to`].
#[inline]
pub fn ne<T: PartialEq + Send + Sync>(value: T) -> NotEqualTo<T> {
    not_equal_to(value)
}

/// Short for [`greater_than`].
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let p = gt(0).and(le(10));
/// assert!(p.check(&10));
/// assert!(!p.check(&0));
/// ```
#[inline]
pub fn gt<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    greater_than(bound)
}

/// Short for [`at_least`].
#[inline]
pub fn ge<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    at_least(bound)
}

/// Short for [`less_than`].
#[inline]
pub fn lt<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    less_than(bound)
}

/// Short for [`at_most`].
#[inline]
pub fn le<T: PartialOrd + Send + Sync>(bound: T) -> Compare<T> {
    at_most(bound)
}

/// Short for [`in_range`].
#[inline]
pub fn between<T: PartialOrd + Send + Sync>(min: T, max: T) -> InRange<T> {
    in_range(min, max)
}

/// Membership in a fixed list of allowed values.
#[derive(Clone, Debug)]
pub struct MemberOf<T>(Vec<T>);

impl<T: PartialEq + Send + Sync> Predicate<T> for MemberOf<T> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.contains(value)
    }
}

/// Accept only the listed values.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let colors = member_of(["red", "green"]);
/// assert!(colors.check(&"red"));
/// assert!(!colors.check(&"blue"));
/// ```
pub fn member_of<T, I>(allowed: I) -> MemberOf<T>
where
    T: PartialEq + Send + Sync,
    I: IntoIterator<Item = T>,
{
    MemberOf(allowed.into_iter().collect())
}

/// Predicate satisfied by `Some(_)`.
#[derive(Clone, Copy, Default, Debug)]
pub struct IsSome;

impl<T> Predicate<Option<T>> for IsSome {
    #[inline]
    fn check(&self, value: &Option<T>) -> bool {
        value.is_some()
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("must be present"))
    }
}

/// Reject `None`.
pub fn is_some() -> IsSome {
    IsSome
}

/// Predicate satisfied by `None`.
#[derive(Clone, Copy, Default, Debug)]
pub struct IsNone;

impl<T> Predicate<Option<T>> for IsNone {
    #[inline]
    fn check(&self, value: &Option<T>) -> bool {
        value.is_none()
    }
}

/// Accept only `None`.
pub fn is_none() -> IsNone {
    IsNone
}

/// Adapter for closures that can fail instead of answering.
///
/// `check` treats a failure as "not satisfied"; `try_check` surfaces it.
#[derive(Clone, Copy)]
pub struct Fallible<F>(F);

impl<F> fmt::Debug for Fallible<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fallible")
    }
}

impl<T, F, E> Predicate<T> for Fallible<F>
where
    T: ?Sized,
    F: Fn(&T) -> Result<bool, E> + Send + Sync,
    E: fmt::Display,
{
    #[inline]
    fn check(&self, value: &T) -> bool {
        matches!((self.0)(value), Ok(true))
    }

    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        (self.0)(value).map_err(|e| PredicateError::new(e.to_string()))
    }
}

/// Wrap a closure that may fail.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let parses = fallible(|s: &String| s.parse::<i32>().map(|n| n > 0));
/// assert_eq!(parses.try_check(&"12".to_string()), Ok(true));
/// assert!(parses.try_check(&"x".to_string()).is_err());
/// ```
pub fn fallible<F>(f: F) -> Fallible<F> {
    Fallible(f)
}

/// A predicate carrying a description of its requirement.
#[derive(Clone, Debug)]
pub struct Named<P> {
    description: Cow<'static, str>,
    inner: P,
}

impl<T: ?Sized, P: Predicate<T>> Predicate<T> for Named<P> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.inner.check(value)
    }

    #[inline]
    fn try_check(&self, value: &T) -> Result<bool, PredicateError> {
        self.inner.try_check(value)
    }

    fn describe(&self) -> Option<Cow<'static, str>> {
        Some(self.description.clone())
    }
}

/// Attach a description that rejections report as their reason.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::*;
///
/// let even = named("must be even", |x: &i32| x % 2 == 0);
/// assert!(even.check(&4));
/// assert_eq!(Predicate::<i32>::describe(&even).as_deref(), Some("must be even"));
/// ```
pub fn named<P>(description: impl Into<Cow<'static, str>>, predicate: P) -> Named<P> {
    Named {
        description: description.into(),
        inner: predicate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PredicateExt;

    #[test]
    fn test_short_names_match_long_forms() {
        for n in -3..=3 {
            assert_eq!(eq(0).check(&n), equal_to(0).check(&n));
            assert_eq!(ne(0).check(&n), not_equal_to(0).check(&n));
            assert_eq!(gt(0).check(&n), greater_than(0).check(&n));
            assert_eq!(ge(0).check(&n), at_least(0).check(&n));
            assert_eq!(lt(0).check(&n), less_than(0).check(&n));
            assert_eq!(le(0).check(&n), at_most(0).check(&n));
            assert_eq!(between(-1, 1).check(&n), in_range(-1, 1).check(&n));
        }
    }

    #[test]
    fn test_constants() {
        assert!(always().check(&1));
        assert!(!never().check("anything"));
    }

    #[test]
    fn test_equality() {
        assert!(equal_to("a").check(&"a"));
        assert!(not_equal_to(5).check(&4));
        assert!(!not_equal_to(5).check(&5));
    }

    #[test]
    fn test_comparisons() {
        assert!(greater_than(5).check(&6));
        assert!(!greater_than(5).check(&5));
        assert!(less_than(5).check(&4));
        assert!(at_least(5).check(&5));
        assert!(!at_least(5).check(&4));
        assert!(at_most(5).check(&5));
        assert!(!at_most(5).check(&6));
    }

    #[test]
    fn test_in_range_with_floats() {
        let p = in_range(0.0_f64, 1.0_f64);
        assert!(p.check(&0.5));
        assert!(p.check(&1.0));
        assert!(!p.check(&-0.1));
    }

    #[test]
    fn test_member_of() {
        let p = member_of(vec![1, 2, 3]);
        assert!(p.check(&2));
        assert!(!p.check(&4));
    }

    #[test]
    fn test_option_predicates() {
        assert!(is_some().check(&Some(1)));
        assert!(!is_some().check(&None::<i32>));
        assert!(is_none().check(&None::<i32>));
    }

    #[test]
    fn test_fallible_check_treats_error_as_false() {
        let p = fallible(|s: &str| s.parse::<i32>().map(|n| n > 0));
        assert!(p.check("5"));
        assert!(!p.check("-5"));
        assert!(!p.check("five"));
        assert!(p.try_check("five").is_err());
    }

    #[test]
    fn test_named_keeps_behavior() {
        let p = named("positive", greater_than(0)).and(less_than(10));
        assert!(p.check(&3));
        assert!(!p.check(&-3));
        let described = named("positive", greater_than(0));
        assert_eq!(
            Predicate::<i32>::describe(&described).as_deref(),
            Some("positive")
        );
    }
}
