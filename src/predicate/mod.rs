//! Predicate combinators for admission checks
//!
//! A guarded container runs every candidate element through a predicate
//! before it reaches the decorated store. Predicates are combined with
//! logical operators (`and`, `or`, `not`) and with the set combinators
//! `all_of`, `any_of`, `none_of` and `one_of`.
//!
//! # Example
//!
//! ```rust
//! use bulwark::predicate::*;
//!
//! let valid_port = in_range(1, 65535).and(not_equal_to(8080));
//! assert!(valid_port.check(&443));
//! assert!(!valid_port.check(&8080));
//! assert!(!valid_port.check(&0));
//! ```
//!
//! # Fallible predicates
//!
//! A predicate may fail instead of answering (for instance, when it consults
//! something that can be unavailable). [`fallible`] adapts such a closure;
//! [`Predicate::try_check`] surfaces the failure, which aborts the guarded
//! operation that ran it.
//!
//! ```rust
//! use bulwark::predicate::*;
//!
//! let p = fallible(|s: &str| s.parse::<u8>().map(|n| n < 100));
//! assert_eq!(p.try_check("42"), Ok(true));
//! assert!(p.try_check("4200").is_err());
//! ```

mod basic;
mod combinators;

pub mod prelude;

// Re-export core trait
pub use combinators::{Predicate, PredicateExt};

// Re-export combinator types
pub use combinators::{
    all_of, any_of, boxed, none_of, one_of, AllOf, And, AnyOf, BoxedPredicate, NoneOf, Not, OneOf,
    Or,
};

// Re-export element predicates
pub use basic::{
    always, at_least, at_most, equal_to, fallible, greater_than, in_range, is_none, is_some,
    less_than, member_of, named, never, not_equal_to, Always, Bound, Compare, EqualTo, Fallible,
    InRange, IsNone, IsSome, MemberOf, Named, Never, NotEqualTo,
};

// Short names for the comparison builders
pub use basic::{between, eq, ge, gt, le, lt, ne};
