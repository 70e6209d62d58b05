//! Predicate prelude for convenient imports
//!
//! # Example
//!
//! ```rust
//! use bulwark::predicate::prelude::*;
//!
//! let valid_age = at_least(0).and(at_most(150));
//! assert!(valid_age.check(&25));
//! ```

// Core trait
pub use super::combinators::{Predicate, PredicateExt};

// Logical combinators
pub use super::combinators::{all_of, any_of, boxed, none_of, one_of, And, Not, Or};

// Element predicates
pub use super::basic::{
    always, at_least, at_most, equal_to, fallible, greater_than, in_range, is_none, is_some,
    less_than, member_of, named, never, not_equal_to,
};
