//! # Bulwark
//!
//! > *Nothing gets in unchecked.*
//!
//! Guarded containers for Rust: facades that transform and validate every
//! element before it reaches the map or collection they decorate.
//!
//! ## Philosophy
//!
//! **Bulwark** puts the admission rules next to the data they protect:
//! - **Transformers** map what callers hand in to what gets stored
//! - **Predicates** decide whether the stored form is acceptable
//! - **Stores** only ever see elements that passed both
//!
//! A rejected element leaves the store exactly as it was, and the error
//! names the element and the role (key, value or member) it played.
//!
//! ## Quick Example
//!
//! ```rust
//! use bulwark::prelude::*;
//! use std::collections::HashMap;
//!
//! // Keys arrive as text and are stored as numbers; values must be short.
//! let mut ids = GuardedMap::builder(HashMap::new())
//!     .key_transformer(parse::<u32>())
//!     .value_predicate(named("at most 8 chars", |v: &&str| v.len() <= 8))
//!     .build()
//!     .unwrap();
//!
//! ids.put("17", "alice").unwrap();
//!
//! match ids.put("18", "bartholomew") {
//!     Err(GuardError::Validation(err)) => {
//!         assert_eq!(err.role(), Role::Value);
//!         assert_eq!(err.reason(), Some("at most 8 chars"));
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//!
//! assert!(ids.put("eighteen", "bart").is_err());
//! assert_eq!(ids.get(&17), Some(&"alice"));
//! assert_eq!(ids.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`predicate`]: the [`Predicate`] trait, basic predicates and combinators
//! - [`transformer`]: the [`Transformer`] trait and combinators
//! - [`store`]: capability traits for decorated storage
//! - [`guard`]: [`GuardedMap`] and [`GuardedCollection`]
//! - [`composite`]: [`CompositeSet`], a union of disjoint delegate sets
//! - [`cache`]: a keyed instance cache for shared guards
//! - [`registry`]: lookup of functions (such as predicate builders) by name
//!   and arity
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events for rejections, store failures,
//!   rollbacks, collisions and cache misses
//! - `serde`: serialize containers as their contents
//! - `proptest`: strategies in [`testing`] for property tests

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod composite;
pub mod error;
pub mod guard;
pub mod predicate;
pub mod registry;
pub mod store;
pub mod testing;
pub mod transformer;

// Re-exports
pub use cache::InstanceCache;
pub use composite::{CollisionStrategy, CompositeSet};
pub use error::{
    GuardError, PredicateError, Rejections, Role, TransformError, UnsupportedOperation,
    ValidationError, WrapError,
};
pub use guard::{BulkPolicy, GuardedCollection, GuardedEntry, GuardedMap};
pub use predicate::{Predicate, PredicateExt};
pub use store::{MapStore, SetStore, Store};
pub use transformer::{Transformer, TransformerExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::composite::{CollisionStrategy, CompositeSet, FirstDelegate, PreferIncoming};
    pub use crate::error::{GuardError, Role, ValidationError};
    pub use crate::guard::{BulkPolicy, GuardedCollection, GuardedMap};
    pub use crate::predicate::prelude::*;
    pub use crate::transformer::{
        constant, from_fn, identity, parse, try_from_fn, when, Transformer, TransformerExt,
    };
}
