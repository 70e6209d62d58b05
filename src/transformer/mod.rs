//! Transformers: mapping input elements to their stored form
//!
//! A guarded container runs its transformers before its predicates, so the
//! predicates see what will actually be stored. Transformers may fail; a
//! failure aborts the operation before any predicate runs or anything is
//! stored.
//!
//! # Example
//!
//! ```rust
//! use bulwark::transformer::*;
//! use bulwark::predicate::*;
//!
//! let normalize = from_fn(|s: String| s.trim().to_lowercase());
//! assert_eq!(normalize.transform("  Hello ".to_string()), Ok("hello".to_string()));
//!
//! let port = parse::<u16>().then(when(equal_to(0), constant(8080), identity()));
//! assert_eq!(port.transform("0"), Ok(8080));
//! assert_eq!(port.transform("443"), Ok(443));
//! assert!(port.transform("http").is_err());
//! ```

mod combinators;
mod constructors;

pub use combinators::{chain, when, BoxedTransformer, Chain, Conditional, TransformerExt};
pub use constructors::{
    constant, from_fn, identity, parse, try_from_fn, Constant, FromFn, Identity, Parse, TryFromFn,
};

use crate::error::TransformError;

/// Maps an input element to the element that gets stored.
///
/// Implementations must be deterministic: equal inputs produce equal
/// outputs for the lifetime of one container.
pub trait Transformer<In>: Send + Sync {
    /// The stored representation.
    type Output;

    /// Transform one element.
    fn transform(&self, input: In) -> Result<Self::Output, TransformError>;
}
