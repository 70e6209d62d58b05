//! Error types for guarded containers
//!
//! Every fallible operation on a guarded container returns [`GuardError<E>`],
//! where `E` is the error type of the decorated store. Errors raised by the
//! store itself are carried in [`GuardError::Delegate`] without being rewrapped
//! or reinterpreted.
//!
//! # Example
//!
//! ```rust
//! use bulwark::{GuardError, GuardedMap, Role};
//! use std::collections::HashMap;
//!
//! let mut map = GuardedMap::predicated(HashMap::new(), |_: &&str| true, |v: &i32| *v > 0)
//!     .unwrap();
//!
//! match map.put("a", -1) {
//!     Err(GuardError::Validation(err)) => {
//!         assert_eq!(err.role(), Role::Value);
//!         assert_eq!(err.element(), "-1");
//!     }
//!     other => panic!("expected a validation error, got {:?}", other),
//! }
//! ```

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Which part of an operation an element played when it was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// A map key.
    Key,
    /// A map value.
    Value,
    /// A member of a collection.
    Member,
}

impl Role {
    /// Lowercase name used in messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Key => "key",
            Role::Value => "value",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element failed a configured predicate.
///
/// The element is kept in its `Debug` rendering so the error does not need to
/// own (or be generic over) the rejected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    role: Role,
    element: String,
    reason: Option<Cow<'static, str>>,
}

impl ValidationError {
    /// Create a validation error for `element` in the given role.
    pub fn new(role: Role, element: impl fmt::Debug) -> Self {
        ValidationError {
            role,
            element: format!("{:?}", element),
            reason: None,
        }
    }

    /// Attach a description of the requirement that was not met.
    pub fn with_reason(mut self, reason: impl Into<Cow<'static, str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The role the rejected element played.
    pub fn role(&self) -> Role {
        self.role
    }

    /// `Debug` rendering of the rejected element.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Description of the failed requirement, if the predicate provided one.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} rejected by predicate", self.role, self.element)?;
        if let Some(reason) = &self.reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

impl StdError for ValidationError {}

#[cfg(feature = "serde")]
impl serde::Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValidationError", 3)?;
        state.serialize_field("role", self.role.as_str())?;
        state.serialize_field("element", &self.element)?;
        state.serialize_field("reason", &self.reason.as_deref())?;
        state.end()
    }
}

/// A transformer failed to produce a stored representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError {
    role: Option<Role>,
    message: String,
}

impl TransformError {
    /// Create a transform error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        TransformError {
            role: None,
            message: message.into(),
        }
    }

    /// Record which role the element being transformed played.
    ///
    /// Facades call this; transformers usually leave it unset.
    pub fn in_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// The role of the element being transformed, when known.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for TransformError {
    fn from(message: &str) -> Self {
        TransformError::new(message)
    }
}

impl From<String> for TransformError {
    fn from(message: String) -> Self {
        TransformError::new(message)
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Some(role) => write!(f, "failed to transform {}: {}", role, self.message),
            None => write!(f, "transform failed: {}", self.message),
        }
    }
}

impl StdError for TransformError {}

/// A predicate raised an error instead of answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    /// Create a predicate error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        PredicateError {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "predicate failed: {}", self.message)
    }
}

impl StdError for PredicateError {}

/// An operation the container cannot perform in its current configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedOperation {
    operation: &'static str,
    detail: &'static str,
}

impl UnsupportedOperation {
    /// Create an unsupported-operation error.
    pub fn new(operation: &'static str, detail: &'static str) -> Self {
        UnsupportedOperation { operation, detail }
    }

    /// Name of the operation that was refused.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported operation `{}`: {}", self.operation, self.detail)
    }
}

impl StdError for UnsupportedOperation {}

/// All rejections found while validating a pre-populated container.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejections {
    head: ValidationError,
    tail: Vec<ValidationError>,
}

impl Rejections {
    /// Start a list with its first rejection.
    pub fn new(first: ValidationError) -> Self {
        Rejections {
            head: first,
            tail: Vec::new(),
        }
    }

    /// Build from a vector, returning `None` when it is empty.
    pub fn from_vec(mut errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let head = errors.remove(0);
        Some(Rejections { head, tail: errors })
    }

    /// Append another rejection.
    pub fn push(&mut self, error: ValidationError) {
        self.tail.push(error);
    }

    /// The first rejection found.
    pub fn first(&self) -> &ValidationError {
        &self.head
    }

    /// Number of rejected elements.
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over every rejection in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Consume into a vector.
    pub fn into_vec(self) -> Vec<ValidationError> {
        let mut all = Vec::with_capacity(1 + self.tail.len());
        all.push(self.head);
        all.extend(self.tail);
        all
    }
}

impl fmt::Display for Rejections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} existing element(s) rejected", self.len())?;
        for err in self.iter() {
            write!(f, "\n  -> {}", err)?;
        }
        Ok(())
    }
}

impl StdError for Rejections {}

/// Error returned by guarded container operations.
///
/// `E` is the decorated store's own error type; stores that cannot fail use
/// [`std::convert::Infallible`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError<E> {
    /// An element failed a predicate. Nothing was modified.
    Validation(ValidationError),
    /// A transformer failed. No predicate ran and nothing was modified.
    Transform(TransformError),
    /// A predicate raised an error. Nothing was modified.
    Predicate(PredicateError),
    /// The operation needs configuration the container does not have.
    Unsupported(UnsupportedOperation),
    /// A collision strategy ran but left overlapping elements behind.
    Unresolved {
        /// `Debug` renderings of the elements still present in both sets.
        overlap: Vec<String>,
    },
    /// Existing elements of a wrapped container failed validation.
    Rejected(Rejections),
    /// The decorated store failed; the error is passed through unchanged.
    Delegate(E),
}

impl<E> GuardError<E> {
    /// True for `Validation` and `Rejected` errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, GuardError::Validation(_) | GuardError::Rejected(_))
    }

    /// The validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            GuardError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// The store error, if this is one.
    pub fn as_delegate(&self) -> Option<&E> {
        match self {
            GuardError::Delegate(err) => Some(err),
            _ => None,
        }
    }

    /// Map the store error type, leaving every other variant as is.
    pub fn map_delegate<E2, F>(self, f: F) -> GuardError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            GuardError::Validation(err) => GuardError::Validation(err),
            GuardError::Transform(err) => GuardError::Transform(err),
            GuardError::Predicate(err) => GuardError::Predicate(err),
            GuardError::Unsupported(err) => GuardError::Unsupported(err),
            GuardError::Unresolved { overlap } => GuardError::Unresolved { overlap },
            GuardError::Rejected(errs) => GuardError::Rejected(errs),
            GuardError::Delegate(err) => GuardError::Delegate(f(err)),
        }
    }
}

impl<E: fmt::Display> fmt::Display for GuardError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Validation(err) => write!(f, "{}", err),
            GuardError::Transform(err) => write!(f, "{}", err),
            GuardError::Predicate(err) => write!(f, "{}", err),
            GuardError::Unsupported(err) => write!(f, "{}", err),
            GuardError::Unresolved { overlap } => write!(
                f,
                "collision left unresolved by strategy: [{}]",
                overlap.join(", ")
            ),
            GuardError::Rejected(errs) => write!(f, "{}", errs),
            GuardError::Delegate(err) => write!(f, "{}", err),
        }
    }
}

impl<E: StdError + 'static> StdError for GuardError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            GuardError::Validation(err) => Some(err),
            GuardError::Transform(err) => Some(err),
            GuardError::Predicate(err) => Some(err),
            GuardError::Unsupported(err) => Some(err),
            GuardError::Rejected(errs) => Some(errs),
            GuardError::Delegate(err) => Some(err),
            GuardError::Unresolved { .. } => None,
        }
    }
}

impl<E> From<ValidationError> for GuardError<E> {
    fn from(err: ValidationError) -> Self {
        GuardError::Validation(err)
    }
}

impl<E> From<TransformError> for GuardError<E> {
    fn from(err: TransformError) -> Self {
        GuardError::Transform(err)
    }
}

impl<E> From<PredicateError> for GuardError<E> {
    fn from(err: PredicateError) -> Self {
        GuardError::Predicate(err)
    }
}

impl<E> From<UnsupportedOperation> for GuardError<E> {
    fn from(err: UnsupportedOperation) -> Self {
        GuardError::Unsupported(err)
    }
}

/// Construction of a guarded container failed.
///
/// The store is handed back so the caller keeps ownership of its contents.
#[derive(Debug)]
pub struct WrapError<C, E> {
    store: C,
    error: GuardError<E>,
}

impl<C, E> WrapError<C, E> {
    pub(crate) fn new(store: C, error: GuardError<E>) -> Self {
        WrapError { store, error }
    }

    /// The reason construction failed.
    pub fn error(&self) -> &GuardError<E> {
        &self.error
    }

    /// Recover the store that could not be wrapped.
    pub fn into_store(self) -> C {
        self.store
    }

    /// Split into the store and the error.
    pub fn into_parts(self) -> (C, GuardError<E>) {
        (self.store, self.error)
    }
}

impl<C, E: fmt::Display> fmt::Display for WrapError<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot wrap container: {}", self.error)
    }
}

impl<C: fmt::Debug, E: StdError + 'static> StdError for WrapError<C, E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}
