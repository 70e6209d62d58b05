//! Callable lookup by namespace, name and arity
//!
//! A [`FunctionRegistry`] maps `(namespace, name)` to one or more overloads,
//! each registered with an [`Arity`]. Resolution happens at call time from
//! the number of arguments given: an exact-arity overload wins over a
//! variadic one, and among variadic overloads the one with the largest
//! minimum wins.
//!
//! [`predicate_registry`] builds predicates over `i64` by name, which lets
//! guard configuration come from data rather than code.
//!
//! # Example
//!
//! ```rust
//! use bulwark::predicate::Predicate;
//! use bulwark::registry::predicate_registry;
//!
//! let registry = predicate_registry();
//! let percent = registry.call("cmp", "in_range", &[0, 100]).unwrap();
//! assert!(percent.check(&50));
//! assert!(!percent.check(&101));
//!
//! assert!(registry.call("cmp", "in_range", &[0]).is_err());
//! ```

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::predicate::{
    always, at_least, at_most, equal_to, greater_than, in_range, less_than, member_of, never,
    not_equal_to, BoxedPredicate,
};

/// How many arguments an overload accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many.
    Exact(usize),
    /// This many or more.
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments are acceptable.
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{}+", n),
        }
    }
}

/// Fully qualified identity of one overload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Grouping namespace.
    pub namespace: String,
    /// Function name within the namespace.
    pub name: String,
    /// Accepted argument count.
    pub arity: Arity,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.namespace, self.name, self.arity)
    }
}

/// Errors raised by [`FunctionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No overload is registered under the name.
    UnknownFunction {
        /// Requested namespace.
        namespace: String,
        /// Requested name.
        name: String,
    },
    /// Overloads exist but none accepts the argument count.
    ArityMismatch {
        /// Requested namespace.
        namespace: String,
        /// Requested name.
        name: String,
        /// Number of arguments supplied.
        given: usize,
        /// Arities that are registered.
        expected: Vec<Arity>,
    },
    /// An overload with the same signature already exists.
    Duplicate(Signature),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownFunction { namespace, name } => {
                write!(f, "unknown function {}:{}", namespace, name)
            }
            RegistryError::ArityMismatch {
                namespace,
                name,
                given,
                expected,
            } => {
                let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "{}:{} does not take {} argument(s) (accepts {})",
                    namespace,
                    name,
                    given,
                    expected.join(", ")
                )
            }
            RegistryError::Duplicate(signature) => {
                write!(f, "function {} is already registered", signature)
            }
        }
    }
}

impl StdError for RegistryError {}

/// A registered callable.
pub type Function<A, R> = Arc<dyn Fn(&[A]) -> R + Send + Sync>;

struct Overload<A, R> {
    arity: Arity,
    function: Function<A, R>,
}

/// Overloaded functions from `&[A]` to `R`, looked up by name and arity.
pub struct FunctionRegistry<A, R> {
    functions: HashMap<(String, String), Vec<Overload<A, R>>>,
}

impl<A, R> FunctionRegistry<A, R> {
    /// An empty registry.
    pub fn new() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// Register an overload. Fails if the same signature is taken.
    pub fn register<F>(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        arity: Arity,
        function: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&[A]) -> R + Send + Sync + 'static,
    {
        let key = (namespace.into(), name.into());
        let overloads = self.functions.entry(key.clone()).or_default();
        if overloads.iter().any(|o| o.arity == arity) {
            return Err(RegistryError::Duplicate(Signature {
                namespace: key.0,
                name: key.1,
                arity,
            }));
        }
        overloads.push(Overload {
            arity,
            function: Arc::new(function),
        });
        Ok(())
    }

    /// Find the overload that would handle `count` arguments.
    pub fn resolve(
        &self,
        namespace: &str,
        name: &str,
        count: usize,
    ) -> Result<(Arity, Function<A, R>), RegistryError> {
        let overloads = self
            .functions
            .get(&(namespace.to_string(), name.to_string()))
            .filter(|overloads| !overloads.is_empty())
            .ok_or_else(|| RegistryError::UnknownFunction {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        let exact = overloads.iter().find(|o| o.arity == Arity::Exact(count));
        let variadic = || {
            overloads
                .iter()
                .filter(|o| o.arity.accepts(count))
                .max_by_key(|o| match o.arity {
                    Arity::AtLeast(n) | Arity::Exact(n) => n,
                })
        };
        match exact.or_else(variadic) {
            Some(overload) => Ok((overload.arity, Arc::clone(&overload.function))),
            None => Err(RegistryError::ArityMismatch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                given: count,
                expected: overloads.iter().map(|o| o.arity).collect(),
            }),
        }
    }

    /// Resolve by `args.len()` and invoke.
    pub fn call(&self, namespace: &str, name: &str, args: &[A]) -> Result<R, RegistryError> {
        let (_, function) = self.resolve(namespace, name, args.len())?;
        Ok(function(args))
    }

    /// Every registered signature, in no particular order.
    pub fn signatures(&self) -> impl Iterator<Item = Signature> + '_ {
        self.functions.iter().flat_map(|((namespace, name), overloads)| {
            overloads.iter().map(move |o| Signature {
                namespace: namespace.clone(),
                name: name.clone(),
                arity: o.arity,
            })
        })
    }

    /// Number of registered overloads.
    pub fn len(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A, R> Default for FunctionRegistry<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> fmt::Debug for FunctionRegistry<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut signatures: Vec<String> = self.signatures().map(|s| s.to_string()).collect();
        signatures.sort();
        f.debug_struct("FunctionRegistry")
            .field("signatures", &signatures)
            .finish()
    }
}

/// Registry of the basic integer predicates.
///
/// | namespace | name | arity |
/// |---|---|---|
/// | `logic` | `always`, `never` | 0 |
/// | `cmp` | `equal_to`, `not_equal_to`, `greater_than`, `less_than`, `at_least`, `at_most` | 1 |
/// | `cmp` | `in_range` | 2 |
/// | `set` | `member_of` | 0+ |
pub fn predicate_registry() -> FunctionRegistry<i64, BoxedPredicate<i64>> {
    let mut registry = FunctionRegistry::new();
    let entries: [(&str, &str, Arity, fn(&[i64]) -> BoxedPredicate<i64>); 10] = [
        ("logic", "always", Arity::Exact(0), |_| BoxedPredicate::new(always())),
        ("logic", "never", Arity::Exact(0), |_| BoxedPredicate::new(never())),
        ("cmp", "equal_to", Arity::Exact(1), |a| BoxedPredicate::new(equal_to(a[0]))),
        ("cmp", "not_equal_to", Arity::Exact(1), |a| {
            BoxedPredicate::new(not_equal_to(a[0]))
        }),
        ("cmp", "greater_than", Arity::Exact(1), |a| {
            BoxedPredicate::new(greater_than(a[0]))
        }),
        ("cmp", "less_than", Arity::Exact(1), |a| BoxedPredicate::new(less_than(a[0]))),
        ("cmp", "at_least", Arity::Exact(1), |a| BoxedPredicate::new(at_least(a[0]))),
        ("cmp", "at_most", Arity::Exact(1), |a| BoxedPredicate::new(at_most(a[0]))),
        ("cmp", "in_range", Arity::Exact(2), |a| BoxedPredicate::new(in_range(a[0], a[1]))),
        ("set", "member_of", Arity::AtLeast(0), |a| {
            BoxedPredicate::new(member_of(a.to_vec()))
        }),
    ];
    for (namespace, name, arity, build) in entries {
        let registered = registry.register(namespace, name, arity, build);
        debug_assert!(registered.is_ok(), "duplicate signature {}:{}", namespace, name);
    }
    registry
}
