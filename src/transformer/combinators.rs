//! Transformer combinators: chaining, conditional selection and boxing

use std::fmt;

use super::constructors::{Constant, FromFn, Identity, Parse, TryFromFn};
use super::Transformer;
use crate::error::TransformError;
use crate::predicate::Predicate;

/// Extension trait for transformer combinators.
///
/// Implemented for every transformer type in this module. Custom
/// transformers can use [`chain`] and [`BoxedTransformer::new`] directly.
pub trait TransformerExt: Sized {
    /// Apply `next` to the output of `self`.
    ///
    /// If `self` fails, `next` never runs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bulwark::transformer::*;
    ///
    /// let t = parse::<i32>().then(from_fn(|n: i32| n * 10));
    /// assert_eq!(t.transform("4"), Ok(40));
    /// ```
    fn then<Next>(self, next: Next) -> Chain<Self, Next> {
        chain(self, next)
    }

    /// Erase the concrete type.
    fn boxed<In>(self) -> BoxedTransformer<In, <Self as Transformer<In>>::Output>
    where
        Self: Transformer<In> + 'static,
    {
        BoxedTransformer(Box::new(self))
    }
}

macro_rules! impl_transformer_ext {
    ($($ty:ident<$($param:ident),*>),* $(,)?) => {
        $(impl<$($param),*> TransformerExt for $ty<$($param),*> {})*
    };
}

impl_transformer_ext!(
    FromFn<F>,
    TryFromFn<F>,
    Constant<V>,
    Parse<T>,
    Chain<A, B>,
    Conditional<P, A, B>,
    BoxedTransformer<In, Out>,
);

impl TransformerExt for Identity {}

/// Apply `first`, then `second` to its output.
pub fn chain<A, B>(first: A, second: B) -> Chain<A, B> {
    Chain { first, second }
}

/// Applies two transformers in sequence.
#[derive(Clone, Copy, Debug)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<In, A, B> Transformer<In> for Chain<A, B>
where
    A: Transformer<In>,
    B: Transformer<A::Output>,
{
    type Output = B::Output;

    #[inline]
    fn transform(&self, input: In) -> Result<Self::Output, TransformError> {
        let middle = self.first.transform(input)?;
        self.second.transform(middle)
    }
}

/// Chooses between two transformers with a predicate on the input.
#[derive(Clone, Copy, Debug)]
pub struct Conditional<P, A, B> {
    predicate: P,
    on_true: A,
    on_false: B,
}

impl<In, P, A, B> Transformer<In> for Conditional<P, A, B>
where
    P: Predicate<In>,
    A: Transformer<In>,
    B: Transformer<In, Output = A::Output>,
{
    type Output = A::Output;

    fn transform(&self, input: In) -> Result<Self::Output, TransformError> {
        let chosen = self
            .predicate
            .try_check(&input)
            .map_err(|e| TransformError::new(e.message()))?;
        if chosen {
            self.on_true.transform(input)
        } else {
            self.on_false.transform(input)
        }
    }
}

/// Apply `on_true` when `predicate` holds for the input, else `on_false`.
///
/// A failing predicate fails the transformation.
///
/// # Example
///
/// ```rust
/// use bulwark::predicate::less_than;
/// use bulwark::transformer::*;
///
/// let clamp = when(less_than(0), constant(0), identity());
/// assert_eq!(clamp.transform(-7), Ok(0));
/// assert_eq!(clamp.transform(7), Ok(7));
/// ```
pub fn when<P, A, B>(predicate: P, on_true: A, on_false: B) -> Conditional<P, A, B> {
    Conditional {
        predicate,
        on_true,
        on_false,
    }
}

/// A type-erased transformer.
pub struct BoxedTransformer<In, Out>(Box<dyn Transformer<In, Output = Out>>);

impl<In, Out> BoxedTransformer<In, Out> {
    /// Box a transformer.
    pub fn new<T>(transformer: T) -> Self
    where
        T: Transformer<In, Output = Out> + 'static,
    {
        BoxedTransformer(Box::new(transformer))
    }
}

impl<In, Out> Transformer<In> for BoxedTransformer<In, Out> {
    type Output = Out;

    #[inline]
    fn transform(&self, input: In) -> Result<Out, TransformError> {
        self.0.transform(input)
    }
}

impl<In, Out> fmt::Debug for BoxedTransformer<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedTransformer")
    }
}
