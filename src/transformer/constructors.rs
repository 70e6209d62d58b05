//! Transformer constructors

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use super::Transformer;
use crate::error::TransformError;

/// Returns the input unchanged.
#[derive(Clone, Copy, Default, Debug)]
pub struct Identity;

impl<T> Transformer<T> for Identity {
    type Output = T;

    #[inline]
    fn transform(&self, input: T) -> Result<T, TransformError> {
        Ok(input)
    }
}

/// Create a transformer that stores elements as given.
pub fn identity() -> Identity {
    Identity
}

/// Transformer from an infallible function.
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FromFn").field(&"<function>").finish()
    }
}

impl<In, Out, F> Transformer<In> for FromFn<F>
where
    F: Fn(In) -> Out + Send + Sync,
{
    type Output = Out;

    #[inline]
    fn transform(&self, input: In) -> Result<Out, TransformError> {
        Ok((self.0)(input))
    }
}

/// Create a transformer from a function that cannot fail.
///
/// # Example
///
/// ```rust
/// use bulwark::transformer::*;
///
/// let double = from_fn(|x: i32| x * 2);
/// assert_eq!(double.transform(21), Ok(42));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn(f)
}

/// Transformer from a fallible function.
#[derive(Clone, Copy)]
pub struct TryFromFn<F>(F);

impl<F> fmt::Debug for TryFromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TryFromFn").field(&"<function>").finish()
    }
}

impl<In, Out, E, F> Transformer<In> for TryFromFn<F>
where
    F: Fn(In) -> Result<Out, E> + Send + Sync,
    E: Into<TransformError>,
{
    type Output = Out;

    #[inline]
    fn transform(&self, input: In) -> Result<Out, TransformError> {
        (self.0)(input).map_err(Into::into)
    }
}

/// Create a transformer from a function that may fail.
///
/// A returned [`TransformError`] passes through unchanged. Text errors
/// become its message.
///
/// # Example
///
/// ```rust
/// use bulwark::transformer::*;
///
/// let checked = try_from_fn(|x: u8| x.checked_mul(2).ok_or("overflow"));
/// assert_eq!(checked.transform(100), Ok(200));
/// assert_eq!(checked.transform(200).unwrap_err().message(), "overflow");
/// ```
pub fn try_from_fn<F>(f: F) -> TryFromFn<F> {
    TryFromFn(f)
}

/// Ignores the input and yields a fixed value.
#[derive(Clone, Copy, Debug)]
pub struct Constant<V>(V);

impl<In, V: Clone + Send + Sync> Transformer<In> for Constant<V> {
    type Output = V;

    #[inline]
    fn transform(&self, _input: In) -> Result<V, TransformError> {
        Ok(self.0.clone())
    }
}

/// Create a transformer that always yields `value`.
pub fn constant<V: Clone + Send + Sync>(value: V) -> Constant<V> {
    Constant(value)
}

/// Parses text with [`FromStr`].
pub struct Parse<T>(PhantomData<fn() -> T>);

impl<T> Clone for Parse<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Parse<T> {}

impl<T> fmt::Debug for Parse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse<{}>", std::any::type_name::<T>())
    }
}

impl<S, T> Transformer<S> for Parse<T>
where
    S: AsRef<str>,
    T: FromStr,
    T::Err: fmt::Display,
{
    type Output = T;

    fn transform(&self, input: S) -> Result<T, TransformError> {
        let text = input.as_ref();
        text.parse::<T>()
            .map_err(|e| TransformError::new(format!("cannot parse {:?}: {}", text, e)))
    }
}

/// Create a transformer that parses its input into `T`.
///
/// # Example
///
/// ```rust
/// use bulwark::transformer::*;
///
/// assert_eq!(parse::<i32>().transform("42"), Ok(42));
/// assert!(parse::<i32>().transform(String::from("forty-two")).is_err());
/// ```
pub fn parse<T: FromStr>() -> Parse<T> {
    Parse(PhantomData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(identity().transform(vec![1, 2]), Ok(vec![1, 2]));
    }

    #[test]
    fn test_from_fn() {
        let upper = from_fn(|s: &str| s.to_uppercase());
        assert_eq!(upper.transform("abc"), Ok("ABC".to_string()));
    }

    #[test]
    fn test_try_from_fn_failure_message() {
        let t = try_from_fn(|x: i32| if x >= 0 { Ok(x as u32) } else { Err("negative") });
        assert_eq!(t.transform(3), Ok(3));
        let err = t.transform(-3).unwrap_err();
        assert_eq!(err.message(), "negative");
        assert_eq!(err.role(), None);
    }

    #[test]
    fn test_try_from_fn_keeps_transform_error() {
        let t = try_from_fn(|s: String| {
            if s.is_empty() {
                Err(TransformError::new("empty"))
            } else {
                Ok(s.len())
            }
        });
        assert_eq!(t.transform(String::new()).unwrap_err().message(), "empty");

        let owned = try_from_fn(|x: i32| u8::try_from(x).map_err(|e| e.to_string()));
        assert!(owned.transform(300).unwrap_err().message().contains("out of range"));
    }

    #[test]
    fn test_constant_ignores_input() {
        let t = constant("fixed");
        assert_eq!(t.transform(1), Ok("fixed"));
        assert_eq!(t.transform("other"), Ok("fixed"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse::<u16>().transform("8080"), Ok(8080));
        let err = parse::<u16>().transform("70000").unwrap_err();
        assert!(err.message().starts_with("cannot parse \"70000\""));
    }

    #[test]
    fn test_deterministic_for_equal_inputs() {
        let t = from_fn(|s: String| s.len());
        assert_eq!(
            t.transform("same".to_string()),
            t.transform("same".to_string())
        );
    }
}
