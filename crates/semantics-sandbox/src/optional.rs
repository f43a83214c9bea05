//! Optional values: explicit presence checks and forced access
//!
//! `OptionalValue<T>` is `Option<T>`. The functions here are the only
//! ways the sandbox reads one: with a default, lazily, through chaining,
//! or by forcing it and receiving a typed [`AbsentValueError`].

use crate::error::AbsentValueError;

/// A value that may be absent
pub type OptionalValue<T> = Option<T>;

/// Forced access that reports absence instead of aborting.
pub trait ForceUnwrap<T> {
    /// The contained value, or [`AbsentValueError`] naming `T`.
    fn force_unwrap(self) -> Result<T, AbsentValueError>;
}

impl<T> ForceUnwrap<T> for Option<T> {
    fn force_unwrap(self) -> Result<T, AbsentValueError> {
        self.ok_or_else(AbsentValueError::of::<T>)
    }
}

/// The contained value, or `default` when absent.
pub fn unwrap_or<T>(optional: OptionalValue<T>, default: T) -> T {
    optional.unwrap_or(default)
}

/// The contained value, or `default()` when absent.
///
/// `default` is only evaluated for an absent value.
pub fn unwrap_or_else<T>(optional: OptionalValue<T>, default: impl FnOnce() -> T) -> T {
    optional.unwrap_or_else(default)
}

/// The contained value, or [`AbsentValueError`].
///
/// # Example
///
/// ```
/// use semantics_sandbox::optional::force_unwrap;
///
/// assert_eq!(force_unwrap(Some(3)).unwrap(), 3);
/// assert!(force_unwrap(None::<i64>).is_err());
/// ```
pub fn force_unwrap<T>(optional: OptionalValue<T>) -> Result<T, AbsentValueError> {
    optional.force_unwrap()
}

/// Optional chaining: apply `f` to a present value, short-circuit on absent.
pub fn chain<T, U>(
    optional: OptionalValue<T>,
    f: impl FnOnce(T) -> OptionalValue<U>,
) -> OptionalValue<U> {
    optional.and_then(f)
}

/// Bind two optionals at once; present only when both are.
pub fn bind_all<A, B>(a: OptionalValue<A>, b: OptionalValue<B>) -> OptionalValue<(A, B)> {
    a.zip(b)
}
