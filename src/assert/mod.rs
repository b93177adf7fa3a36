//! Assertions for test bodies
//!
//! Each assertion returns `Err(AssertionError)` when its predicate does not
//! hold, so a body can use `?` and the failure becomes the test's error.
//!
//! ```ignore
//! Test::new("adds", |_| {
//!     assert::equal(1 + 1, 2)?;
//!     assert::ok(!"".contains('x'))?;
//!     Ok(())
//! });
//! ```

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};

use crate::models::{Assertion, AssertionError};

pub type AssertResult = Result<(), AssertionError>;

/// Passes when `condition` is true
pub fn ok(condition: bool) -> AssertResult {
    if condition {
        Ok(())
    } else {
        Err(AssertionError::new(Assertion::Ok, "expected true, got false"))
    }
}

/// Passes when `actual == expected`
pub fn equal<T: PartialEq + Debug>(actual: T, expected: T) -> AssertResult {
    compare(Assertion::Equal, actual == expected, &actual, &expected, "==")
}

/// Passes when `actual != expected`
pub fn not_equal<T: PartialEq + Debug>(actual: T, expected: T) -> AssertResult {
    compare(Assertion::NotEqual, actual != expected, &actual, &expected, "!=")
}

/// Same as [`equal`]; `PartialEq` never coerces between types
pub fn strict_equal<T: PartialEq + Debug>(actual: T, expected: T) -> AssertResult {
    equal(actual, expected)
}

/// Same as [`not_equal`]
pub fn not_strict_equal<T: PartialEq + Debug>(actual: T, expected: T) -> AssertResult {
    not_equal(actual, expected)
}

/// Structural equality through references, e.g. `&Vec<T>` against `&[T]`
pub fn deep_equal<A, B>(actual: &A, expected: &B) -> AssertResult
where
    A: PartialEq<B> + Debug + ?Sized,
    B: Debug + ?Sized,
{
    compare(Assertion::DeepEqual, actual == expected, actual, expected, "==")
}

pub fn not_deep_equal<A, B>(actual: &A, expected: &B) -> AssertResult
where
    A: PartialEq<B> + Debug + ?Sized,
    B: Debug + ?Sized,
{
    compare(Assertion::NotDeepEqual, actual != expected, actual, expected, "!=")
}

/// Passes when `f` returns `Err` or panics
pub fn throws<T, E>(f: impl FnOnce() -> Result<T, E>) -> AssertResult {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(_)) => Err(AssertionError::new(
            Assertion::Throws,
            "expected an error, but the call succeeded",
        )),
        Ok(Err(_)) | Err(_) => Ok(()),
    }
}

/// Passes when `f` returns `Ok` without panicking
pub fn does_not_throw<T, E: Debug>(f: impl FnOnce() -> Result<T, E>) -> AssertResult {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(err)) => Err(AssertionError::new(
            Assertion::DoesNotThrow,
            format!("unexpected error: {err:?}"),
        )),
        Err(_) => Err(AssertionError::new(
            Assertion::DoesNotThrow,
            "unexpected panic",
        )),
    }
}

/// Fails when `value` is an error
pub fn if_error<T, E: Debug>(value: &Result<T, E>) -> AssertResult {
    match value {
        Ok(_) => Ok(()),
        Err(err) => Err(AssertionError::new(Assertion::IfError, format!("{err:?}"))),
    }
}

/// Always fails
pub fn fail(message: impl Into<String>) -> AssertResult {
    Err(AssertionError::new(Assertion::Fail, message))
}

fn compare<A, B>(
    operator: Assertion,
    holds: bool,
    actual: &A,
    expected: &B,
    op: &str,
) -> AssertResult
where
    A: Debug + ?Sized,
    B: Debug + ?Sized,
{
    if holds {
        Ok(())
    } else {
        Err(AssertionError::new(
            operator,
            format!("expected {actual:?} {op} {expected:?}"),
        ))
    }
}
