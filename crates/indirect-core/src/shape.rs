//! Delegate shapes
//!
//! A replacement must have exactly the intercepted function's shape. Two
//! shapes cover the generated surface:
//!
//! - [`Func<A, R>`]: `fn(&A) -> R`
//! - [`OutFunc<A, O, R>`]: `fn(&A, &mut O) -> R`, where `O` is the output
//!   slot of a function that reports a value through an out-parameter
//!
//! Multi-argument functions use a tuple for `A`.

use std::fmt::{self, Debug, Formatter};

/// Replacement for a function taking its arguments by reference
pub struct Func<A: ?Sized, R> {
    f: Box<dyn Fn(&A) -> R + Send + Sync>,
}

impl<A: ?Sized, R> Func<A, R> {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }

    /// Invoke the replacement
    #[inline]
    pub fn call(&self, args: &A) -> R {
        (self.f)(args)
    }
}

impl<A: ?Sized, R> Debug for Func<A, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(std::any::type_name::<Self>())
    }
}

/// Replacement for a function with an explicit output slot
pub struct OutFunc<A: ?Sized, O, R> {
    f: Box<dyn Fn(&A, &mut O) -> R + Send + Sync>,
}

impl<A: ?Sized, O, R> OutFunc<A, O, R> {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A, &mut O) -> R + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }

    /// Invoke the replacement, forwarding the output slot
    #[inline]
    pub fn call(&self, args: &A, out: &mut O) -> R {
        (self.f)(args, out)
    }
}

impl<A: ?Sized, O, R> Debug for OutFunc<A, O, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(std::any::type_name::<Self>())
    }
}
