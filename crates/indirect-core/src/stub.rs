//! The dispatch stub
//!
//! Every intercepted function's entry is rewritten to call into this module:
//! look up the identity, run the active replacement if there is one, and
//! otherwise run the original body. The replacement is invoked after the
//! registry lookup has returned, so no registry lock is held while user code
//! runs and a replacement may itself install overrides or call other
//! intercepted functions.

use crate::binding::Binding;
use crate::error::IndirectError;
use crate::shape::{Func, OutFunc};

/// Route one call through `binding`
///
/// Runs `replacement` with the active delegate when one is installed, and
/// `original` otherwise. Exactly one of the two runs.
///
/// # Errors
/// Returns [`IndirectError`] if the registry cannot be located or the active
/// delegate has another shape; neither callback runs in that case.
pub fn dispatch<D, T>(
    binding: &Binding<D>,
    replacement: impl FnOnce(&D) -> T,
    original: impl FnOnce() -> T,
) -> Result<T, IndirectError>
where
    D: Send + Sync + 'static,
{
    match binding.resolve()? {
        Some(delegate) => Ok(replacement(&delegate)),
        None => Ok(original()),
    }
}

impl<A, R> Binding<Func<A, R>>
where
    A: ?Sized + 'static,
    R: 'static,
{
    /// Call the intercepted function
    ///
    /// # Errors
    /// See [`dispatch`].
    pub fn invoke(&self, args: &A, original: impl FnOnce(&A) -> R) -> Result<R, IndirectError> {
        dispatch(self, |replacement| replacement.call(args), || original(args))
    }
}

impl<A, O, R> Binding<OutFunc<A, O, R>>
where
    A: ?Sized + 'static,
    O: 'static,
    R: 'static,
{
    /// Call the intercepted function, threading the output slot through
    /// whichever body runs
    ///
    /// # Errors
    /// See [`dispatch`].
    pub fn invoke(
        &self,
        args: &A,
        out: &mut O,
        original: impl FnOnce(&A, &mut O) -> R,
    ) -> Result<R, IndirectError> {
        match self.resolve()? {
            Some(replacement) => Ok(replacement.call(args, out)),
            None => Ok(original(args, out)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indirect_identity::TargetIdentity;
    use indirect_registry::OverrideRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn falls_through_to_original() {
        let binding: Binding<Func<i32, i32>> = Binding::new(TargetIdentity::new("stub_tests", 1))
            .with_registry(Arc::new(OverrideRegistry::new()));
        assert_eq!(binding.invoke(&20, |x| x + 1).unwrap(), 21);
    }

    #[test]
    fn exactly_one_body_runs() {
        let binding: Binding<Func<i32, i32>> = Binding::new(TargetIdentity::new("stub_tests", 2))
            .with_registry(Arc::new(OverrideRegistry::new()));
        let originals = AtomicUsize::new(0);

        let _guard = binding.install_fn(|x| x * 10).unwrap();
        let result = binding
            .invoke(&4, |x| {
                originals.fetch_add(1, Ordering::SeqCst);
                *x
            })
            .unwrap();

        assert_eq!(result, 40);
        assert_eq!(originals.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_works_with_plain_fn_pointers() {
        fn doubled(x: u8) -> u8 {
            x.wrapping_mul(2)
        }

        let binding: Binding<fn(u8) -> u8> = Binding::new(TargetIdentity::new("stub_tests", 3))
            .with_registry(Arc::new(OverrideRegistry::new()));
        let _guard = binding.install(doubled as fn(u8) -> u8).unwrap();
        let result = dispatch(&binding, |f| f(21), || 0).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn replacement_may_reenter_the_registry() {
        let registry = Arc::new(OverrideRegistry::new());
        let outer: Binding<Func<i32, i32>> = Binding::new(TargetIdentity::new("stub_tests", 4))
            .with_registry(Arc::clone(&registry));
        let inner: Binding<Func<i32, i32>> = Binding::new(TargetIdentity::new("stub_tests", 5))
            .with_registry(Arc::clone(&registry));

        let _inner_guard = inner.install_fn(|x| x + 100).unwrap();
        let nested = inner.clone();
        let _outer_guard = outer
            .install_fn(move |x| nested.invoke(x, |x| *x).unwrap() * 2)
            .unwrap();

        assert_eq!(outer.invoke(&1, |x| *x).unwrap(), 202);
    }
}
