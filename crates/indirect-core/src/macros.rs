//! Binding declaration macro

/// Declare an accessor returning the [`Binding`](crate::Binding) for one
/// intercepted function
///
/// The identity is built once and reused by every call to the accessor.
///
/// ```rust
/// use indirect_core::{binding, Func};
///
/// binding! {
///     /// `app::checksum(&[u8]) -> u32`
///     pub fn checksum() -> Func<[u8], u32> {
///         module: "app, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null",
///         token: 0x0600_0010,
///     }
/// }
///
/// assert_eq!(checksum().identity().token(), 0x0600_0010);
/// ```
#[macro_export]
macro_rules! binding {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident() -> $delegate:ty {
            module: $module:expr,
            token: $token:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[must_use]
        $vis fn $name() -> $crate::Binding<$delegate> {
            static IDENTITY: $crate::__private::Lazy<$crate::TargetIdentity> =
                $crate::__private::Lazy::new(|| {
                    $crate::TargetIdentity::new(
                        $module,
                        u64::from($crate::FunctionToken::new($token).raw()),
                    )
                });
            $crate::Binding::new(IDENTITY.clone())
        }
    };
}
