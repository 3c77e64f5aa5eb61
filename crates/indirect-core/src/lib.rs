//! Indirect Core
//!
//! Typed access to the process-wide override registry.
//!
//! # Core Concepts
//!
//! - [`Binding`]: one intercepted function's identity plus its delegate shape
//! - [`OverrideGuard`]: scoped install, uninstalled on drop
//! - [`dispatch`]: the stub every intercepted entry point calls
//! - [`OverrideSession`]: clears and reports leftovers at the end of a test
//! - [`RegistryContract`]: the registry's slot in the process-wide locator
//!
//! # Example
//!
//! ```rust
//! use indirect_core::bindings::mscorlib;
//!
//! fn original_try_parse(s: &str, out: &mut i32) -> bool {
//!     match s.trim().parse() {
//!         Ok(v) => { *out = v; true }
//!         Err(_) => false,
//!     }
//! }
//!
//! let binding = mscorlib::int32::try_parse();
//! let mut value = 0;
//!
//! let guard = binding.install_fn(|_, out| { *out = 42; true }).unwrap();
//! assert!(binding.invoke("not a number", &mut value, original_try_parse).unwrap());
//! assert_eq!(value, 42);
//!
//! guard.release().unwrap();
//! assert!(binding.invoke("7", &mut value, original_try_parse).unwrap());
//! assert_eq!(value, 7);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod binding;
pub mod bindings;
mod error;
mod macros;
mod session;
mod shape;
mod shared;
mod stub;

pub use binding::{bind, Binding, OverrideGuard, RegistrySource};
pub use error::IndirectError;
pub use session::OverrideSession;
pub use shape::{Func, OutFunc};
pub use shared::{resolve_in, shared_registry, RegistryContract};
pub use stub::dispatch;

pub use indirect_identity::{FunctionToken, ModuleIdentity, TargetIdentity};
pub use indirect_locator::{
    BoundaryBindingError, ExecutionContext, ProcessLocator, SharedSingletonLocator,
};
pub use indirect_registry::{
    OverrideHandle, OverrideRegistry, RegistryConfig, RegistryError, RegistrySnapshot,
};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
