//! Indirect Identity
//!
//! Stable names for redirectable functions.
//!
//! # Overview
//!
//! - [`TargetIdentity`]: the registry key, an opaque `(module, token)` pair
//! - [`ModuleIdentity`]: structured module name (name, version, locale, key token)
//! - [`FunctionToken`]: 32-bit metadata token naming one function within a module
//!
//! The registry never inspects the module string; [`ModuleIdentity`] and
//! [`TargetIdentity::from_symbol`] are just two ways of producing one.
//!
//! # Example
//!
//! ```rust
//! use indirect_identity::{FunctionToken, ModuleIdentity, TargetIdentity};
//!
//! let module: ModuleIdentity =
//!     "mscorlib, Version=2.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
//!         .parse()
//!         .unwrap();
//! let id = TargetIdentity::from_module(&module, FunctionToken::new(0x0600_001A));
//!
//! assert_eq!(id.token(), 0x0600_001A);
//! assert!(id.module().starts_with("mscorlib"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod module;
mod target;
mod token;

pub use error::IdentityError;
pub use module::{ModuleIdentity, ModuleVersion, PublicKeyToken};
pub use target::TargetIdentity;
pub use token::{FunctionToken, TokenKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
