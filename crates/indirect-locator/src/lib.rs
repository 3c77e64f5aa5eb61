//! Indirect Locator
//!
//! Cross-boundary singleton access: every execution context in a process
//! resolves the same instance of a [`Contract`].
//!
//! # Core Concepts
//!
//! - [`Contract`]: fixed name + version + instance type of a shared slot
//! - [`Rendezvous`]: process-wide table of published instances
//! - [`SharedSingletonLocator`]: `get_or_register` over a rendezvous
//! - [`ExecutionContext`]: isolated context converging on shared instances
//!
//! # Example
//!
//! ```rust
//! use indirect_locator::{Contract, ExecutionContext, Rendezvous, SharedSingletonLocator};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct Hits;
//!
//! impl Contract for Hits {
//!     type Instance = AtomicU64;
//!     const NAME: &'static str = "doc::Hits";
//!     const VERSION: u32 = 1;
//!     fn create() -> AtomicU64 { AtomicU64::new(0) }
//! }
//!
//! let rendezvous = Arc::new(Rendezvous::new());
//! let left = ExecutionContext::within(Arc::clone(&rendezvous), "left");
//! let right = ExecutionContext::within(rendezvous, "right");
//!
//! left.get_or_register::<Hits>().unwrap().fetch_add(1, Ordering::SeqCst);
//! assert_eq!(right.get_or_register::<Hits>().unwrap().load(Ordering::SeqCst), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod contract;
mod error;
mod locator;
mod rendezvous;

pub use contract::Contract;
pub use error::BoundaryBindingError;
pub use locator::{ExecutionContext, ProcessLocator, SharedSingletonLocator};
pub use rendezvous::Rendezvous;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
