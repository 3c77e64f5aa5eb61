//! Testing utilities for the indirect workspace
//!
//! Shared test helpers, fixtures, and a small stand-in for an intercepted
//! program.

#![allow(missing_docs)]

use indirect_core::bindings::mscorlib;
use indirect_core::ExecutionContext;
use indirect_identity::TargetIdentity;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0x0600_8000);

/// Install a test subscriber honoring `RUST_LOG` (default `warn`)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Identity no other test in the process uses
pub fn unique_identity(module: &str) -> TargetIdentity {
    TargetIdentity::new(module, NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
}

pub fn identities(module: &str, count: usize) -> Vec<TargetIdentity> {
    (0..count).map(|_| unique_identity(module)).collect()
}

pub fn process_context(label: &str) -> Arc<ExecutionContext> {
    Arc::new(ExecutionContext::new(label))
}

/// Stand-in for a program whose `Int32.TryParse` entry was rewritten to
/// call the dispatch stub
pub mod program {
    use super::mscorlib;

    /// The untouched body
    pub fn original_int32_try_parse(s: &str, result: &mut i32) -> bool {
        match s.trim().parse() {
            Ok(value) => {
                *result = value;
                true
            }
            Err(_) => {
                *result = 0;
                false
            }
        }
    }

    /// The rewritten entry point
    pub fn int32_try_parse(s: &str, result: &mut i32) -> bool {
        match mscorlib::int32::try_parse().invoke(s, result, original_int32_try_parse) {
            Ok(parsed) => parsed,
            Err(err) => panic!("Int32.TryParse dispatch failed: {err}"),
        }
    }
}
