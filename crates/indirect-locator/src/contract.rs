//! Singleton contracts
//!
//! A [`Contract`] is the fixed type/name agreement every execution context
//! uses to find one shared instance. Contexts only have to agree on the
//! contract, never on where the instance lives.

/// Fixed identity of a process-wide shared instance
///
/// # Example
/// ```
/// use indirect_locator::Contract;
///
/// struct CounterContract;
///
/// impl Contract for CounterContract {
///     type Instance = std::sync::atomic::AtomicU64;
///     const NAME: &'static str = "example::Counter";
///     const VERSION: u32 = 1;
///
///     fn create() -> Self::Instance {
///         std::sync::atomic::AtomicU64::new(0)
///     }
/// }
/// ```
pub trait Contract: 'static {
    /// Shared instance type
    type Instance: Send + Sync + 'static;

    /// Well-known name of the shared slot
    const NAME: &'static str;

    /// Contract version; a mismatch with the published one is fatal
    const VERSION: u32;

    /// Build the instance for the first caller in the process
    fn create() -> Self::Instance;
}
