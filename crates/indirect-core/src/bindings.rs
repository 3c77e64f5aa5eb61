//! Generated bindings
//!
//! One accessor per intercepted function, grouped by module and type.

/// `mscorlib, Version=2.0.0.0`
pub mod mscorlib {
    /// Module identity string
    pub const MODULE: &str =
        "mscorlib, Version=2.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089";

    /// `System.Int32`
    pub mod int32 {
        use crate::shape::OutFunc;

        /// Token of `Int32.TryParse(string, out int) -> bool`
        pub const TRY_PARSE_STRING_INT32: u32 = 0x0600_001A;

        crate::binding! {
            /// `Int32.TryParse(string, out int) -> bool`
            ///
            /// Returns whether the string parsed; the parsed value is written
            /// to the output slot.
            pub fn try_parse() -> OutFunc<str, i32, bool> {
                module: super::MODULE,
                token: TRY_PARSE_STRING_INT32,
            }
        }
    }
}
