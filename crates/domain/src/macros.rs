//! Macro for implementing Display and FromStr for configuration enums
//!
//! Configuration enums are read from environment variables as well as from
//! serde-parsed files, so they need a single, case-insensitive string form.
//!
//! # Example
//!
//! ```rust
//! use chainview_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     File,
//!     Memory,
//! }
//!
//! impl_domain_enum_conversions!(Backend {
//!     File => "file",
//!     Memory => "memory",
//! });
//!
//! assert_eq!("FILE".parse::<Backend>(), Ok(Backend::File));
//! ```

/// Implements Display and FromStr traits for configuration enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive, whitespace-trimmed strings
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
