//! Macro for implementing Display and FromStr for wire-name enums
//!
//! Several domain enums (HTTP verbs, error codes) travel as fixed strings on
//! the wire and in logs. This macro gives them a single source of truth for
//! both directions, with case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use courier_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Verb {
//!     Get,
//!     Post,
//! }
//!
//! impl_wire_name_conversions!(Verb {
//!     Get => "GET",
//!     Post => "POST",
//! });
//!
//! assert_eq!(Verb::Get.to_string(), "GET");
//! assert_eq!("post".parse::<Verb>().unwrap(), Verb::Post);
//! ```

/// Implements Display and FromStr traits for wire-name enums
///
/// This macro generates:
/// - Display trait: writes the variant's wire name exactly as declared
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire name of this variant
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestCode {
        Alpha,
        BetaGamma,
    }

    impl_wire_name_conversions!(TestCode {
        Alpha => "ALPHA",
        BetaGamma => "BETA_GAMMA",
    });

    #[test]
    fn test_display_uses_declared_name() {
        assert_eq!(TestCode::Alpha.to_string(), "ALPHA");
        assert_eq!(TestCode::BetaGamma.to_string(), "BETA_GAMMA");
        assert_eq!(TestCode::BetaGamma.as_str(), "BETA_GAMMA");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestCode::from_str("alpha").unwrap(), TestCode::Alpha);
        assert_eq!(TestCode::from_str("Beta_Gamma").unwrap(), TestCode::BetaGamma);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestCode::from_str("delta");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid TestCode: delta"));
    }

    #[test]
    fn test_fromstr_empty() {
        assert!(TestCode::from_str("").is_err());
    }
}
