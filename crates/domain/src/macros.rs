//! Macro for implementing Display and FromStr for label enums
//!
//! Difficulty tiers, confidence labels and similar enums travel as lowercase
//! strings in config files, environment variables and cache keys. This macro
//! gives them one consistent Display/FromStr pair.
//!
//! # Example
//!
//! ```rust
//! use quizgate_domain::impl_domain_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Band {
//!     Low,
//!     High,
//! }
//!
//! impl_domain_label_conversions!(Band {
//!     Low => "low",
//!     High => "high",
//! });
//!
//! assert_eq!("HIGH".parse::<Band>(), Ok(Band::High));
//! assert_eq!(Band::Low.to_string(), "low");
//! ```

/// Implements Display and FromStr traits for label enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive, whitespace-trimmed strings
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{QuizgateError, Result};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestLabel {
        Tail,
        Head,
    }

    impl_domain_label_conversions!(TestLabel {
        Tail => "tail",
        Head => "head",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestLabel::Tail.to_string(), "tail");
        assert_eq!(TestLabel::Head.to_string(), "head");
    }

    #[test]
    fn test_fromstr_case_and_whitespace() {
        assert_eq!(TestLabel::from_str("tail"), Ok(TestLabel::Tail));
        assert_eq!(TestLabel::from_str("HEAD"), Ok(TestLabel::Head));
        assert_eq!(TestLabel::from_str("  Head "), Ok(TestLabel::Head));
    }

    #[test]
    fn test_fromstr_invalid() {
        let err = TestLabel::from_str("middle").expect_err("unknown label");
        assert!(err.contains("Invalid TestLabel: middle"));
        assert!(TestLabel::from_str("").is_err());
    }

    /// Validates the generated impls compile next to the crate's `Result`
    /// alias and feed it through `?`.
    #[test]
    fn test_fromstr_with_result_alias_in_scope() {
        fn parse(raw: &str) -> Result<TestLabel> {
            let label = raw.parse::<TestLabel>().map_err(QuizgateError::InvalidInput)?;
            Ok(label)
        }

        assert_eq!(parse("Tail").expect("valid label"), TestLabel::Tail);
        assert!(matches!(parse("sideways"), Err(QuizgateError::InvalidInput(_))));
    }
}
