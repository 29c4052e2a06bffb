//! Recipient phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} digits")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("phone number must contain digits only")]
    NonDigit,
}

/// A shipping recipient's phone number.
///
/// Address forms only accept digits (`[0-9]*`) and require a value. Surrounding
/// whitespace is trimmed before validation.
///
/// ## Examples
///
/// ```
/// use bettabeal_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("081234567890").is_ok());
/// assert!(PhoneNumber::parse("").is_err());
/// assert!(PhoneNumber::parse("+62 812").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Maximum number of digits (E.164 limit).
    pub const MAX_LENGTH: usize = 15;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains a non-digit character.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::NonDigit);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PhoneNumberError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(PhoneNumber::parse("081234567890").is_ok());
        assert_eq!(
            PhoneNumber::parse(" 0812 ").map(|p| p.as_str().to_owned()),
            Ok("0812".to_owned())
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PhoneNumber::parse("   "), Err(PhoneNumberError::Empty));
    }

    #[test]
    fn test_parse_non_digit() {
        assert_eq!(
            PhoneNumber::parse("0812-3456"),
            Err(PhoneNumberError::NonDigit)
        );
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            PhoneNumber::parse(&"1".repeat(16)),
            Err(PhoneNumberError::TooLong { .. })
        ));
    }
}
