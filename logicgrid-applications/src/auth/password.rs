//! Password strength rules

use crate::ApplicationError;
use thiserror::Error;
use unicode_general_category::get_general_category;

/// Reason a password was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("password must be at least 8 characters long")]
    TooShort,
    #[error("password must contain at least one uppercase, one lowercase, one number, and one special character")]
    MissingCharacterClass,
}

impl From<PolicyError> for ApplicationError {
    fn from(error: PolicyError) -> Self {
        ApplicationError::validation(error.to_string())
    }
}

/// Stateless password strength validator
pub struct PasswordPolicy;

impl PasswordPolicy {
    pub const MIN_LENGTH: usize = 8;

    /// Accept a password only if it is long enough and mixes all four
    /// character classes: uppercase, lowercase, digit and punctuation/symbol.
    pub fn validate(password: &str) -> Result<(), PolicyError> {
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(PolicyError::TooShort);
        }

        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_digit = false;
        let mut has_special = false;

        for c in password.chars() {
            if c.is_uppercase() {
                has_upper = true;
            } else if c.is_lowercase() {
                has_lower = true;
            } else if c.is_numeric() {
                has_digit = true;
            } else if is_punctuation_or_symbol(c) {
                has_special = true;
            }
        }

        if has_upper && has_lower && has_digit && has_special {
            Ok(())
        } else {
            Err(PolicyError::MissingCharacterClass)
        }
    }
}

/// Unicode general categories P* and S*
fn is_punctuation_or_symbol(c: char) -> bool {
    use unicode_general_category::GeneralCategory::*;

    matches!(
        get_general_category(c),
        ConnectorPunctuation
            | DashPunctuation
            | OpenPunctuation
            | ClosePunctuation
            | InitialPunctuation
            | FinalPunctuation
            | OtherPunctuation
            | MathSymbol
            | CurrencySymbol
            | ModifierSymbol
            | OtherSymbol
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_password_accepted() {
        assert_eq!(PasswordPolicy::validate("Abcdef1!"), Ok(()));
    }

    #[test]
    fn test_short_passwords_rejected() {
        for password in ["", "A1!a", "Abcde1!"] {
            assert_eq!(
                PasswordPolicy::validate(password),
                Err(PolicyError::TooShort),
                "{password:?} should be too short"
            );
        }
    }

    #[test]
    fn test_each_missing_class_rejected() {
        let missing_one = [
            "abcdef1!", // no uppercase
            "ABCDEF1!", // no lowercase
            "Abcdefg!", // no digit
            "Abcdefg1", // no symbol
        ];
        for password in missing_one {
            assert_eq!(
                PasswordPolicy::validate(password),
                Err(PolicyError::MissingCharacterClass),
                "{password:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Seven characters, more than eight bytes
        assert_eq!(PasswordPolicy::validate("Äbcdé1!"), Err(PolicyError::TooShort));
        assert_eq!(PasswordPolicy::validate("Äbcdéf1!"), Ok(()));
    }

    #[test]
    fn test_whitespace_is_not_a_symbol() {
        assert_eq!(
            PasswordPolicy::validate("Abcdef1 "),
            Err(PolicyError::MissingCharacterClass)
        );
        assert_eq!(PasswordPolicy::validate("Abcdef1€"), Ok(()));
    }

    #[test]
    fn test_marks_and_format_characters_are_not_symbols() {
        for password in [
            "Abcdefg1\u{0301}", // combining acute accent (Mn)
            "Abcdefg1\u{200B}", // zero-width space (Cf)
            "Abcdefg1\u{E000}", // private use (Co)
        ] {
            assert_eq!(
                PasswordPolicy::validate(password),
                Err(PolicyError::MissingCharacterClass),
                "{password:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_unicode_punctuation_and_symbols_accepted() {
        for password in ["Abcdefg1€", "Abcdefg1«", "Abcdefg1—", "Abcdefg1±", "Abcdefg1^"] {
            assert_eq!(PasswordPolicy::validate(password), Ok(()), "{password:?}");
        }
    }

    #[test]
    fn test_policy_error_maps_to_validation() {
        let error: ApplicationError = PolicyError::TooShort.into();
        assert!(matches!(error, ApplicationError::Validation { .. }));
        assert_eq!(error.to_string(), "password must be at least 8 characters long");
    }
}
