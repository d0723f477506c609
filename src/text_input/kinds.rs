//! Input type presets.

use super::format::{CurrencyFormatter, Formatter, IdentityFormatter, PasswordFormatter, PatternFormatter};
use super::validate::{Validator, rules};

/// What kind of value a [`super::TextInput`] edits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputType {
    #[default]
    Text,
    Password,
    Email,
    Phone,
    Number,
    Integer,
    Decimal,
    Currency,
    Date,
    Time,
    DateTime,
    Url,
    Search,
    Multiline,
    /// No preset; formatter, validator and filter are supplied by the caller.
    Custom,
}

impl InputType {
    #[must_use]
    pub fn is_multiline(self) -> bool {
        self == Self::Multiline
    }

    /// Formatter installed by the preset.
    #[must_use]
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            Self::Password => Box::new(PasswordFormatter::default()),
            Self::Phone => Box::new(PatternFormatter::phone()),
            Self::Currency => Box::new(CurrencyFormatter::default()),
            Self::Date => Box::new(PatternFormatter::date()),
            Self::Time => Box::new(PatternFormatter::time()),
            Self::DateTime => Box::new(PatternFormatter::date_time()),
            _ => Box::new(IdentityFormatter),
        }
    }

    /// Validator installed by the preset.
    #[must_use]
    pub fn validator(self) -> Validator {
        let rule = match self {
            Self::Email => rules::email(),
            Self::Phone => rules::phone(10),
            Self::Number => rules::number(),
            Self::Integer => rules::integer(),
            Self::Decimal => rules::decimal(),
            Self::Currency => rules::currency(),
            Self::Date => rules::date(),
            Self::Time => rules::time(),
            Self::DateTime => rules::date_time(),
            Self::Url => rules::url(),
            _ => return Validator::new(),
        };
        Validator::new().with_rule(rule)
    }

    /// Maximum raw length implied by the preset.
    #[must_use]
    pub fn max_length(self) -> Option<usize> {
        match self {
            Self::Phone => Some(10),
            Self::Date => Some(8),
            Self::Time => Some(4),
            Self::DateTime => Some(12),
            _ => None,
        }
    }

    /// Whether `ch` may be typed at raw position `pos` of `text`.
    #[must_use]
    pub fn accepts(self, ch: char, pos: usize, text: &str) -> bool {
        match self {
            Self::Phone | Self::Date | Self::Time | Self::DateTime => ch.is_ascii_digit(),
            Self::Integer => ch.is_ascii_digit() || (ch == '-' && pos == 0 && !text.starts_with('-')),
            Self::Number | Self::Decimal => {
                ch.is_ascii_digit()
                    || (ch == '-' && pos == 0 && !text.starts_with('-'))
                    || (ch == '.' && !text.contains('.'))
                    || (self == Self::Number && matches!(ch, 'e' | 'E') && !text.contains(['e', 'E']))
            }
            Self::Currency => ch.is_ascii_digit() || (ch == '.' && !text.contains('.')),
            Self::Email | Self::Url => !ch.is_control() && !ch.is_whitespace(),
            Self::Multiline => ch == '\n' || ch == '\t' || !ch.is_control(),
            Self::Text | Self::Password | Self::Search | Self::Custom => !ch.is_control(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_filter() {
        assert!(InputType::Integer.accepts('-', 0, ""));
        assert!(!InputType::Integer.accepts('-', 1, "5"));
        assert!(!InputType::Integer.accepts('-', 0, "-5"));
        assert!(!InputType::Integer.accepts('a', 0, ""));
    }

    #[test]
    fn test_decimal_filter() {
        assert!(InputType::Decimal.accepts('.', 1, "1"));
        assert!(!InputType::Decimal.accepts('.', 3, "1.5"));
        assert!(InputType::Number.accepts('e', 1, "1"));
        assert!(!InputType::Decimal.accepts('e', 1, "1"));
    }

    #[test]
    fn test_single_line_rejects_newline() {
        assert!(!InputType::Text.accepts('\n', 0, ""));
        assert!(InputType::Multiline.accepts('\n', 0, ""));
        assert!(!InputType::Email.accepts(' ', 0, ""));
    }

    #[test]
    fn test_presets() {
        assert_eq!(InputType::Phone.formatter().format("5551234567"), "(555) 123-4567");
        assert_eq!(InputType::Password.formatter().format("abc"), "***");
        assert!(InputType::Text.validator().is_empty());
        assert!(!InputType::Date.validator().validate("20241340").is_valid());
        assert_eq!(InputType::Time.max_length(), Some(4));
    }
}
