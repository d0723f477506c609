//! Display formatters.
//!
//! A formatter turns the raw text a user typed into the text painted on
//! screen and back. The raw text is what the input stores, validates and
//! copies; the display text is derived and never edited directly.
//!
//! Index mapping between the two is greedy by default: walking the display
//! text, each character equal to the next unconsumed raw character is taken
//! to be that raw character, everything else is decoration. This holds for
//! every formatter that keeps raw characters in order and only inserts
//! literals. Formatters that substitute characters override both mappings.

use std::fmt;

/// Raw ↔ display text conversion.
pub trait Formatter {
    fn format(&self, raw: &str) -> String;

    fn unformat(&self, display: &str) -> String;

    /// Hint shown while the input is empty.
    fn placeholder(&self) -> Option<String> {
        None
    }

    /// Display index of the caret sitting at raw index `raw_index`.
    fn display_index(&self, raw: &str, raw_index: usize) -> usize {
        if raw_index == 0 {
            return 0;
        }
        let display = self.format(raw);
        let mut raw_chars = raw.chars();
        let mut next = raw_chars.next();
        let mut consumed = 0;
        for (i, ch) in display.chars().enumerate() {
            if Some(ch) == next {
                consumed += 1;
                next = raw_chars.next();
                if consumed == raw_index {
                    return i + 1;
                }
            }
        }
        display.chars().count()
    }

    /// Raw index corresponding to display index `display_index`.
    fn raw_index(&self, raw: &str, display_index: usize) -> usize {
        let display = self.format(raw);
        let mut raw_chars = raw.chars();
        let mut next = raw_chars.next();
        let mut consumed = 0;
        for ch in display.chars().take(display_index) {
            if Some(ch) == next {
                consumed += 1;
                next = raw_chars.next();
            }
        }
        consumed
    }
}

/// Shows the raw text unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityFormatter;

impl Formatter for IdentityFormatter {
    fn format(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn unformat(&self, display: &str) -> String {
        display.to_string()
    }

    fn display_index(&self, _raw: &str, raw_index: usize) -> usize {
        raw_index
    }

    fn raw_index(&self, raw: &str, display_index: usize) -> usize {
        display_index.min(raw.chars().count())
    }
}

/// Masks every code point with a fixed character.
///
/// `unformat` cannot recover the hidden text; the input never needs it to,
/// since it stores the raw text itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordFormatter {
    mask: char,
}

impl Default for PasswordFormatter {
    fn default() -> Self {
        Self { mask: '*' }
    }
}

impl PasswordFormatter {
    #[must_use]
    pub fn new(mask: char) -> Self {
        Self { mask }
    }

    #[must_use]
    pub fn mask(&self) -> char {
        self.mask
    }
}

impl Formatter for PasswordFormatter {
    fn format(&self, raw: &str) -> String {
        std::iter::repeat_n(self.mask, raw.chars().count()).collect()
    }

    fn unformat(&self, display: &str) -> String {
        display.to_string()
    }

    fn display_index(&self, _raw: &str, raw_index: usize) -> usize {
        raw_index
    }

    fn raw_index(&self, raw: &str, display_index: usize) -> usize {
        display_index.min(raw.chars().count())
    }
}

/// Slot pattern such as `(###) ###-####`.
///
/// `#` is a slot filled by one raw character; anything else is a literal
/// emitted only when a raw character follows it. Raw characters beyond the
/// last slot are appended unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternFormatter {
    pattern: Vec<char>,
    placeholder: Option<String>,
}

impl PatternFormatter {
    pub const SLOT: char = '#';

    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            placeholder: None,
        }
    }

    /// US phone number, `(555) 123-4567`.
    #[must_use]
    pub fn phone() -> Self {
        Self::new("(###) ###-####")
    }

    /// ISO date, `2024-03-15`.
    #[must_use]
    pub fn date() -> Self {
        Self::new("####-##-##")
    }

    /// 24-hour time, `09:30`.
    #[must_use]
    pub fn time() -> Self {
        Self::new("##:##")
    }

    #[must_use]
    pub fn date_time() -> Self {
        Self::new("####-##-## ##:##")
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Number of raw characters the pattern holds.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.pattern.iter().filter(|&&c| c == Self::SLOT).count()
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, raw: &str) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut raw_chars = raw.chars().peekable();
        let mut pending = String::new();
        for &p in &self.pattern {
            if raw_chars.peek().is_none() {
                break;
            }
            if p == Self::SLOT {
                out.push_str(&pending);
                pending.clear();
                if let Some(ch) = raw_chars.next() {
                    out.push(ch);
                }
            } else {
                pending.push(p);
            }
        }
        out.extend(raw_chars);
        out
    }

    fn unformat(&self, display: &str) -> String {
        let mut out = String::with_capacity(display.len());
        let mut pattern = self.pattern.iter();
        for ch in display.chars() {
            match pattern.next() {
                Some(&p) if p == Self::SLOT => out.push(ch),
                Some(&p) if p == ch => {}
                // Off-pattern text is kept as typed.
                _ => out.push(ch),
            }
        }
        out
    }

    fn placeholder(&self) -> Option<String> {
        self.placeholder.clone().or_else(|| {
            Some(
                self.pattern
                    .iter()
                    .map(|&c| if c == Self::SLOT { '_' } else { c })
                    .collect(),
            )
        })
    }
}

/// Currency amount with a symbol and grouped thousands, `$1,234.50`.
///
/// The raw form is digits with an optional decimal point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyFormatter {
    symbol: String,
    group_separator: char,
    decimal_separator: char,
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self {
            symbol: String::from("$"),
            group_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl CurrencyFormatter {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_separators(mut self, group: char, decimal: char) -> Self {
        self.group_separator = group;
        self.decimal_separator = decimal;
        self
    }
}

impl Formatter for CurrencyFormatter {
    fn format(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (raw, None),
        };
        let digits: Vec<char> = int_part.chars().collect();
        let mut out = self.symbol.clone();
        for (i, ch) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(*ch);
        }
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }

    fn unformat(&self, display: &str) -> String {
        let body = display.strip_prefix(self.symbol.as_str()).unwrap_or(display);
        body.chars()
            .filter(|&c| c != self.group_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect()
    }

    fn placeholder(&self) -> Option<String> {
        Some(format!("{}0{}00", self.symbol, self.decimal_separator))
    }

    fn display_index(&self, raw: &str, raw_index: usize) -> usize {
        // The decimal separator may differ from the raw '.', so map it explicitly.
        let display = self.format(raw);
        if raw_index == 0 {
            return 0;
        }
        let mut raw_chars = raw.chars();
        let mut next = raw_chars.next();
        let mut consumed = 0;
        for (i, ch) in display.chars().enumerate() {
            let matches = match next {
                Some('.') => ch == self.decimal_separator,
                Some(r) => ch == r,
                None => false,
            };
            if i >= self.symbol.chars().count() && matches {
                consumed += 1;
                next = raw_chars.next();
                if consumed == raw_index {
                    return i + 1;
                }
            }
        }
        display.chars().count()
    }

    fn raw_index(&self, raw: &str, display_index: usize) -> usize {
        let display: String = self.format(raw).chars().take(display_index).collect();
        self.unformat(&display).chars().count().min(raw.chars().count())
    }
}

type FormatFn = Box<dyn Fn(&str) -> String>;

/// Formatter built from a pair of closures.
pub struct FnFormatter {
    format: FormatFn,
    unformat: FormatFn,
    placeholder: Option<String>,
}

impl fmt::Debug for FnFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFormatter")
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl FnFormatter {
    pub fn new<F, U>(format: F, unformat: U) -> Self
    where
        F: Fn(&str) -> String + 'static,
        U: Fn(&str) -> String + 'static,
    {
        Self {
            format: Box::new(format),
            unformat: Box::new(unformat),
            placeholder: None,
        }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

impl Formatter for FnFormatter {
    fn format(&self, raw: &str) -> String {
        (self.format)(raw)
    }

    fn unformat(&self, display: &str) -> String {
        (self.unformat)(display)
    }

    fn placeholder(&self) -> Option<String> {
        self.placeholder.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_pattern() {
        let f = PatternFormatter::phone();
        assert_eq!(f.format("5551234567"), "(555) 123-4567");
        assert_eq!(f.format("555"), "(555");
        assert_eq!(f.format("5551"), "(555) 1");
        assert_eq!(f.format(""), "");
        assert_eq!(f.unformat("(555) 123-4567"), "5551234567");
        assert_eq!(f.slots(), 10);
        assert_eq!(f.placeholder().as_deref(), Some("(___) ___-____"));
    }

    #[test]
    fn test_pattern_index_mapping() {
        let f = PatternFormatter::phone();
        let raw = "5551234567";
        assert_eq!(f.display_index(raw, 0), 0);
        assert_eq!(f.display_index(raw, 3), 4);
        assert_eq!(f.display_index(raw, 4), 7);
        assert_eq!(f.display_index(raw, 10), 14);
        assert_eq!(f.raw_index(raw, 7), 4);
        assert_eq!(f.raw_index(raw, 5), 3);
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(PatternFormatter::date().format("20240315"), "2024-03-15");
        assert_eq!(PatternFormatter::time().format("0930"), "09:30");
        assert_eq!(PatternFormatter::date_time().format("202403150930"), "2024-03-15 09:30");
        assert_eq!(PatternFormatter::date_time().unformat("2024-03-15 09:30"), "202403150930");
    }

    #[test]
    fn test_currency() {
        let f = CurrencyFormatter::default();
        assert_eq!(f.format("1234.5"), "$1,234.5");
        assert_eq!(f.format("1234567"), "$1,234,567");
        assert_eq!(f.format("12"), "$12");
        assert_eq!(f.unformat("$1,234.50"), "1234.50");
        assert_eq!(f.display_index("1234", 1), 2);
        assert_eq!(f.display_index("1234", 2), 4);
        assert_eq!(f.raw_index("1234", 4), 2);

        let eu = CurrencyFormatter::new("€").with_separators('.', ',');
        assert_eq!(eu.format("1234.5"), "€1.234,5");
        assert_eq!(eu.unformat("€1.234,5"), "1234.5");
        assert_eq!(eu.display_index("1234.5", 5), 7);
    }

    #[test]
    fn test_password_masks_code_points() {
        let f = PasswordFormatter::default();
        assert_eq!(f.format("secret"), "******");
        assert_eq!(f.format("héllo"), "*****");
        assert_eq!(f.display_index("secret", 4), 4);
    }

    #[test]
    fn test_fn_formatter() {
        let f = FnFormatter::new(str::to_uppercase, str::to_lowercase).with_placeholder("NAME");
        assert_eq!(f.format("abc"), "ABC");
        assert_eq!(f.unformat("ABC"), "abc");
        assert_eq!(f.placeholder().as_deref(), Some("NAME"));
    }
}
