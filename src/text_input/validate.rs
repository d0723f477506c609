//! Validation rules over the raw text of an input.

use std::fmt;
use std::rc::Rc;

use crate::color::Color;

/// Verdict of a validation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValidationState {
    #[default]
    Valid,
    Warning,
    Invalid,
}

impl ValidationState {
    /// Pick the border color for this state.
    #[must_use]
    pub fn border_color(self, valid: Color, warning: Color, invalid: Color) -> Color {
        match self {
            Self::Valid => valid,
            Self::Warning => warning,
            Self::Invalid => invalid,
        }
    }
}

/// Outcome of [`Validator::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub state: ValidationState,
    /// Name of the failing rule.
    pub rule: Option<String>,
    pub message: String,
}

impl ValidationResult {
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state == ValidationState::Valid
    }

    fn failed(rule: &ValidationRule) -> Self {
        Self {
            state: rule.severity,
            rule: Some(rule.name.clone()),
            message: rule.message.clone(),
        }
    }
}

type Predicate = Rc<dyn Fn(&str) -> bool>;

/// A named predicate over the raw text.
///
/// Non-required rules pass on empty text; required rules always run.
#[derive(Clone)]
pub struct ValidationRule {
    name: String,
    predicate: Predicate,
    message: String,
    required: bool,
    priority: i32,
    severity: ValidationState,
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("required", &self.required)
            .field("priority", &self.priority)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl ValidationRule {
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        Self {
            name: name.into(),
            predicate: Rc::new(predicate),
            message: message.into(),
            required: false,
            priority: 0,
            severity: ValidationState::Invalid,
        }
    }

    /// Higher priorities run first.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Also evaluate the rule on empty text.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Report failures as warnings instead of errors.
    #[must_use]
    pub fn as_warning(mut self) -> Self {
        self.severity = ValidationState::Warning;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn check(&self, text: &str) -> bool {
        if text.is_empty() && !self.required {
            return true;
        }
        (self.predicate)(text)
    }
}

/// Priority-ordered rule list.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    rules: Vec<ValidationRule>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.add_rule(rule);
        self
    }

    /// Insert keeping descending priority; equal priorities keep insertion order.
    pub fn add_rule(&mut self, rule: ValidationRule) {
        let at = self.rules.partition_point(|r| r.priority >= rule.priority);
        self.rules.insert(at, rule);
    }

    /// Remove every rule named `name`. Returns how many were removed.
    pub fn remove_rule(&mut self, name: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        before - self.rules.len()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    #[must_use]
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First failing rule's result, or valid.
    #[must_use]
    pub fn validate(&self, text: &str) -> ValidationResult {
        self.rules
            .iter()
            .find(|r| !r.check(text))
            .map_or_else(ValidationResult::valid, ValidationResult::failed)
    }
}

/// Stock rules used by the input type presets.
pub mod rules {
    use super::ValidationRule;

    pub fn required() -> ValidationRule {
        ValidationRule::new("required", "This field is required", |t| !t.trim().is_empty())
            .required()
            .with_priority(100)
    }

    pub fn min_length(min: usize) -> ValidationRule {
        ValidationRule::new("min_length", format!("Enter at least {min} characters"), move |t| {
            t.chars().count() >= min
        })
    }

    pub fn max_length(max: usize) -> ValidationRule {
        ValidationRule::new("max_length", format!("Enter at most {max} characters"), move |t| {
            t.chars().count() <= max
        })
    }

    pub fn email() -> ValidationRule {
        ValidationRule::new("email", "Enter a valid email address", is_email)
    }

    pub fn url() -> ValidationRule {
        ValidationRule::new("url", "Enter a valid URL", is_url)
    }

    pub fn integer() -> ValidationRule {
        ValidationRule::new("integer", "Enter a whole number", |t| t.parse::<i64>().is_ok())
    }

    pub fn number() -> ValidationRule {
        ValidationRule::new("number", "Enter a number", |t| {
            t.parse::<f64>().is_ok_and(f64::is_finite)
        })
    }

    /// Plain decimal notation: optional sign, digits, at most one point.
    pub fn decimal() -> ValidationRule {
        ValidationRule::new("decimal", "Enter a decimal number", is_decimal)
    }

    /// Decimal with at most two fraction digits and no sign.
    pub fn currency() -> ValidationRule {
        ValidationRule::new("currency", "Enter an amount", |t| {
            let frac_ok = t.split_once('.').is_none_or(|(_, f)| f.len() <= 2);
            !t.starts_with('-') && is_decimal(t) && frac_ok
        })
    }

    pub fn phone(digits: usize) -> ValidationRule {
        ValidationRule::new("phone", format!("Enter a {digits}-digit phone number"), move |t| {
            t.len() == digits && t.bytes().all(|b| b.is_ascii_digit())
        })
    }

    /// Raw `YYYYMMDD`.
    pub fn date() -> ValidationRule {
        ValidationRule::new("date", "Enter a valid date", is_date)
    }

    /// Raw `HHMM`, 24-hour.
    pub fn time() -> ValidationRule {
        ValidationRule::new("time", "Enter a valid time", is_time)
    }

    /// Raw `YYYYMMDDHHMM`.
    pub fn date_time() -> ValidationRule {
        ValidationRule::new("date_time", "Enter a valid date and time", |t| {
            t.len() == 12 && t.is_ascii() && is_date(&t[..8]) && is_time(&t[8..])
        })
    }

    fn digits(t: &str) -> Option<u32> {
        if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        t.parse().ok()
    }

    fn is_decimal(t: &str) -> bool {
        let body = t.strip_prefix('-').unwrap_or(t);
        let mut points = 0;
        let mut digit_count = 0;
        for c in body.chars() {
            match c {
                '.' => points += 1,
                c if c.is_ascii_digit() => digit_count += 1,
                _ => return false,
            }
        }
        points <= 1 && digit_count > 0
    }

    fn is_date(t: &str) -> bool {
        if t.len() != 8 || !t.is_ascii() {
            return false;
        }
        let (Some(year), Some(month), Some(day)) = (digits(&t[..4]), digits(&t[4..6]), digits(&t[6..])) else {
            return false;
        };
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        let days = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if leap => 29,
            2 => 28,
            _ => return false,
        };
        (1..=days).contains(&day)
    }

    fn is_time(t: &str) -> bool {
        if t.len() != 4 || !t.is_ascii() {
            return false;
        }
        matches!((digits(&t[..2]), digits(&t[2..])), (Some(h), Some(m)) if h < 24 && m < 60)
    }

    fn is_email(t: &str) -> bool {
        let Some((local, domain)) = t.split_once('@') else {
            return false;
        };
        let Some((host, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        !local.is_empty()
            && !host.is_empty()
            && tld.len() >= 2
            && !domain.contains('@')
            && !t.chars().any(char::is_whitespace)
    }

    fn is_url(t: &str) -> bool {
        let rest = t
            .strip_prefix("https://")
            .or_else(|| t.strip_prefix("http://"));
        match rest {
            Some(rest) => {
                let host = rest.split(['/', '?', '#']).next().unwrap_or("");
                !host.is_empty() && !t.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }
}
