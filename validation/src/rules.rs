use chrono::NaiveDateTime;
use serde_json::Value;

pub(crate) const REQUIRED: &str = "This field is required";
pub(crate) const TOO_SHORT: &str = "Value is too short";
pub(crate) const TOO_LONG: &str = "Value is too long";
pub(crate) const NOT_POSITIVE: &str = "Must be greater than 0";
pub(crate) const INVALID_EMAIL: &str = "Must be a valid email address";
pub(crate) const INVALID_TYPE: &str = "Invalid type";
pub(crate) const INVALID_VALUE: &str = "Invalid value";

/// Expected textual layout of a date/time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLayout {
    /// chrono format string used for parsing
    pub pattern: &'static str,
    /// Human-readable form quoted back to the client
    pub label: &'static str,
}

impl DateLayout {
    pub const fn new(pattern: &'static str, label: &'static str) -> Self {
        Self { pattern, label }
    }

    /// Parse a literal in this layout.
    ///
    /// The literal must match the layout character for character: chrono
    /// alone accepts unpadded fields and signed years.
    pub fn parse(&self, literal: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(literal, self.pattern)
            .ok()
            .filter(|parsed| parsed.format(self.pattern).to_string() == literal)
    }

    /// Message emitted when a literal violates this layout.
    pub fn message(&self) -> String {
        format!("Invalid datetime format. Expected: {}", self.label)
    }
}

/// JSON shape a declared field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// String holding a date/time in the given layout
    Timestamp(DateLayout),
}

impl FieldKind {
    pub(crate) fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text | FieldKind::Timestamp(_) => value.is_string(),
            FieldKind::Number => value.is_number(),
        }
    }
}

/// Declared constraint on a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Present, non-null, and not an empty string
    Required,
    /// Minimum length in characters
    MinLength(usize),
    /// Maximum length in characters
    MaxLength(usize),
    /// Inclusive numeric lower bound
    Min(f64),
    /// Inclusive numeric upper bound
    Max(f64),
    /// Strictly greater than zero
    Positive,
    Email,
    DateFormat(DateLayout),
    /// Value must be one of the listed strings
    OneOf(&'static [&'static str]),
}

impl Constraint {
    /// Check a present value, returning the canned message on violation.
    ///
    /// Absent values are handled by the caller; only `Required` looks at them.
    pub(crate) fn check(&self, value: &Value) -> Option<String> {
        let violated = match self {
            Constraint::Required => false,
            Constraint::MinLength(min) => value
                .as_str()
                .is_some_and(|s| s.chars().count() < *min),
            Constraint::MaxLength(max) => value
                .as_str()
                .is_some_and(|s| s.chars().count() > *max),
            Constraint::Min(min) => value.as_f64().is_some_and(|n| n < *min),
            Constraint::Max(max) => value.as_f64().is_some_and(|n| n > *max),
            Constraint::Positive => value.as_f64().is_some_and(|n| n <= 0.0),
            Constraint::Email => value
                .as_str()
                .is_some_and(|s| !email_address::EmailAddress::is_valid(s)),
            Constraint::DateFormat(layout) => {
                value.as_str().is_some_and(|s| layout.parse(s).is_none())
            }
            Constraint::OneOf(allowed) => value.as_str().is_some_and(|s| !allowed.contains(&s)),
        };

        violated.then(|| self.message())
    }

    /// Canned client-facing message for this constraint kind.
    pub fn message(&self) -> String {
        match self {
            Constraint::Required => REQUIRED.to_string(),
            Constraint::MinLength(_) | Constraint::Min(_) => TOO_SHORT.to_string(),
            Constraint::MaxLength(_) | Constraint::Max(_) => TOO_LONG.to_string(),
            Constraint::Positive => NOT_POSITIVE.to_string(),
            Constraint::Email => INVALID_EMAIL.to_string(),
            Constraint::DateFormat(layout) => layout.message(),
            Constraint::OneOf(_) => INVALID_VALUE.to_string(),
        }
    }
}

/// One entry of an input type's field table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    /// JSON field name as sent by clients
    pub name: &'static str,
    pub kind: FieldKind,
    /// Checked in order; the first violation is reported
    pub constraints: &'static [Constraint],
}

impl FieldRule {
    pub const fn text(name: &'static str, constraints: &'static [Constraint]) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            constraints,
        }
    }

    pub const fn number(name: &'static str, constraints: &'static [Constraint]) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            constraints,
        }
    }

    pub const fn timestamp(
        name: &'static str,
        layout: DateLayout,
        constraints: &'static [Constraint],
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Timestamp(layout),
            constraints,
        }
    }

    pub fn is_required(&self) -> bool {
        self.constraints.contains(&Constraint::Required)
    }
}
