//! Validation error descriptors and aggregated reports.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Field;

/// What kind of constraint a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    Email,
    NoNotification,
    TermsRequired,
    PasswordMismatch,
    Age,
    Future,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::MinLength => "minLength",
            ErrorKind::MaxLength => "maxLength",
            ErrorKind::Pattern => "pattern",
            ErrorKind::Min => "min",
            ErrorKind::Max => "max",
            ErrorKind::Email => "email",
            ErrorKind::NoNotification => "noNotification",
            ErrorKind::TermsRequired => "termsRequired",
            ErrorKind::PasswordMismatch => "passwordMismatch",
            ErrorKind::Age => "age",
            ErrorKind::Future => "future",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: Cow<'static, str>,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors for every invalid field of a record, in schema order.
///
/// Valid fields have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: IndexMap<Field, Vec<ValidationError>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the errors of one field. An empty list leaves the field valid.
    pub fn insert(&mut self, field: Field, errors: Vec<ValidationError>) {
        if errors.is_empty() {
            self.errors.shift_remove(&field);
        } else {
            self.errors.insert(field, errors);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, field: Field) -> &[ValidationError] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_error(&self, field: Field, kind: ErrorKind) -> bool {
        self.errors_for(field).iter().any(|error| error.kind == kind)
    }

    pub fn invalid_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    /// Total number of errors across all fields.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[ValidationError])> {
        self.errors.iter().map(|(field, errors)| (*field, errors.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_in_camel_case() {
        let json = serde_json::to_string(&ErrorKind::NoNotification).unwrap();
        assert_eq!(json, "\"noNotification\"");
        assert_eq!(ErrorKind::MinLength.to_string(), "minLength");
    }

    #[test]
    fn report_only_keeps_failing_fields() {
        let mut report = ValidationReport::new();
        report.insert(Field::Bio, Vec::new());
        assert!(report.is_valid());

        report.insert(
            Field::Bio,
            vec![ValidationError::new(ErrorKind::Required, "Bio is required")],
        );
        assert!(!report.is_valid());
        assert!(report.has_error(Field::Bio, ErrorKind::Required));
        assert_eq!(report.error_count(), 1);
        assert!(report.errors_for(Field::Email).is_empty());

        report.insert(Field::Bio, Vec::new());
        assert!(report.is_valid());
    }

    #[test]
    fn report_serializes_as_field_map() {
        let mut report = ValidationReport::new();
        report.insert(
            Field::AgreeToTerms,
            vec![ValidationError::new(
                ErrorKind::TermsRequired,
                "You must agree to the terms and conditions",
            )],
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["agreeToTerms"][0]["kind"], "termsRequired");
    }
}
