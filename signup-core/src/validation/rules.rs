//! Individual field checks.
//!
//! A [`FieldRule`] pairs one [`Check`] with the message shown when it fails.
//! Every check is a pure function of the whole record, so cross-field checks
//! read their sibling fields from the same record.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::report::{ErrorKind, ValidationError};
use crate::model::{Field, FieldSet, Registration};

/// A conjunction of regular expressions.
///
/// Stands in for look-ahead patterns such as "contains a digit and an
/// uppercase letter", which the `regex` crate does not support.
#[derive(Debug)]
pub struct Pattern {
    description: &'static str,
    all_of: Vec<Regex>,
}

impl Pattern {
    fn new(description: &'static str, sources: &[&str]) -> Self {
        let all_of = sources
            .iter()
            .map(|source| Regex::new(source).expect("built-in pattern must compile"))
            .collect();
        Self {
            description,
            all_of,
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.all_of.iter().all(|regex| regex.is_match(value))
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Letters, digits and underscores only.
pub static USERNAME_PATTERN: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new("username charset", &[r"^[a-zA-Z0-9_]+$"]));

/// At least one lowercase, uppercase, digit and special character, starting
/// with one of the allowed characters.
pub static PASSWORD_PATTERN: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(
        "password complexity",
        &[
            r"^[A-Za-z0-9@$!%*?&]",
            r"[a-z]",
            r"[A-Z]",
            r"[0-9]",
            r"[@$!%*?&]",
        ],
    )
});

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"#,
    )
    .expect("EMAIL_REGEX: invalid regex pattern")
});

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

/// Check email address syntax.
pub fn is_valid_email(value: &str) -> bool {
    let local_len = value.find('@').unwrap_or(value.len());
    value.len() <= MAX_EMAIL_LENGTH
        && local_len <= MAX_EMAIL_LOCAL_LENGTH
        && EMAIL_REGEX.is_match(value)
}

/// Predicate for a cross-field check. Returns `true` when the record passes.
pub type CrossFieldTest = Arc<dyn Fn(&Registration) -> bool + Send + Sync>;

/// What a rule verifies.
#[derive(Clone)]
pub enum Check {
    /// The field is not its zero value.
    Required,
    /// Text has at least this many characters.
    MinLength(usize),
    /// Text has at most this many characters.
    MaxLength(usize),
    /// Text matches the pattern.
    Pattern(&'static Pattern),
    /// Integer is at least this value.
    Min(i64),
    /// Integer is at most this value.
    Max(i64),
    /// Text is a syntactically valid email address.
    Email,
    /// Arbitrary predicate over the record. `reads` lists every field the
    /// predicate looks at.
    CrossField {
        kind: ErrorKind,
        reads: FieldSet,
        test: CrossFieldTest,
    },
}

impl Check {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Check::Required => ErrorKind::Required,
            Check::MinLength(_) => ErrorKind::MinLength,
            Check::MaxLength(_) => ErrorKind::MaxLength,
            Check::Pattern(_) => ErrorKind::Pattern,
            Check::Min(_) => ErrorKind::Min,
            Check::Max(_) => ErrorKind::Max,
            Check::Email => ErrorKind::Email,
            Check::CrossField { kind, .. } => *kind,
        }
    }

    /// Fields this check reads when attached to `field`.
    pub fn reads(&self, field: Field) -> FieldSet {
        match self {
            Check::CrossField { reads, .. } => *reads,
            _ => [field].into_iter().collect(),
        }
    }

    /// Format checks say nothing about an empty value; presence covers it.
    fn skips_empty(&self) -> bool {
        !matches!(self, Check::Required | Check::CrossField { .. })
    }

    fn passes(&self, field: Field, record: &Registration) -> bool {
        let text = record.text(field);
        let integer = record.integer(field);

        match self {
            Check::Required => !record.is_empty(field),
            Check::MinLength(min) => text.map_or(true, |t| t.chars().count() >= *min),
            Check::MaxLength(max) => text.map_or(true, |t| t.chars().count() <= *max),
            Check::Pattern(pattern) => text.map_or(true, |t| pattern.is_match(t)),
            Check::Min(min) => integer.map_or(true, |n| n >= *min),
            Check::Max(max) => integer.map_or(true, |n| n <= *max),
            Check::Email => text.map_or(true, is_valid_email),
            Check::CrossField { test, .. } => test(record),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Required => f.write_str("Required"),
            Check::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Check::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Check::Pattern(p) => f.debug_tuple("Pattern").field(&p.description()).finish(),
            Check::Min(n) => f.debug_tuple("Min").field(n).finish(),
            Check::Max(n) => f.debug_tuple("Max").field(n).finish(),
            Check::Email => f.write_str("Email"),
            Check::CrossField { kind, reads, .. } => f
                .debug_struct("CrossField")
                .field("kind", kind)
                .field("reads", reads)
                .finish(),
        }
    }
}

/// One check attached to a field, with its failure message.
#[derive(Debug, Clone)]
pub struct FieldRule {
    check: Check,
    message: Cow<'static, str>,
}

impl FieldRule {
    pub fn new(check: Check, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run the check for `field` against `record`.
    pub fn evaluate(&self, field: Field, record: &Registration) -> Option<ValidationError> {
        if self.check.skips_empty() && record.is_empty(field) {
            return None;
        }
        if self.check.passes(field, record) {
            None
        } else {
            Some(ValidationError::new(self.check.kind(), self.message.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_username(name: &str) -> Registration {
        Registration {
            username: name.to_string(),
            ..Registration::empty()
        }
    }

    #[test]
    fn username_pattern_allows_word_characters_only() {
        assert!(USERNAME_PATTERN.is_match("john_doe_42"));
        assert!(!USERNAME_PATTERN.is_match("john.doe"));
        assert!(!USERNAME_PATTERN.is_match("john doe"));
        assert!(!USERNAME_PATTERN.is_match("jöhn"));
    }

    #[test]
    fn password_pattern_needs_every_character_class() {
        assert!(PASSWORD_PATTERN.is_match("SecurePass123!"));
        assert!(!PASSWORD_PATTERN.is_match("securepass123!"));
        assert!(!PASSWORD_PATTERN.is_match("SECUREPASS123!"));
        assert!(!PASSWORD_PATTERN.is_match("SecurePass!!!"));
        assert!(!PASSWORD_PATTERN.is_match("SecurePass123"));
        // The first character must come from the allowed set.
        assert!(!PASSWORD_PATTERN.is_match(" SecurePass123!"));
        assert!(PASSWORD_PATTERN.is_match("Secure Pass123!"));
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(is_valid_email("a+tag@sub.example.co"));
        assert!(is_valid_email("user@localhost"));
        assert!(!is_valid_email("john.doe"));
        assert!(!is_valid_email("john@@example.com"));
        assert!(!is_valid_email("john@-example.com"));
        assert!(!is_valid_email(".john@example.com"));
        assert!(!is_valid_email("john@example..com"));

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(!is_valid_email(&long_local));

        // Three 63-character labels plus ".com" make a 195-character domain.
        let domain = format!("{}.com", vec!["d".repeat(63); 3].join("."));
        let at_limit = format!("{}@{domain}", "j".repeat(58));
        let over_limit = format!("{}@{domain}", "j".repeat(59));
        assert_eq!(at_limit.len(), 254);
        assert!(is_valid_email(&at_limit));
        assert_eq!(over_limit.len(), 255);
        assert!(!is_valid_email(&over_limit));
    }

    #[test]
    fn format_checks_skip_empty_values() {
        let rule = FieldRule::new(Check::MinLength(3), "too short");
        assert_eq!(rule.evaluate(Field::Username, &with_username("")), None);

        let error = rule.evaluate(Field::Username, &with_username("jo")).unwrap();
        assert_eq!(error.kind, ErrorKind::MinLength);
        assert_eq!(error.message, "too short");
    }

    #[test]
    fn required_fails_on_zero_values() {
        let rule = FieldRule::new(Check::Required, "Age is required");
        let error = rule.evaluate(Field::Age, &Registration::empty()).unwrap();
        assert_eq!(error.kind, ErrorKind::Required);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let rule = FieldRule::new(Check::MaxLength(3), "too long");
        let record = Registration {
            first_name: "Zoë".to_string(),
            ..Registration::empty()
        };
        assert_eq!(rule.evaluate(Field::FirstName, &record), None);
    }

    #[test]
    fn cross_field_checks_run_on_empty_values() {
        let rule = FieldRule::new(
            Check::CrossField {
                kind: ErrorKind::TermsRequired,
                reads: [Field::AgreeToTerms].into_iter().collect(),
                test: Arc::new(|r: &Registration| r.agree_to_terms),
            },
            "You must agree to the terms and conditions",
        );
        let error = rule
            .evaluate(Field::AgreeToTerms, &Registration::empty())
            .unwrap();
        assert_eq!(error.kind, ErrorKind::TermsRequired);
    }

    #[test]
    fn reads_cover_the_field_or_the_declared_inputs() {
        assert_eq!(
            Check::MinLength(3).reads(Field::Username).iter().collect::<Vec<_>>(),
            vec![Field::Username]
        );

        let matches = Check::CrossField {
            kind: ErrorKind::PasswordMismatch,
            reads: [Field::Password, Field::ConfirmPassword].into_iter().collect(),
            test: Arc::new(|r: &Registration| r.password == r.confirm_password),
        };
        assert_eq!(
            matches.reads(Field::ConfirmPassword).iter().collect::<Vec<_>>(),
            vec![Field::Password, Field::ConfirmPassword]
        );
    }
}
