//! The validation schema: field -> ordered rules.
//!
//! All rules of a field run on every evaluation. Order only decides which
//! message comes first.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use indexmap::IndexMap;

use super::report::{ErrorKind, ValidationError, ValidationReport};
use super::rules::{Check, FieldRule, PASSWORD_PATTERN, USERNAME_PATTERN};
use crate::config::FormConfig;
use crate::model::{Field, FieldSet, Registration};

/// A table of rules keyed by field.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: IndexMap<Field, Vec<FieldRule>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The standard registration schema.
    pub fn registration() -> Self {
        Self::from_config(&FormConfig::default())
    }

    /// The registration schema plus whichever optional rules `config` enables.
    pub fn from_config(config: &FormConfig) -> Self {
        let mut builder = Schema::builder()
            .required(Field::FirstName, "First name is required")
            .min_length(Field::FirstName, 2, "First name must be at least 2 characters")
            .max_length(Field::FirstName, 50, "First name must not exceed 50 characters")
            .required(Field::LastName, "Last name is required")
            .min_length(Field::LastName, 2, "Last name must be at least 2 characters")
            .max_length(Field::LastName, 50, "Last name must not exceed 50 characters")
            .required(Field::Username, "Username is required")
            .min_length(Field::Username, 3, "Username must be at least 3 characters")
            .max_length(Field::Username, 20, "Username must not exceed 20 characters")
            .pattern(
                Field::Username,
                &USERNAME_PATTERN,
                "Username can only contain letters, numbers, and underscores",
            )
            .required(Field::Email, "Email is required")
            .email(Field::Email, "Please enter a valid email address")
            .required(Field::Age, "Age is required")
            .min(Field::Age, 18, "You must be at least 18 years old")
            .max(Field::Age, 120, "Please enter a valid age")
            .required(Field::Birthdate, "Birthdate is required");

        if let Some(minimum_age) = config.birthdate_minimum_age {
            let reference = config.reference_date;
            builder = builder
                .validate(
                    Field::Birthdate,
                    ErrorKind::Future,
                    "Birthdate cannot be in the future",
                    &[Field::Birthdate],
                    move |r| birthdate_not_in_future(r, reference),
                )
                .validate(
                    Field::Birthdate,
                    ErrorKind::Age,
                    format!("You must be at least {minimum_age} years old"),
                    &[Field::Birthdate],
                    move |r| birthdate_meets_minimum_age(r, minimum_age, reference),
                );
        }

        builder = builder
            .required(Field::PreferredTime, "Preferred time is required")
            .required(Field::Bio, "Bio is required")
            .min_length(Field::Bio, 10, "Bio must be at least 10 characters")
            .max_length(Field::Bio, 500, "Bio must not exceed 500 characters")
            .required(Field::Password, "Password is required")
            .min_length(Field::Password, 8, "Password must be at least 8 characters")
            .pattern(
                Field::Password,
                &PASSWORD_PATTERN,
                "Password must contain uppercase, lowercase, number, and special character",
            )
            .required(Field::ConfirmPassword, "Please confirm your password");

        if config.confirm_password_match {
            builder = builder.validate(
                Field::ConfirmPassword,
                ErrorKind::PasswordMismatch,
                "Passwords do not match",
                &[Field::Password, Field::ConfirmPassword],
                passwords_match,
            );
        }

        builder
            .validate(
                Field::EmailNotifications,
                ErrorKind::NoNotification,
                "Please select at least one notification method",
                &[
                    Field::EmailNotifications,
                    Field::SmsNotifications,
                    Field::PushNotifications,
                ],
                any_notification_enabled,
            )
            .validate(
                Field::AgreeToTerms,
                ErrorKind::TermsRequired,
                "You must agree to the terms and conditions",
                &[Field::AgreeToTerms],
                |r| r.agree_to_terms,
            )
            .required(Field::SubscriptionPlan, "Please select a subscription plan")
            .required(Field::Country, "Please select your country")
            .build()
    }

    pub fn rules_for(&self, field: Field) -> &[FieldRule] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fields the rules of `field` read.
    pub fn inputs(&self, field: Field) -> FieldSet {
        self.rules_for(field)
            .iter()
            .fold(FieldSet::empty(), |inputs, rule| inputs.union(&rule.check().reads(field)))
    }

    /// Every rule of `field` that fails for `record`, in rule order.
    pub fn validate_field(&self, field: Field, record: &Registration) -> Vec<ValidationError> {
        self.rules_for(field)
            .iter()
            .filter_map(|rule| rule.evaluate(field, record))
            .collect()
    }

    pub fn validate(&self, record: &Registration) -> ValidationReport {
        let mut report = ValidationReport::new();
        for field in Field::ALL {
            report.insert(field, self.validate_field(field, record));
        }
        report
    }

    pub fn is_valid(&self, record: &Registration) -> bool {
        Field::ALL.into_iter().all(|field| {
            self.rules_for(field)
                .iter()
                .all(|rule| rule.evaluate(field, record).is_none())
        })
    }
}

/// Declarative schema construction, one call per rule.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    rules: IndexMap<Field, Vec<FieldRule>>,
}

impl SchemaBuilder {
    pub fn rule(mut self, field: Field, rule: FieldRule) -> Self {
        self.rules.entry(field).or_default().push(rule);
        self
    }

    pub fn required(self, field: Field, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule(field, FieldRule::new(Check::Required, message))
    }

    pub fn min_length(self, field: Field, min: usize, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule(field, FieldRule::new(Check::MinLength(min), message))
    }

    pub fn max_length(self, field: Field, max: usize, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule(field, FieldRule::new(Check::MaxLength(max), message))
    }

    pub fn pattern(
        self,
        field: Field,
        pattern: &'static super::rules::Pattern,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.rule(field, FieldRule::new(Check::Pattern(pattern), message))
    }

    pub fn min(self, field: Field, min: i64, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule(field, FieldRule::new(Check::Min(min), message))
    }

    pub fn max(self, field: Field, max: i64, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule(field, FieldRule::new(Check::Max(max), message))
    }

    pub fn email(self, field: Field, message: impl Into<Cow<'static, str>>) -> Self {
        self.rule(field, FieldRule::new(Check::Email, message))
    }

    /// Attach a custom predicate. It runs even when the field is empty.
    ///
    /// `reads` must name every field `test` looks at: the form controller
    /// re-runs the rule only when one of them changes.
    pub fn validate<F>(
        self,
        field: Field,
        kind: ErrorKind,
        message: impl Into<Cow<'static, str>>,
        reads: &[Field],
        test: F,
    ) -> Self
    where
        F: Fn(&Registration) -> bool + Send + Sync + 'static,
    {
        let check = Check::CrossField {
            kind,
            reads: reads.iter().copied().collect(),
            test: Arc::new(test),
        };
        self.rule(field, FieldRule::new(check, message))
    }

    pub fn build(self) -> Schema {
        Schema { rules: self.rules }
    }
}

/// At least one notification channel is selected.
pub fn any_notification_enabled(record: &Registration) -> bool {
    record.email_notifications || record.sms_notifications || record.push_notifications
}

pub fn passwords_match(record: &Registration) -> bool {
    record.confirm_password == record.password
}

fn parse_birthdate(record: &Registration) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&record.birthdate, "%Y-%m-%d").ok()
}

fn reference_or_today(reference: Option<NaiveDate>) -> NaiveDate {
    reference.unwrap_or_else(|| Local::now().date_naive())
}

/// Unparseable or missing birthdates pass; presence is checked separately.
pub fn birthdate_not_in_future(record: &Registration, reference: Option<NaiveDate>) -> bool {
    parse_birthdate(record).map_or(true, |born| born <= reference_or_today(reference))
}

/// Age is the calendar-year difference. Future dates are left to
/// [`birthdate_not_in_future`].
pub fn birthdate_meets_minimum_age(
    record: &Registration,
    minimum_age: u32,
    reference: Option<NaiveDate>,
) -> bool {
    let today = reference_or_today(reference);
    parse_birthdate(record).map_or(true, |born| {
        born > today || i64::from(today.year() - born.year()) >= i64::from(minimum_age)
    })
}
