//! Table-driven validation.
//!
//! A [`Schema`] maps each field to an ordered list of [`FieldRule`]s. Each
//! rule is a pure function of the whole record, so the same schema can be
//! evaluated directly or wrapped in memos by the form controller.
//!
//! Failures are data: a failing rule yields a [`ValidationError`] attached
//! to its field, never an `Err`.

mod report;
mod rules;
mod schema;

pub use report::{ErrorKind, ValidationError, ValidationReport};
pub use rules::{is_valid_email, Check, CrossFieldTest, FieldRule, Pattern, PASSWORD_PATTERN, USERNAME_PATTERN};
pub use schema::{
    any_notification_enabled, birthdate_meets_minimum_age, birthdate_not_in_future, passwords_match, Schema,
    SchemaBuilder,
};
