//! The registration record and its field identities.
//!
//! The record is always fully populated. Empty states use the zero value of
//! each field's type: `""` for text, `0` for integers, `false` for flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FormError, FormResult};

/// One named slot of the registration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Username,
    Email,
    Age,
    Birthdate,
    PreferredTime,
    Bio,
    Password,
    ConfirmPassword,
    EmailNotifications,
    SmsNotifications,
    PushNotifications,
    AgreeToTerms,
    SubscriptionPlan,
    Country,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 16] = [
        Field::FirstName,
        Field::LastName,
        Field::Username,
        Field::Email,
        Field::Age,
        Field::Birthdate,
        Field::PreferredTime,
        Field::Bio,
        Field::Password,
        Field::ConfirmPassword,
        Field::EmailNotifications,
        Field::SmsNotifications,
        Field::PushNotifications,
        Field::AgreeToTerms,
        Field::SubscriptionPlan,
        Field::Country,
    ];

    /// The camelCase name used on the wire and in the Python binding.
    pub const fn name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Username => "username",
            Field::Email => "email",
            Field::Age => "age",
            Field::Birthdate => "birthdate",
            Field::PreferredTime => "preferredTime",
            Field::Bio => "bio",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::EmailNotifications => "emailNotifications",
            Field::SmsNotifications => "smsNotifications",
            Field::PushNotifications => "pushNotifications",
            Field::AgreeToTerms => "agreeToTerms",
            Field::SubscriptionPlan => "subscriptionPlan",
            Field::Country => "country",
        }
    }

    /// The kind of value this field stores.
    pub const fn kind(self) -> ValueKind {
        match self {
            Field::Age => ValueKind::Integer,
            Field::EmailNotifications
            | Field::SmsNotifications
            | Field::PushNotifications
            | Field::AgreeToTerms => ValueKind::Flag,
            _ => ValueKind::Text,
        }
    }

    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// The type of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Integer,
    Flag,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Flag => "boolean",
        })
    }
}

/// A dynamically typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Integer(_) => ValueKind::Integer,
            FieldValue::Flag(_) => ValueKind::Flag,
        }
    }

    /// Whether this is the zero value of its kind.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Integer(n) => *n == 0,
            FieldValue::Flag(flag) => !flag,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// A compact set of fields.
///
/// Used for touched flags and validity snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldSet(u32);

impl FieldSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Field::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    pub fn remove(&mut self, field: Field) {
        self.0 &= !field.bit();
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(&self, other: &FieldSet) -> FieldSet {
        FieldSet(self.0 | other.0)
    }

    /// Fields in exactly one of the two sets.
    pub fn symmetric_difference(&self, other: &FieldSet) -> FieldSet {
        FieldSet(self.0 ^ other.0)
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|field| self.contains(*field))
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut set = FieldSet::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

/// The registration form model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub age: i64,
    /// ISO date, `YYYY-MM-DD`.
    pub birthdate: String,
    /// Wall-clock time, `HH:MM`.
    pub preferred_time: String,
    pub bio: String,
    pub password: String,
    pub confirm_password: String,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub agree_to_terms: bool,
    pub subscription_plan: String,
    pub country: String,
}

impl Registration {
    /// The all-empty record a fresh form starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fully valid record used to demo the form.
    pub fn sample() -> Self {
        Self {
            first_name: "John".into(),
            last_name: "Doe".into(),
            username: "johndoe123".into(),
            email: "john.doe@example.com".into(),
            age: 25,
            birthdate: "1999-01-15".into(),
            preferred_time: "14:30".into(),
            bio: "I am a software developer passionate about web technologies and building amazing user experiences.".into(),
            password: "SecurePass123!".into(),
            confirm_password: "SecurePass123!".into(),
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            agree_to_terms: true,
            subscription_plan: "premium".into(),
            country: "us".into(),
        }
    }

    /// Borrow a text field. `None` for non-text fields.
    pub fn text(&self, field: Field) -> Option<&str> {
        let text = match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Username => &self.username,
            Field::Email => &self.email,
            Field::Birthdate => &self.birthdate,
            Field::PreferredTime => &self.preferred_time,
            Field::Bio => &self.bio,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
            Field::SubscriptionPlan => &self.subscription_plan,
            Field::Country => &self.country,
            _ => return None,
        };
        Some(text.as_str())
    }

    /// Read an integer field. `None` for non-integer fields.
    pub fn integer(&self, field: Field) -> Option<i64> {
        match field {
            Field::Age => Some(self.age),
            _ => None,
        }
    }

    /// Read a boolean field. `None` for non-boolean fields.
    pub fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::EmailNotifications => Some(self.email_notifications),
            Field::SmsNotifications => Some(self.sms_notifications),
            Field::PushNotifications => Some(self.push_notifications),
            Field::AgreeToTerms => Some(self.agree_to_terms),
            _ => None,
        }
    }

    /// Whether the field holds the zero value of its type.
    pub fn is_empty(&self, field: Field) -> bool {
        match field.kind() {
            ValueKind::Text => self.text(field).map_or(true, str::is_empty),
            ValueKind::Integer => self.integer(field) == Some(0),
            ValueKind::Flag => self.flag(field) == Some(false),
        }
    }

    /// Read any field as a dynamically typed value.
    pub fn get(&self, field: Field) -> FieldValue {
        match field.kind() {
            ValueKind::Text => FieldValue::Text(self.text(field).unwrap_or_default().to_string()),
            ValueKind::Integer => FieldValue::Integer(self.integer(field).unwrap_or_default()),
            ValueKind::Flag => FieldValue::Flag(self.flag(field).unwrap_or_default()),
        }
    }

    /// Write any field. The value kind must match the field.
    pub fn set(&mut self, field: Field, value: FieldValue) -> FormResult<()> {
        let mismatch = FormError::TypeMismatch {
            field,
            expected: field.kind(),
            found: value.kind(),
        };
        match value {
            FieldValue::Text(text) => *self.text_mut(field).ok_or(mismatch)? = text,
            FieldValue::Integer(n) => *self.integer_mut(field).ok_or(mismatch)? = n,
            FieldValue::Flag(flag) => *self.flag_mut(field).ok_or(mismatch)? = flag,
        }
        Ok(())
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let text = match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::Birthdate => &mut self.birthdate,
            Field::PreferredTime => &mut self.preferred_time,
            Field::Bio => &mut self.bio,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
            Field::SubscriptionPlan => &mut self.subscription_plan,
            Field::Country => &mut self.country,
            _ => return None,
        };
        Some(text)
    }

    fn integer_mut(&mut self, field: Field) -> Option<&mut i64> {
        match field {
            Field::Age => Some(&mut self.age),
            _ => None,
        }
    }

    fn flag_mut(&mut self, field: Field) -> Option<&mut bool> {
        match field {
            Field::EmailNotifications => Some(&mut self.email_notifications),
            Field::SmsNotifications => Some(&mut self.sms_notifications),
            Field::PushNotifications => Some(&mut self.push_notifications),
            Field::AgreeToTerms => Some(&mut self.agree_to_terms),
            _ => None,
        }
    }
}

/// One entry of the country select list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
}

/// Countries offered by the form. The first entry is the placeholder.
pub const COUNTRIES: [Country; 11] = [
    Country { code: "", name: "Select a country" },
    Country { code: "us", name: "United States" },
    Country { code: "ca", name: "Canada" },
    Country { code: "mx", name: "Mexico" },
    Country { code: "uk", name: "United Kingdom" },
    Country { code: "de", name: "Germany" },
    Country { code: "fr", name: "France" },
    Country { code: "es", name: "Spain" },
    Country { code: "it", name: "Italy" },
    Country { code: "jp", name: "Japan" },
    Country { code: "au", name: "Australia" },
];

/// Subscription plan identifiers offered by the form.
pub const SUBSCRIPTION_PLANS: [&str; 4] = ["free", "basic", "premium", "enterprise"];
