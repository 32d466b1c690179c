//! Form configuration.
//!
//! Controls the optional cross-field rules. Everything defaults to off, which
//! gives the standard registration schema.
//!
//! ```json
//! {
//!   "confirm_password_match": true,
//!   "birthdate_minimum_age": 18,
//!   "reference_date": "2024-06-01"
//! }
//! ```

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FormResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Require `confirmPassword` to equal `password`.
    pub confirm_password_match: bool,

    /// Reject birthdates less than this many calendar years before the
    /// reference date, and birthdates after it.
    pub birthdate_minimum_age: Option<u32>,

    /// Date the birthdate rule measures against. Today (local time) if unset.
    pub reference_date: Option<NaiveDate>,
}

impl FormConfig {
    /// Enable every optional rule with an 18-year minimum age.
    pub fn strict() -> Self {
        Self {
            confirm_password_match: true,
            birthdate_minimum_age: Some(18),
            reference_date: None,
        }
    }

    pub fn from_json(text: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> FormResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;

    #[test]
    fn empty_document_gives_defaults() {
        let config = FormConfig::from_json("{}").unwrap();
        assert_eq!(config, FormConfig::default());
        assert!(!config.confirm_password_match);
    }

    #[test]
    fn parses_every_option() {
        let config = FormConfig::from_json(
            r#"{"confirm_password_match": true, "birthdate_minimum_age": 21, "reference_date": "2024-06-01"}"#,
        )
        .unwrap();

        assert!(config.confirm_password_match);
        assert_eq!(config.birthdate_minimum_age, Some(21));
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FormConfig::from_json(r#"{"confirm_pasword_match": true}"#).unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FormConfig::from_path("/nonexistent/signup-form.json").unwrap_err();
        assert!(matches!(err, FormError::Io(_)));
    }
}
