//! Signup Core
//!
//! This crate provides the model behind a reactive registration form.
//! It implements:
//!
//! - Reactive primitives (signals, memos) with automatic dependency tracking
//! - The registration record and its field identities
//! - A table-driven validation schema with per-field and cross-field rules
//! - A form controller with submit, reset and fill-sample actions
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! - `reactive`: signals, memos and the runtime that links them
//! - `model`: the registration record, field identities, reference data
//! - `validation`: rules, schema and error reports
//! - `store`: current record and submitted snapshot
//! - `controller`: the form controller
//! - `config`: optional rules loaded from JSON
//!
//! # Example
//!
//! ```rust
//! use signup_core::{Field, FormController};
//!
//! let mut form = FormController::new();
//! assert!(!form.is_valid());
//!
//! let changes = form.set_first_name("John");
//! assert!(changes.contains(Field::FirstName));
//!
//! form.fill_sample();
//! assert!(form.submit().is_accepted());
//! assert_eq!(form.submitted(), Some(form.model()));
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod reactive;
pub mod store;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::FormConfig;
pub use controller::{FormController, SubmitOutcome, ValidityChange, ValidityChanges};
pub use error::{FormError, FormResult};
pub use model::{Country, Field, FieldSet, FieldValue, Registration, ValueKind, COUNTRIES, SUBSCRIPTION_PLANS};
pub use validation::{ErrorKind, Schema, ValidationError, ValidationReport};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types and functions.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyRegistrationForm>()?;
    m.add_function(wrap_pyfunction!(python::countries, m)?)?;
    m.add_function(wrap_pyfunction!(python::subscription_plans, m)?)?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
