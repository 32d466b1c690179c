//! Python Bindings
//!
//! Exposes [`FormController`] to a Python UI layer as `RegistrationForm`.
//! Fields are addressed by their camelCase names.

use pyo3::exceptions::{PyIOError, PyKeyError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBool;

use crate::config::FormConfig;
use crate::controller::FormController;
use crate::error::FormError;
use crate::model::{Field, FieldValue, COUNTRIES, SUBSCRIPTION_PLANS};
use crate::validation::ValidationError;

impl From<FormError> for PyErr {
    fn from(err: FormError) -> Self {
        match err {
            FormError::UnknownField(_) => PyKeyError::new_err(err.to_string()),
            FormError::TypeMismatch { .. } => PyTypeError::new_err(err.to_string()),
            FormError::Config(_) => PyValueError::new_err(err.to_string()),
            FormError::Io(_) => PyIOError::new_err(err.to_string()),
        }
    }
}

fn extract_value(value: &Bound<'_, PyAny>) -> PyResult<FieldValue> {
    // bool is a subclass of int in Python; check it first.
    if let Ok(flag) = value.downcast::<PyBool>() {
        return Ok(FieldValue::Flag(flag.is_true()));
    }
    if let Ok(n) = value.extract::<i64>() {
        return Ok(FieldValue::Integer(n));
    }
    if let Ok(text) = value.extract::<String>() {
        return Ok(FieldValue::Text(text));
    }
    Err(PyTypeError::new_err(format!(
        "unsupported field value type: {}",
        value.get_type().name()?
    )))
}

fn error_pairs(errors: Vec<ValidationError>) -> Vec<(&'static str, String)> {
    errors
        .into_iter()
        .map(|error| (error.kind.as_str(), error.message.into_owned()))
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Python-exposed registration form.
#[pyclass(name = "RegistrationForm")]
pub struct PyRegistrationForm {
    inner: FormController,
}

#[pymethods]
impl PyRegistrationForm {
    /// Create a form, optionally from a JSON configuration document.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(text) => FormConfig::from_json(text)?,
            None => FormConfig::default(),
        };
        Ok(Self {
            inner: FormController::with_config(&config),
        })
    }

    /// Set a field. Returns the names of fields whose validity flipped.
    fn set_field(&mut self, name: &str, value: &Bound<'_, PyAny>) -> PyResult<Vec<&'static str>> {
        let field: Field = name.parse()?;
        let changes = self.inner.set_field(field, extract_value(value)?)?;
        Ok(changes.iter().map(|change| change.field.name()).collect())
    }

    fn get_field(&self, py: Python<'_>, name: &str) -> PyResult<PyObject> {
        let field: Field = name.parse()?;
        Ok(match self.inner.value(field) {
            FieldValue::Text(text) => text.into_py(py),
            FieldValue::Integer(n) => n.into_py(py),
            FieldValue::Flag(flag) => flag.into_py(py),
        })
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    /// `(kind, message)` pairs for one field.
    fn errors(&self, name: &str) -> PyResult<Vec<(&'static str, String)>> {
        Ok(error_pairs(self.inner.errors(name.parse()?)))
    }

    /// Like `errors`, but empty until the field has been touched.
    fn visible_errors(&self, name: &str) -> PyResult<Vec<(&'static str, String)>> {
        Ok(error_pairs(self.inner.visible_errors(name.parse()?)))
    }

    fn report_json(&self) -> PyResult<String> {
        to_json(&self.inner.report())
    }

    fn is_touched(&self, name: &str) -> PyResult<bool> {
        Ok(self.inner.is_touched(name.parse()?))
    }

    fn mark_touched(&mut self, name: &str) -> PyResult<()> {
        self.inner.mark_touched(name.parse()?);
        Ok(())
    }

    fn mark_all_touched(&mut self) {
        self.inner.mark_all_touched();
    }

    /// Returns `True` if the record was accepted.
    fn submit(&mut self) -> bool {
        self.inner.submit().is_accepted()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn fill_sample(&mut self) {
        self.inner.fill_sample();
    }

    fn model_json(&self) -> PyResult<String> {
        to_json(&self.inner.model())
    }

    fn submitted_json(&self) -> PyResult<Option<String>> {
        self.inner.submitted().map(|record| to_json(&record)).transpose()
    }

    fn __repr__(&self) -> String {
        format!(
            "RegistrationForm(valid={}, touched={}, submitted={})",
            self.inner.is_valid(),
            self.inner.touched().len(),
            self.inner.submitted().is_some()
        )
    }
}

/// `(code, name)` pairs for the country select list.
#[pyfunction]
pub fn countries() -> Vec<(&'static str, &'static str)> {
    COUNTRIES.iter().map(|c| (c.code, c.name)).collect()
}

#[pyfunction]
pub fn subscription_plans() -> Vec<&'static str> {
    SUBSCRIPTION_PLANS.to_vec()
}
