//! Form Controller
//!
//! Owns the model store, the touched flags and one validation memo per
//! field, and implements the form actions.
//!
//! # Change Notification
//!
//! Every mutator returns [`ValidityChanges`]: the fields whose validity
//! flipped as a result of the call.
//!
//! Each field memo tracks the store revisions of the fields its rules read
//! ([`Schema::inputs`]), not the whole record. An edit to `username`
//! re-validates `username` and nothing else; toggling a notification
//! checkbox also re-validates `emailNotifications`, whose rule reads all
//! three.
//!
//! # Touched Flags
//!
//! A field becomes touched through [`FormController::mark_touched`] or
//! [`FormController::submit`] and stays touched until [`FormController::reset`].
//! Touched flags never affect validity; they only gate
//! [`FormController::visible_errors`].

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::FormConfig;
use crate::error::FormResult;
use crate::model::{Field, FieldSet, FieldValue, Registration};
use crate::reactive::{Memo, Signal};
use crate::store::ModelStore;
use crate::validation::{Schema, ValidationError, ValidationReport};

/// A field whose validity flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityChange {
    pub field: Field,
    /// Validity after the change.
    pub valid: bool,
}

/// Fields whose validity changed during one mutation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityChanges {
    changes: SmallVec<[ValidityChange; 4]>,
}

impl ValidityChanges {
    fn between(before: FieldSet, after: FieldSet) -> Self {
        let changes = before
            .symmetric_difference(&after)
            .iter()
            .map(|field| ValidityChange {
                field,
                valid: after.contains(field),
            })
            .collect();
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidityChange> {
        self.changes.iter()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.changes.iter().any(|change| change.field == field)
    }

    pub fn became_valid(&self) -> impl Iterator<Item = Field> + '_ {
        self.changes.iter().filter(|c| c.valid).map(|c| c.field)
    }

    pub fn became_invalid(&self) -> impl Iterator<Item = Field> + '_ {
        self.changes.iter().filter(|c| !c.valid).map(|c| c.field)
    }
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The record was valid and is now the submitted snapshot.
    Accepted,
    /// The record was invalid; the submitted snapshot was cleared.
    Rejected { invalid_fields: Vec<Field> },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

macro_rules! field_setters {
    ($($setter:ident($member:ident: $ty:ty) => $field:ident;)*) => {
        $(
            #[doc = concat!("Set `", stringify!($member), "`.")]
            pub fn $setter(&mut self, value: impl Into<$ty>) -> ValidityChanges {
                let value: $ty = value.into();
                debug!(field = Field::$field.name(), "field updated");
                self.track_changes(move |store| {
                    store.update_model(|record| record.$member = value);
                })
            }
        )*
    };
}

/// Drives one registration form.
#[derive(Debug)]
pub struct FormController {
    store: ModelStore,
    touched: Signal<FieldSet>,
    schema: Arc<Schema>,
    field_errors: IndexMap<Field, Memo<Vec<ValidationError>>>,
    valid: Memo<bool>,
}

impl FormController {
    /// A form with the standard registration schema.
    pub fn new() -> Self {
        Self::with_schema(Schema::registration())
    }

    pub fn with_config(config: &FormConfig) -> Self {
        Self::with_schema(Schema::from_config(config))
    }

    pub fn with_schema(schema: Schema) -> Self {
        let store = ModelStore::default();
        let schema = Arc::new(schema);

        let field_errors: IndexMap<Field, Memo<Vec<ValidationError>>> = Field::ALL
            .into_iter()
            .map(|field| {
                let store = store.clone();
                let schema = Arc::clone(&schema);
                let inputs = schema.inputs(field);
                let memo = Memo::new(move || {
                    for input in inputs.iter() {
                        store.revision(input);
                    }
                    store.with_model_untracked(|record| schema.validate_field(field, record))
                });
                (field, memo)
            })
            .collect();

        // Stops at the first invalid field, so it only depends on the
        // fields up to that one.
        let valid = {
            let field_errors = field_errors.clone();
            Memo::new(move || field_errors.values().all(|errors| errors.get().is_empty()))
        };

        Self {
            store,
            touched: Signal::new(FieldSet::empty()),
            schema,
            field_errors,
            valid,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Clone of the current record.
    pub fn model(&self) -> Registration {
        self.store.model()
    }

    /// The last record accepted by `submit`, if any.
    pub fn submitted(&self) -> Option<Registration> {
        self.store.submitted()
    }

    pub fn value(&self, field: Field) -> FieldValue {
        self.store.with_model_untracked(|record| record.get(field))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Current errors of one field, in rule order.
    pub fn errors(&self, field: Field) -> Vec<ValidationError> {
        self.field_errors
            .get(&field)
            .map(Memo::get)
            .unwrap_or_default()
    }

    pub fn is_field_valid(&self, field: Field) -> bool {
        self.errors(field).is_empty()
    }

    /// Errors to display: empty until the field has been touched.
    pub fn visible_errors(&self, field: Field) -> Vec<ValidationError> {
        if self.is_touched(field) {
            self.errors(field)
        } else {
            Vec::new()
        }
    }

    /// Errors of every invalid field.
    pub fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (field, errors) in &self.field_errors {
            report.insert(*field, errors.get());
        }
        report
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.with(|touched| touched.contains(field))
    }

    pub fn touched(&self) -> FieldSet {
        self.touched.get()
    }

    fn valid_fields(&self) -> FieldSet {
        self.field_errors
            .iter()
            .filter(|(_, errors)| errors.get().is_empty())
            .map(|(field, _)| *field)
            .collect()
    }

    fn invalid_fields(&self) -> Vec<Field> {
        let valid = self.valid_fields();
        Field::ALL.into_iter().filter(|field| !valid.contains(*field)).collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn track_changes(&mut self, mutate: impl FnOnce(&ModelStore)) -> ValidityChanges {
        let before = self.valid_fields();
        mutate(&self.store);
        let changes = ValidityChanges::between(before, self.valid_fields());

        if !changes.is_empty() {
            debug!(
                became_valid = changes.became_valid().count(),
                became_invalid = changes.became_invalid().count(),
                "field validity changed"
            );
        }
        changes
    }

    /// Replace the whole record.
    pub fn set_model(&mut self, record: Registration) -> ValidityChanges {
        self.track_changes(move |store| {
            store.set_model(record);
        })
    }

    /// Set any field from a dynamically typed value.
    ///
    /// Fails without touching the record if the value kind does not match.
    pub fn set_field(&mut self, field: Field, value: impl Into<FieldValue>) -> FormResult<ValidityChanges> {
        let mut record = self.store.model();
        record.set(field, value.into())?;
        debug!(field = field.name(), "field updated");
        Ok(self.track_changes(move |store| {
            store.set_model(record);
        }))
    }

    field_setters! {
        set_first_name(first_name: String) => FirstName;
        set_last_name(last_name: String) => LastName;
        set_username(username: String) => Username;
        set_email(email: String) => Email;
        set_age(age: i64) => Age;
        set_birthdate(birthdate: String) => Birthdate;
        set_preferred_time(preferred_time: String) => PreferredTime;
        set_bio(bio: String) => Bio;
        set_password(password: String) => Password;
        set_confirm_password(confirm_password: String) => ConfirmPassword;
        set_email_notifications(email_notifications: bool) => EmailNotifications;
        set_sms_notifications(sms_notifications: bool) => SmsNotifications;
        set_push_notifications(push_notifications: bool) => PushNotifications;
        set_agree_to_terms(agree_to_terms: bool) => AgreeToTerms;
        set_subscription_plan(subscription_plan: String) => SubscriptionPlan;
        set_country(country: String) => Country;
    }

    pub fn mark_touched(&mut self, field: Field) {
        if !self.is_touched(field) {
            self.touched.update(|touched| touched.insert(field));
        }
    }

    pub fn mark_all_touched(&mut self) {
        self.touched.set(FieldSet::all());
    }

    /// Touch every field, then accept the record if it is valid.
    ///
    /// Calling it again without changing the record gives the same outcome
    /// and the same snapshot.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.mark_all_touched();

        if self.is_valid() {
            self.store.set_submitted(Some(self.store.model()));
            info!("form submitted successfully");
            SubmitOutcome::Accepted
        } else {
            let invalid_fields = self.invalid_fields();
            self.store.set_submitted(None);
            info!(invalid_fields = invalid_fields.len(), "form has validation errors");
            SubmitOutcome::Rejected { invalid_fields }
        }
    }

    /// Back to the empty record, no submission, nothing touched.
    pub fn reset(&mut self) -> ValidityChanges {
        let changes = self.track_changes(|store| {
            store.set_model(Registration::empty());
            store.set_submitted(None);
        });
        self.touched.set(FieldSet::empty());
        info!("form reset to initial state");
        changes
    }

    /// Replace the record with the demo sample. Touched flags and the
    /// submitted snapshot are left alone.
    pub fn fill_sample(&mut self) -> ValidityChanges {
        let changes = self.track_changes(|store| {
            store.set_model(Registration::sample());
        });
        info!("sample data filled");
        changes
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;
    use crate::reactive::MemoState;
    use crate::validation::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One always-passing rule per field, counting evaluations per field.
    fn counting_schema(evaluations: &Arc<IndexMap<Field, AtomicUsize>>) -> Schema {
        Field::ALL.into_iter().fold(Schema::builder(), |builder, field| {
            let evaluations = Arc::clone(evaluations);
            let own = [field];
            let reads: &[Field] = if field == Field::EmailNotifications {
                &[Field::EmailNotifications, Field::SmsNotifications, Field::PushNotifications]
            } else {
                &own
            };
            builder.validate(field, ErrorKind::Required, "counted", reads, move |_| {
                evaluations[&field].fetch_add(1, Ordering::SeqCst);
                true
            })
        })
        .build()
    }

    fn evaluated(evaluations: &IndexMap<Field, AtomicUsize>) -> Vec<Field> {
        evaluations
            .iter()
            .filter(|(_, count)| count.swap(0, Ordering::SeqCst) > 0)
            .map(|(field, _)| *field)
            .collect()
    }

    #[test]
    fn new_form_is_empty_and_invalid() {
        let form = FormController::new();
        assert_eq!(form.model(), Registration::empty());
        assert!(!form.is_valid());
        assert!(form.submitted().is_none());
        assert!(form.touched().is_empty());
    }

    #[test]
    fn setter_reports_validity_flip() {
        let mut form = FormController::new();

        let changes = form.set_first_name("J");
        assert!(changes.is_empty(), "required -> minLength keeps the field invalid");

        let changes = form.set_first_name("John");
        assert_eq!(
            changes.iter().copied().collect::<Vec<_>>(),
            vec![ValidityChange { field: Field::FirstName, valid: true }]
        );

        let changes = form.set_first_name("");
        assert_eq!(changes.became_invalid().collect::<Vec<_>>(), vec![Field::FirstName]);
    }

    #[test]
    fn notification_checkbox_flips_the_notification_field() {
        let mut form = FormController::new();
        assert!(form.errors(Field::EmailNotifications)[0].kind == ErrorKind::NoNotification);

        let changes = form.set_push_notifications(true);
        assert!(changes.contains(Field::EmailNotifications));
        assert!(form.is_field_valid(Field::EmailNotifications));
    }

    #[test]
    fn set_field_rejects_wrong_kind_without_mutation() {
        let mut form = FormController::new();
        let err = form.set_field(Field::AgreeToTerms, "yes").unwrap_err();
        assert!(matches!(err, FormError::TypeMismatch { field: Field::AgreeToTerms, .. }));
        assert_eq!(form.model(), Registration::empty());

        let changes = form.set_field(Field::AgreeToTerms, true).unwrap();
        assert!(changes.contains(Field::AgreeToTerms));
    }

    #[test]
    fn visible_errors_follow_touched_flag() {
        let mut form = FormController::new();
        assert!(form.visible_errors(Field::Email).is_empty());
        assert!(!form.errors(Field::Email).is_empty());

        form.mark_touched(Field::Email);
        assert!(form.is_touched(Field::Email));
        assert!(!form.is_touched(Field::Bio));
        assert_eq!(form.visible_errors(Field::Email)[0].message, "Email is required");
    }

    #[test]
    fn touching_does_not_change_validity() {
        let mut form = FormController::new();
        let before = form.report();
        form.mark_all_touched();
        assert_eq!(form.report(), before);
        assert_eq!(form.touched(), FieldSet::all());
    }

    #[test]
    fn fill_sample_keeps_touched_and_submitted() {
        let mut form = FormController::new();
        form.mark_touched(Field::Bio);
        assert!(!form.submit().is_accepted());

        let changes = form.fill_sample();
        assert!(form.is_valid());
        assert_eq!(changes.became_valid().count(), Field::ALL.len() - 2);
        assert_eq!(form.touched(), FieldSet::all());
        assert!(form.submitted().is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = FormController::new();
        form.fill_sample();
        assert!(form.submit().is_accepted());

        let changes = form.reset();
        assert_eq!(changes.became_invalid().count(), Field::ALL.len() - 2);
        assert!(!form.is_valid());
        assert!(form.submitted().is_none());
        assert!(form.touched().is_empty());
    }

    #[test]
    fn edits_revalidate_only_fields_that_read_them() {
        let evaluations: Arc<IndexMap<Field, AtomicUsize>> =
            Arc::new(Field::ALL.into_iter().map(|field| (field, AtomicUsize::new(0))).collect());
        let mut form = FormController::with_schema(counting_schema(&evaluations));

        assert!(form.is_valid());
        assert_eq!(evaluated(&evaluations).len(), Field::ALL.len());

        form.set_username("jo");
        assert!(form.is_valid());
        assert_eq!(evaluated(&evaluations), vec![Field::Username]);

        form.set_sms_notifications(true);
        assert_eq!(
            evaluated(&evaluations),
            vec![Field::EmailNotifications, Field::SmsNotifications]
        );

        // Same value again: no revision bump, nothing re-runs.
        form.set_sms_notifications(true);
        assert!(evaluated(&evaluations).is_empty());
    }

    #[test]
    fn edits_revalidate_only_the_edited_field_under_the_standard_schema() {
        let mut form = FormController::new();
        form.fill_sample();
        assert!(form.is_valid());

        let untouched = form.field_errors[&Field::Email].clone();
        let edited = form.field_errors[&Field::Username].clone();

        form.set_username("jo");
        assert_eq!(untouched.state(), MemoState::Clean);
        assert_eq!(edited.state(), MemoState::Clean, "recomputed by the change set");
        assert_eq!(form.errors(Field::Username)[0].kind, ErrorKind::MinLength);

        form.set_push_notifications(false);
        form.set_email_notifications(false);
        assert_eq!(form.errors(Field::EmailNotifications)[0].kind, ErrorKind::NoNotification);
        assert_eq!(untouched.state(), MemoState::Clean);
    }

    #[test]
    fn validity_tracks_later_fields_after_first_invalid_one_is_fixed() {
        let mut form = FormController::new();
        form.fill_sample();
        form.set_first_name("");
        form.set_country("");
        assert!(!form.is_valid());

        form.set_first_name("John");
        assert!(!form.is_valid(), "country is still empty");

        form.set_country("ca");
        assert!(form.is_valid());
    }
}
