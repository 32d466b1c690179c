//! Model store: the current record and the last accepted submission.
//!
//! Pure storage. Besides the record itself, the store keeps one revision
//! counter per field. A write bumps the counters of the fields whose value
//! actually changed, so a computation that tracks the revisions of the
//! fields it reads is invalidated only by edits to those fields.

use indexmap::IndexMap;

use crate::model::{Field, FieldSet, Registration};
use crate::reactive::Signal;

#[derive(Debug, Clone)]
pub struct ModelStore {
    model: Signal<Registration>,
    revisions: IndexMap<Field, Signal<u64>>,
    submitted: Signal<Option<Registration>>,
}

impl ModelStore {
    pub fn new(initial: Registration) -> Self {
        Self {
            model: Signal::new(initial),
            revisions: Field::ALL.into_iter().map(|field| (field, Signal::new(0))).collect(),
            submitted: Signal::new(None),
        }
    }

    /// Clone of the current record.
    pub fn model(&self) -> Registration {
        self.model.get()
    }

    /// Borrow the current record without tracking the read.
    ///
    /// Derived computations pair this with [`ModelStore::revision`] for the
    /// fields they depend on.
    pub fn with_model_untracked<R>(&self, f: impl FnOnce(&Registration) -> R) -> R {
        self.model.with_untracked(f)
    }

    /// Replace the record. Returns the fields whose value changed.
    pub fn set_model(&self, record: Registration) -> FieldSet {
        let changed: FieldSet = self.model.with_untracked(|current| {
            Field::ALL
                .into_iter()
                .filter(|field| current.get(*field) != record.get(*field))
                .collect()
        });

        self.model.set(record);
        for field in changed.iter() {
            if let Some(revision) = self.revisions.get(&field) {
                revision.update(|n| *n += 1);
            }
        }
        changed
    }

    /// Mutate the current record. Returns the fields whose value changed.
    pub fn update_model(&self, f: impl FnOnce(&mut Registration)) -> FieldSet {
        let mut record = self.model.get_untracked();
        f(&mut record);
        self.set_model(record)
    }

    /// Number of writes that changed `field`. Tracked.
    pub fn revision(&self, field: Field) -> u64 {
        self.revisions.get(&field).map_or(0, Signal::get)
    }

    pub fn submitted(&self) -> Option<Registration> {
        self.submitted.get()
    }

    pub fn set_submitted(&self, record: Option<Registration>) {
        self.submitted.set(record);
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(Registration::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_without_submission() {
        let store = ModelStore::default();
        assert_eq!(store.model(), Registration::empty());
        assert!(store.submitted().is_none());
    }

    #[test]
    fn slots_are_independent() {
        let store = ModelStore::default();
        store.set_model(Registration::sample());
        assert!(store.submitted().is_none());

        store.set_submitted(Some(Registration::sample()));
        store.update_model(|r| r.first_name = "Jane".into());

        assert_eq!(store.model().first_name, "Jane");
        assert_eq!(store.submitted().unwrap().first_name, "John");

        store.set_submitted(None);
        assert!(store.submitted().is_none());
    }

    #[test]
    fn only_changed_fields_get_a_new_revision() {
        let store = ModelStore::new(Registration::sample());

        let changed = store.update_model(|r| r.username = "jane_doe".into());
        assert_eq!(changed.iter().collect::<Vec<_>>(), vec![Field::Username]);
        assert_eq!(store.revision(Field::Username), 1);
        assert_eq!(store.revision(Field::Email), 0);

        // Writing the same value again is not a change.
        let changed = store.update_model(|r| r.username = "jane_doe".into());
        assert!(changed.is_empty());
        assert_eq!(store.revision(Field::Username), 1);

        let changed = store.set_model(Registration::empty());
        assert_eq!(changed.len(), Field::ALL.len() - 1, "smsNotifications is false in both");
        assert_eq!(store.revision(Field::SmsNotifications), 0);
    }
}
