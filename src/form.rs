//! Reactive form state
//!
//! Every mutation re-runs validation so `errors()` always reflects the current
//! values. The form also owns the in-flight flag used to refuse a second submit
//! while one is pending.

use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

use crate::documents::{DocumentList, RowControl};
use crate::models::{DocumentId, FileRef, FileType, Submission};
use crate::validation::{self, ValidationErrors, ValidationOptions};

/// Free-text fields of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    FirstName,
    LastName,
    Email,
    ResidentialStreet1,
    ResidentialStreet2,
    PermanentStreet1,
    PermanentStreet2,
}

impl TextField {
    /// Field path used in validation errors
    pub fn path(&self) -> &'static str {
        match self {
            TextField::FirstName => "firstName",
            TextField::LastName => "lastName",
            TextField::Email => "email",
            TextField::ResidentialStreet1 => "residentialStreet1",
            TextField::ResidentialStreet2 => "residentialStreet2",
            TextField::PermanentStreet1 => "permanentStreet1",
            TextField::PermanentStreet2 => "permanentStreet2",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    first_name: String,
    last_name: String,
    email: String,
    date_of_birth: NaiveDate,
    /// Typed date of birth that isn't a complete `YYYY-MM-DD`
    date_of_birth_unparsed: bool,
    residential_street1: String,
    residential_street2: String,
    same_as_residential: bool,
    permanent_street1: String,
    permanent_street2: String,
    documents: DocumentList,

    today: NaiveDate,
    options: ValidationOptions,
    errors: ValidationErrors,
    submitting: bool,
}

impl FormState {
    /// Fresh form as of `today`
    pub fn new(today: NaiveDate, options: ValidationOptions) -> Self {
        Self::from_submission(Submission::new(today), today, options)
    }

    /// Load a previously drafted submission into the form
    pub fn from_submission(submission: Submission, today: NaiveDate, options: ValidationOptions) -> Self {
        let mut form = Self {
            first_name: submission.first_name,
            last_name: submission.last_name,
            email: submission.email,
            date_of_birth: submission.date_of_birth,
            date_of_birth_unparsed: false,
            residential_street1: submission.residential_street1,
            residential_street2: submission.residential_street2.unwrap_or_default(),
            same_as_residential: submission.same_as_residential,
            permanent_street1: submission.permanent_street1.unwrap_or_default(),
            permanent_street2: submission.permanent_street2.unwrap_or_default(),
            documents: DocumentList::from_documents(submission.documents),
            today,
            options,
            errors: ValidationErrors::new(),
            submitting: false,
        };
        form.revalidate();
        form
    }

    fn revalidate(&mut self) {
        self.errors = match validation::validate(&self.to_submission(), self.today, &self.options) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.date_of_birth_unparsed {
            self.errors.set("dateOfBirth", INVALID_DATE_FORMAT);
        }
        debug!("Form revalidated: {} field errors", self.errors.len());
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::FirstName => &self.first_name,
            TextField::LastName => &self.last_name,
            TextField::Email => &self.email,
            TextField::ResidentialStreet1 => &self.residential_street1,
            TextField::ResidentialStreet2 => &self.residential_street2,
            TextField::PermanentStreet1 => &self.permanent_street1,
            TextField::PermanentStreet2 => &self.permanent_street2,
        }
    }

    pub fn set_text(&mut self, field: TextField, value: &str) {
        let slot = match field {
            TextField::FirstName => &mut self.first_name,
            TextField::LastName => &mut self.last_name,
            TextField::Email => &mut self.email,
            TextField::ResidentialStreet1 => &mut self.residential_street1,
            TextField::ResidentialStreet2 => &mut self.residential_street2,
            TextField::PermanentStreet1 => &mut self.permanent_street1,
            TextField::PermanentStreet2 => &mut self.permanent_street2,
        };
        *slot = value.to_string();
        self.revalidate();
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn set_date_of_birth(&mut self, date: NaiveDate) {
        self.date_of_birth = date;
        self.date_of_birth_unparsed = false;
        self.revalidate();
    }

    /// Set the date of birth from typed text. Text that isn't a complete
    /// `YYYY-MM-DD` date keeps the previous value but leaves a `dateOfBirth`
    /// error, so the form can't be submitted. Returns whether the text parsed.
    pub fn set_date_of_birth_text(&mut self, text: &str) -> bool {
        match validation::parse_date_of_birth(text) {
            Some(date) => {
                self.set_date_of_birth(date);
                true
            }
            None => {
                self.date_of_birth_unparsed = true;
                self.revalidate();
                false
            }
        }
    }

    pub fn same_as_residential(&self) -> bool {
        self.same_as_residential
    }

    /// Set the flag. Permanent address values are left untouched either way.
    pub fn set_same_as_residential(&mut self, same: bool) {
        self.same_as_residential = same;
        self.revalidate();
    }

    pub fn toggle_same_as_residential(&mut self) {
        self.set_same_as_residential(!self.same_as_residential);
    }

    pub fn permanent_section_visible(&self) -> bool {
        !self.same_as_residential
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    pub fn append_document(&mut self) -> DocumentId {
        let id = self.documents.append();
        self.revalidate();
        id
    }

    pub fn remove_document(&mut self, id: DocumentId) -> bool {
        let removed = self.documents.remove(id).is_some();
        self.revalidate();
        removed
    }

    pub fn activate_row_control(&mut self, control: RowControl) -> Option<DocumentId> {
        let added = self.documents.activate(control);
        self.revalidate();
        added
    }

    pub fn set_document_name(&mut self, id: DocumentId, name: &str) -> bool {
        let changed = self.documents.set_file_name(id, name);
        self.revalidate();
        changed
    }

    pub fn set_document_type(&mut self, id: DocumentId, file_type: FileType) -> bool {
        let changed = self.documents.set_file_type(id, file_type);
        self.revalidate();
        changed
    }

    pub fn attach_file(&mut self, id: DocumentId, file: FileRef) -> bool {
        let changed = self.documents.attach(id, file);
        self.revalidate();
        changed
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error_for(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    /// Errors of one document row, keyed by field name
    pub fn document_errors(&self, id: DocumentId) -> BTreeMap<&str, &str> {
        match self.documents.position(id) {
            Some(position) => self.errors.for_document(position),
            None => BTreeMap::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn to_submission(&self) -> Submission {
        Submission {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            date_of_birth: self.date_of_birth,
            residential_street1: self.residential_street1.clone(),
            residential_street2: non_empty(&self.residential_street2),
            same_as_residential: self.same_as_residential,
            permanent_street1: non_empty(&self.permanent_street1),
            permanent_street2: non_empty(&self.permanent_street2),
            documents: self.documents.to_documents(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Take the in-flight lock. Returns false when a submission is already pending.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    /// Release the in-flight lock. A successful submission resets the form as of
    /// the current local date, since a long-running session may have crossed midnight.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded {
            *self = Self::new(Local::now().date_naive(), self.options.clone());
        }
    }
}

pub const INVALID_DATE_FORMAT: &str = "Invalid date format (YYYY-MM-DD)";

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn filled() -> FormState {
        let mut form = FormState::new(today(), ValidationOptions::default());
        form.set_text(TextField::FirstName, "Jane");
        form.set_text(TextField::LastName, "Doe");
        form.set_text(TextField::Email, "jane@example.com");
        form.set_text(TextField::ResidentialStreet1, "123 Main St");
        form.set_date_of_birth(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let ids: Vec<_> = form.documents().iter().map(|e| e.id).collect();
        form.set_document_name(ids[0], "passport");
        form.set_document_name(ids[1], "utility bill");
        form
    }

    #[test]
    fn test_errors_track_every_mutation() {
        let mut form = FormState::new(today(), ValidationOptions::default());
        assert_eq!(form.error_for("firstName"), Some("First name is required"));

        form.set_text(TextField::FirstName, "Jane");
        assert_eq!(form.error_for("firstName"), None);

        form.set_text(TextField::FirstName, "");
        assert!(form.error_for("firstName").is_some());

        let form = filled();
        assert!(form.is_valid(), "{}", form.errors());
    }

    #[test]
    fn test_toggle_hides_without_erasing() {
        let mut form = filled();
        form.set_text(TextField::PermanentStreet1, "9 Elm Rd");
        assert!(form.permanent_section_visible());

        form.set_same_as_residential(true);
        assert!(!form.permanent_section_visible());
        assert_eq!(form.text(TextField::PermanentStreet1), "9 Elm Rd");

        form.set_same_as_residential(true);
        assert!(!form.permanent_section_visible());

        form.toggle_same_as_residential();
        assert!(form.permanent_section_visible());
        assert_eq!(form.text(TextField::PermanentStreet1), "9 Elm Rd");
        assert_eq!(form.text(TextField::ResidentialStreet1), "123 Main St");
    }

    #[test]
    fn test_document_errors_follow_identity() {
        let mut form = filled();
        let third = form.append_document();
        let first = form.documents().id_at(0).unwrap();
        assert_eq!(form.document_errors(third).get("fileName"), Some(&"File name is required"));

        form.remove_document(form.documents().id_at(1).unwrap());
        assert_eq!(form.documents().position(third), Some(1));
        assert!(form.document_errors(third).contains_key("fileName"));
        assert!(form.document_errors(first).is_empty());

        form.remove_document(third);
        assert_eq!(form.error_for("documents"), Some("At least two documents are required"));
    }

    #[test]
    fn test_empty_optional_fields_serialize_as_absent() {
        let submission = filled().to_submission();
        assert!(submission.residential_street2.is_none());
        assert!(submission.permanent_street1.is_none());
    }

    #[test]
    fn test_in_flight_lock() {
        let mut form = filled();
        assert!(form.begin_submit());
        assert!(!form.begin_submit());

        form.finish_submit(false);
        assert!(!form.is_submitting());
        assert_eq!(form.text(TextField::FirstName), "Jane");

        assert!(form.begin_submit());
        form.finish_submit(true);
        assert_eq!(form.text(TextField::FirstName), "");
        assert_eq!(form.documents().len(), 2);
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_reset_uses_current_date() {
        let stale = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut form = FormState::new(stale, ValidationOptions::default());
        assert!(form.begin_submit());
        form.finish_submit(true);

        let now = Local::now().date_naive();
        assert_eq!(form.today(), now);
        assert_eq!(form.date_of_birth(), now);
    }

    #[test]
    fn test_unparsed_date_blocks_form() {
        let mut form = filled();
        assert!(form.is_valid());

        assert!(!form.set_date_of_birth_text("2026-10-1"));
        assert!(!form.is_valid());
        assert_eq!(form.error_for("dateOfBirth"), Some(INVALID_DATE_FORMAT));
        assert_eq!(form.date_of_birth(), NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());

        // Other edits keep the error until the date is fixed
        form.set_text(TextField::FirstName, "Janet");
        assert_eq!(form.error_for("dateOfBirth"), Some(INVALID_DATE_FORMAT));

        assert!(form.set_date_of_birth_text("1999-12-31"));
        assert!(form.is_valid(), "{}", form.errors());
        assert_eq!(form.date_of_birth(), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
    }
}
