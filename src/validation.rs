//! Field validation for submissions
//!
//! Produces a mapping from field path (`firstName`, `documents.1.fileName`, ...)
//! to a human-readable message. An empty mapping means the submission is accepted.

use chrono::{Datelike, NaiveDate};
use email_address::EmailAddress;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::Submission;

pub const MIN_AGE_YEARS: i32 = 18;
pub const MIN_DOCUMENTS: usize = 2;

/// Validation switches beyond the base schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOptions {
    /// Require `permanentStreet1` while the permanent section is visible
    pub require_permanent_address: bool,
}

/// Field path to error message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        // First failing rule for a path wins
        self.errors.entry(path.into()).or_insert_with(|| message.into());
    }

    /// Replace whatever message `path` has
    pub fn set(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(path.into(), message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Errors for the document at `position`, keyed by its field name
    pub fn for_document(&self, position: usize) -> BTreeMap<&str, &str> {
        let prefix = format!("{}.", document_path(position));
        self.errors
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|field| (field, v.as_str())))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, message) in &self.errors {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{}: {}", path, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn document_path(position: usize) -> String {
    format!("documents.{}", position)
}

/// Age as the difference of calendar years.
///
/// Birth month and day are ignored, so someone whose birthday has not yet come
/// this year is counted a year older.
pub fn age_by_year(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - date_of_birth.year()
}

/// Parse a date of birth typed as exactly `YYYY-MM-DD`.
///
/// chrono alone accepts one-digit months and days, which would turn a
/// half-deleted "2026-10-1" into the first of October.
pub fn parse_date_of_birth(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
    {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Address syntax as the web form accepted it: RFC 5322 parsing plus a dotted
/// domain ending in an alphabetic label of two or more letters. Quoted local
/// parts and `[...]` domain literals are refused.
pub fn is_valid_email(address: &str) -> bool {
    let Ok(parsed) = address.parse::<EmailAddress>() else {
        return false;
    };
    if parsed.local_part().starts_with('"') || parsed.domain().starts_with('[') {
        return false;
    }
    let labels: Vec<&str> = parsed.domain().split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return false;
    }
    labels
        .last()
        .map_or(false, |tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

pub fn earliest_date_of_birth() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Validate a submission as of `today`
pub fn validate(
    submission: &Submission,
    today: NaiveDate,
    options: &ValidationOptions,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if submission.first_name.is_empty() {
        errors.add("firstName", "First name is required");
    }
    if submission.last_name.is_empty() {
        errors.add("lastName", "Last name is required");
    }
    if !is_valid_email(&submission.email) {
        errors.add("email", "Invalid email address");
    }

    let dob = submission.date_of_birth;
    if dob < earliest_date_of_birth() || dob > today {
        errors.add("dateOfBirth", "Date of birth must be between 1900-01-01 and today");
    } else if age_by_year(dob, today) < MIN_AGE_YEARS {
        errors.add("dateOfBirth", "You must be at least 18 years old");
    }

    if submission.residential_street1.is_empty() {
        errors.add("residentialStreet1", "Residential street is required");
    }

    if options.require_permanent_address
        && !submission.same_as_residential
        && submission.permanent_street1.as_deref().unwrap_or("").is_empty()
    {
        errors.add("permanentStreet1", "Permanent street is required");
    }

    for (position, document) in submission.documents.iter().enumerate() {
        let base = document_path(position);
        if document.file_name.is_empty() {
            errors.add(format!("{}.fileName", base), "File name is required");
        }
        if !document.file_type.is_supported() {
            errors.add(
                format!("{}.fileType", base),
                format!(
                    "Invalid file type '{}', expected 'image' or 'pdf'",
                    document.file_type.as_str()
                ),
            );
        }
    }
    if submission.documents.len() < MIN_DOCUMENTS {
        errors.add("documents", "At least two documents are required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
