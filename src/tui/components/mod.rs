//! Reusable UI components for the terminal form

pub mod form_field;

pub use form_field::{FormField, FormFieldType};
