//! docsubmit: collect identity details and supporting documents, validate
//! them, and submit them to a collection service.

pub mod api;
pub mod cli;
pub mod config;
pub mod documents;
pub mod form;
pub mod models;
pub mod pipeline;
pub mod tui;
pub mod validation;
