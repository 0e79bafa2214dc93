//! Collection service client
//!
//! The service exposes two unauthenticated endpoints under a configurable base
//! address: `POST /upload` (multipart: `data` JSON plus `files` parts) and
//! `POST /submit` (JSON submission). Only success or failure is consumed.

pub mod client;
pub mod errors;

pub use client::{CollectionApi, HttpCollectionClient};
pub use errors::ApiError;
