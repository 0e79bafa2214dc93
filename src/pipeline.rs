//! Submission pipeline: validate, upload, submit
//!
//! Both calls must succeed. Any failure is logged and reported to the user as the
//! same generic notice; nothing is retried or rolled back.

use tracing::{error, info, warn};

use crate::api::{ApiError, CollectionApi};
use crate::form::FormState;
use crate::models::Submission;
use crate::validation::ValidationErrors;

pub const SUCCESS_NOTICE: &str = "Form submitted successfully!";
pub const FAILURE_NOTICE: &str = "Form submission failed. Please try again.";
pub const IN_FLIGHT_NOTICE: &str = "A submission is already in progress.";

/// Result of one submit attempt as seen by the user
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Both calls succeeded; the form has been reset
    Submitted,
    /// Validation failed; no request was made
    Invalid(ValidationErrors),
    /// One of the calls failed
    Failed(ApiError),
    /// Another submission is still pending
    InFlight,
}

impl SubmitOutcome {
    /// Notice shown to the user, if any. Validation failures are shown inline instead.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SubmitOutcome::Submitted => Some(SUCCESS_NOTICE),
            SubmitOutcome::Failed(_) => Some(FAILURE_NOTICE),
            SubmitOutcome::InFlight => Some(IN_FLIGHT_NOTICE),
            SubmitOutcome::Invalid(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }
}

/// Upload then submit an already validated submission
pub async fn send(api: &dyn CollectionApi, submission: &Submission) -> Result<(), ApiError> {
    api.upload_files(submission).await?;
    api.submit_form_data(submission).await?;
    Ok(())
}

/// Run the full pipeline for the form's current values
pub async fn submit_form(form: &mut FormState, api: &dyn CollectionApi) -> SubmitOutcome {
    if !form.is_valid() {
        warn!("Submission blocked by {} validation errors", form.errors().len());
        return SubmitOutcome::Invalid(form.errors().clone());
    }

    if !form.begin_submit() {
        warn!("Submit requested while a submission is in flight");
        return SubmitOutcome::InFlight;
    }

    let submission = form.to_submission();
    info!(
        "Submitting form with {} documents ({} attached)",
        submission.documents.len(),
        submission.documents.iter().filter(|d| d.file.is_some()).count()
    );

    match send(api, &submission).await {
        Ok(()) => {
            info!("Submission accepted");
            form.finish_submit(true);
            SubmitOutcome::Submitted
        }
        Err(e) => {
            error!("Submission failed: {}", e);
            form.finish_submit(false);
            SubmitOutcome::Failed(e)
        }
    }
}
