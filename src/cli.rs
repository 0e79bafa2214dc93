use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::models::{FileRef, Submission};

#[derive(Parser)]
#[command(name = "docsubmit")]
#[command(about = "Collect identity details and supporting documents and submit them to a collection service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the collection service (overrides DOCSUBMIT_API_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the form interactively (default)
    Tui,

    /// Validate a draft submission and print any field errors
    Validate {
        /// Draft submission JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Validate a draft submission, then upload its documents and submit it
    Submit {
        /// Draft submission JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Load a draft submission from JSON.
///
/// Attachment paths are resolved relative to the draft's directory and their
/// name, size and content type are read from disk.
pub fn load_draft(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read draft file: {}", path.display()))?;
    let mut submission: Submission = serde_json::from_str(&content)
        .with_context(|| format!("Invalid draft file: {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for document in &mut submission.documents {
        if let Some(file) = document.file.take() {
            let resolved = if file.path.is_absolute() {
                file.path.clone()
            } else {
                base_dir.join(&file.path)
            };
            let refreshed = FileRef::from_path(&resolved)
                .with_context(|| format!("Cannot attach {} to '{}'", resolved.display(), document.file_name))?;
            document.file = Some(refreshed);
        }
    }

    Ok(submission)
}
