use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use docsubmit::{
    api::HttpCollectionClient,
    cli::{load_draft, Cli, Commands},
    config::Config,
    form::FormState,
    pipeline::{self, SubmitOutcome},
    tui, validation,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "docsubmit=info");
    }

    let config = Config::from_env()?.with_base_url(cli.base_url.clone());
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(&config, interactive);

    config.validate()?;
    info!("Using collection service at {}", config.api_base_url);

    match cli.command {
        None | Some(Commands::Tui) => {
            let api = HttpCollectionClient::new(&config)?;
            tui::run_tui(&config, Box::new(api)).await?;
        }

        Some(Commands::Validate { file }) => {
            let submission = load_draft(&file)?;
            let today = Local::now().date_naive();
            match validation::validate(&submission, today, &config.validation_options()) {
                Ok(()) => println!("{} is valid", file.display()),
                Err(errors) => {
                    println!("{} has {} field error(s):", file.display(), errors.len());
                    for (path, message) in errors.iter() {
                        println!("  {:<24} {}", path, message);
                    }
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::Submit { file }) => {
            let submission = load_draft(&file)?;
            let today = Local::now().date_naive();
            let mut form = FormState::from_submission(submission, today, config.validation_options());
            let api = HttpCollectionClient::new(&config)?;

            let outcome = pipeline::submit_form(&mut form, &api).await;
            if let SubmitOutcome::Invalid(errors) = &outcome {
                eprintln!("Submission blocked by field errors:\n{}", errors);
                std::process::exit(1);
            }
            if let Some(notice) = outcome.notice() {
                println!("{}", notice);
            }
            if !outcome.is_success() {
                error!("Submit command failed for {}", file.display());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Log to the configured file; in CLI mode also to stderr. The TUI owns the
/// terminal, so it logs to the file only.
fn init_logging(config: &Config, interactive: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let file_name = config
        .log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "docsubmit.log".into());
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}
