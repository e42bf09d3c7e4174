use jobtrail_cli::error::CommandError;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();
    jobtrail_cli::init_tracing();

    tracing::info!("Starting Jobtrail v{}", env!("CARGO_PKG_VERSION"));

    match jobtrail_cli::commands::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<CommandError>() {
            Some(command_error) => {
                eprintln!("{command_error}");
                ExitCode::from(command_error.exit_code())
            }
            None => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
