use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match intake_relay_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "startup failed");
            eprintln!("error while running intake relay: {err}");
            ExitCode::FAILURE
        }
    }
}
