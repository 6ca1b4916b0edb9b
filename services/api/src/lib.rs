mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod telemetry;

use csf_compliance::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
