use crate::{api, cli::telemetry};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub storage_timeout_seconds: u64,
    pub frontend_base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = api::AuthConfig::new(args.frontend_base_url)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_storage_timeout_seconds(args.storage_timeout_seconds);

    debug!("Auth config: {:?}", auth_config);

    let result = api::new(args.port, args.dsn, args.token_secret, auth_config).await;

    telemetry::shutdown_tracer();

    result
}
