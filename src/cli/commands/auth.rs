use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_STORAGE_TIMEOUT_SECONDS: &str = "storage-timeout-seconds";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub storage_timeout_seconds: u64,
    pub frontend_base_url: String,
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing or blank, or a
    /// duration is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // clap passes empty env values through; treat them as missing
        let token_secret = match matches.get_one::<String>(ARG_TOKEN_SECRET) {
            Some(value) if !value.trim().is_empty() => SecretString::from(value.clone()),
            _ => anyhow::bail!("missing required argument: --{ARG_TOKEN_SECRET}"),
        };

        let read_seconds = |id: &str| -> anyhow::Result<u64> {
            match matches.get_one::<u64>(id).copied() {
                Some(0) => anyhow::bail!("--{id} must be greater than zero"),
                Some(seconds) => Ok(seconds),
                None => anyhow::bail!("missing required argument: --{id}"),
            }
        };

        Ok(Self {
            token_secret,
            token_ttl_seconds: read_seconds(ARG_TOKEN_TTL_SECONDS)?,
            storage_timeout_seconds: read_seconds(ARG_STORAGE_TIMEOUT_SECONDS)?,
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign session tokens (HS256)")
                .env("PASSAGE_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("PASSAGE_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_STORAGE_TIMEOUT_SECONDS)
                .long(ARG_STORAGE_TIMEOUT_SECONDS)
                .help("Deadline for each account store call in seconds")
                .env("PASSAGE_STORAGE_TIMEOUT_SECONDS")
                .default_value("5")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL allowed by CORS")
                .env("PASSAGE_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
}
