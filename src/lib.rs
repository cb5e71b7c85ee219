//! # Passage (account authentication service)
//!
//! `passage` creates accounts, checks passwords and issues stateless bearer
//! tokens that protect the rest of the API.
//!
//! ## Credentials
//!
//! Passwords are stored as Argon2id PHC strings with a per-hash random salt and
//! are never returned or logged. Login runs the same amount of Argon2 work for
//! unknown emails as for wrong passwords, and both fail with the same
//! `Invalid credentials` error.
//!
//! ## Tokens
//!
//! Session tokens are HS256 JWS strings carrying `{sub, email, iat, exp, jti}`.
//! Verification accepts only `HS256`, compares the MAC in constant time and
//! requires `now < exp`. There is no server-side session store; rotating the
//! signing secret invalidates every outstanding token.
//!
//! ## Accounts
//!
//! Emails are normalized (trimmed, lowercased) before storage and lookup, and
//! uniqueness is enforced by the database, so two concurrent signups with the
//! same email yield exactly one account.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
