pub mod encoder;
pub mod password;
pub mod token;

pub use encoder::CredentialEncoder;
pub use password::digest;
pub use token::{Identity, IdentityPayload, TokenService};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable key material was supplied at startup.
    #[error("encryption key is not configured")]
    MissingKey,
    /// Signature did not verify, or the embedded payload failed to
    /// decrypt/parse.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Signature verified but the payload's `expires` has passed.
    #[error("Expired token.")]
    Expired,
    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}
