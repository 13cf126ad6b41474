use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthError, CredentialEncoder};
use crate::config::SecurityConfig;

/// Principal projection captured at sign-in time.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

/// The decrypted map a token carries. Produced once at issuance, read-only
/// afterwards, never persisted. `expires > created` always holds for
/// issued tokens.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IdentityPayload {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub created: i64,
    pub expires: i64,
}

/// Outer signed wrapper: one claim, the ciphertext of the identity payload.
/// Expiry lives inside the ciphertext, so claim-level `exp` validation is
/// switched off and enforcement happens in `verify`.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    data: String,
}

pub struct TokenService {
    encoder: CredentialEncoder,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Result<Self, AuthError> {
        if security.jwt_key.is_empty() {
            return Err(AuthError::MissingKey);
        }
        Ok(Self {
            encoder: CredentialEncoder::new(&security.cryptographic_key)?,
            encoding_key: EncodingKey::from_secret(security.jwt_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(security.jwt_key.as_bytes()),
            ttl: Duration::days(security.token_ttl_days),
        })
    }

    /// Build a signed, time-bounded token embedding the encrypted identity.
    pub fn create_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let created = Utc::now().timestamp();
        let payload = IdentityPayload {
            id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            roles: identity.roles.clone(),
            created,
            expires: created + self.ttl.num_seconds(),
        };
        let claims = Claims {
            data: self.encoder.encrypt(&payload)?,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify the signature and expose the decrypted payload. Does not
    /// enforce expiry; protected operations go through `verify`.
    pub fn view_token(&self, token: &str) -> Result<IdentityPayload, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let wrapper = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        self.encoder.decrypt(&wrapper.claims.data)
    }

    /// `view_token` plus expiry enforcement, so callers can tell an expired
    /// token apart from a malformed one.
    pub fn verify(&self, token: &str) -> Result<IdentityPayload, AuthError> {
        let payload = self.view_token(token)?;
        if Utc::now().timestamp() >= payload.expires {
            return Err(AuthError::Expired);
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fernet::Fernet;

    fn security(ttl_days: i64) -> SecurityConfig {
        SecurityConfig {
            cryptographic_key: Fernet::generate_key(),
            jwt_key: "test-signing-key".to_string(),
            token_ttl_days: ttl_days,
        }
    }

    fn identity() -> Identity {
        Identity {
            id: 42,
            email: "first1.last1@email.com".to_string(),
            name: "First1 Last1".to_string(),
            roles: vec!["basic".to_string()],
        }
    }

    #[test]
    fn missing_signing_key_is_a_configuration_error() {
        let mut cfg = security(7);
        cfg.jwt_key.clear();
        assert!(matches!(TokenService::new(&cfg), Err(AuthError::MissingKey)));
    }

    #[test]
    fn view_of_created_token_matches_identity() {
        let service = TokenService::new(&security(7)).unwrap();
        let token = service.create_token(&identity()).unwrap();
        let payload = service.view_token(&token).unwrap();
        assert_eq!(payload.id, 42);
        assert_eq!(payload.email, "first1.last1@email.com");
        assert_eq!(payload.name, "First1 Last1");
        assert_eq!(payload.roles, vec!["basic".to_string()]);
        assert!(payload.expires > payload.created);
        assert_eq!(payload.expires - payload.created, 7 * 24 * 60 * 60);
    }

    #[test]
    fn tampered_signature_never_yields_a_payload() {
        let service = TokenService::new(&security(7)).unwrap();
        let token = service.create_token(&identity()).unwrap();
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(matches!(
            service.view_token(&tampered),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn foreign_signing_key_is_rejected() {
        let service = TokenService::new(&security(7)).unwrap();
        let mut other_cfg = security(7);
        other_cfg.jwt_key = "some-other-key".to_string();
        let other = TokenService::new(&other_cfg).unwrap();
        let token = other.create_token(&identity()).unwrap();
        assert!(service.view_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_distinguishable_from_malformed() {
        let service = TokenService::new(&security(-1)).unwrap();
        let token = service.create_token(&identity()).unwrap();
        // signature still verifies
        assert!(service.view_token(&token).is_ok());
        assert!(matches!(service.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn fresh_token_passes_verify() {
        let service = TokenService::new(&security(7)).unwrap();
        let token = service.create_token(&identity()).unwrap();
        assert!(service.verify(&token).is_ok());
    }
}
