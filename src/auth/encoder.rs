use fernet::Fernet;
use serde::{de::DeserializeOwned, Serialize};

use super::AuthError;

/// Reversible symmetric cipher for the identity payload embedded in tokens.
/// Serializes with serde_json and encrypts with Fernet; decryption parses
/// strictly back into the expected shape and rejects anything else.
pub struct CredentialEncoder {
    fernet: Fernet,
}

impl CredentialEncoder {
    /// Fails when the key is absent or not a valid Fernet key.
    pub fn new(cryptographic_key: &str) -> Result<Self, AuthError> {
        if cryptographic_key.is_empty() {
            return Err(AuthError::MissingKey);
        }
        let fernet = Fernet::new(cryptographic_key).ok_or(AuthError::MissingKey)?;
        Ok(Self { fernet })
    }

    pub fn encrypt<T: Serialize>(&self, payload: &T) -> Result<String, AuthError> {
        let plain = serde_json::to_vec(payload)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;
        Ok(self.fernet.encrypt(&plain))
    }

    pub fn decrypt<T: DeserializeOwned>(&self, ciphertext: &str) -> Result<T, AuthError> {
        let plain = self
            .fernet
            .decrypt(ciphertext)
            .map_err(|_| AuthError::InvalidToken("payload decryption failed".to_string()))?;
        serde_json::from_slice(&plain)
            .map_err(|e| AuthError::InvalidToken(format!("payload is malformed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: i64,
        email: String,
    }

    fn encoder() -> CredentialEncoder {
        CredentialEncoder::new(&Fernet::generate_key()).unwrap()
    }

    #[test]
    fn rejects_missing_or_garbage_keys() {
        assert!(matches!(
            CredentialEncoder::new(""),
            Err(AuthError::MissingKey)
        ));
        assert!(matches!(
            CredentialEncoder::new("not-a-fernet-key"),
            Err(AuthError::MissingKey)
        ));
    }

    #[test]
    fn encrypt_decrypt_round_trips() {
        let encoder = encoder();
        let sample = Sample {
            id: 7,
            email: "a@b.com".to_string(),
        };
        let ciphertext = encoder.encrypt(&sample).unwrap();
        assert_ne!(ciphertext, "");
        let back: Sample = encoder.decrypt(&ciphertext).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn tampered_ciphertext_fails_as_invalid() {
        let encoder = encoder();
        let sample = Sample {
            id: 1,
            email: "x@y.z".to_string(),
        };
        let mut ciphertext = encoder.encrypt(&sample).unwrap().into_bytes();
        let mid = ciphertext.len() / 2;
        ciphertext[mid] = if ciphertext[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(ciphertext).unwrap();
        let result: Result<Sample, _> = encoder.decrypt(&tampered);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn wrong_shape_is_rejected_not_evaluated() {
        let encoder = encoder();
        let ciphertext = encoder.encrypt(&serde_json::json!(["a", "list"])).unwrap();
        let result: Result<Sample, _> = encoder.decrypt(&ciphertext);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
