use sha2::{Digest, Sha512};

/// SHA-512 hex digest used for stored passwords.
pub fn digest(password: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(password.as_bytes());
    let out = hasher.finalize();
    out.iter().map(|b| format!("{b:02x}")).collect()
}
