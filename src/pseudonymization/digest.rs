//! Salted SHA-256 digest used as the pseudonym

use sha2::{Digest, Sha256};

/// Length of a pseudonym in hex characters
pub const PSEUDONYM_LEN: usize = 64;

/// Hex-encoded SHA-256 of `value` followed by `salt`
///
/// # Examples
///
/// ```
/// use veil::pseudonymization::digest::{digest, PSEUDONYM_LEN};
///
/// let pseudonym = digest("10.0.0.1", "salt");
/// assert_eq!(pseudonym.len(), PSEUDONYM_LEN);
/// assert_eq!(pseudonym, digest("10.0.0.1", "salt"));
/// ```
pub fn digest(value: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.update(salt.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_value_then_salt() {
        // SHA-256("abc")
        assert_eq!(
            digest("ab", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_depends_on_salt() {
        assert_ne!(digest("10.0.0.1", "a"), digest("10.0.0.1", "b"));
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let out = digest("device-1", "salt");
        assert_eq!(out.len(), PSEUDONYM_LEN);
        assert!(out.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
