//! Session token generation.

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Number of random bytes in a token.
pub const TOKEN_BYTES: usize = 32;

/// Length of an encoded token (two hex digits per byte).
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Generate a fresh session token.
///
/// Reads [`TOKEN_BYTES`] bytes from the operating system's CSPRNG and
/// returns them as lowercase hex, suitable for use as a cookie value.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Generation(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Check that a string has the shape of a token from [`generate_token`].
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Short prefix of a token for log fields.
pub(crate) fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_format() {
        let token = generate_token().unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(is_well_formed(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_token().unwrap()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_is_well_formed_rejects() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed(&"a".repeat(63)));
        assert!(!is_well_formed(&"a".repeat(65)));
        assert!(!is_well_formed(&"A".repeat(64)));
        assert!(!is_well_formed(&"g".repeat(64)));
        assert!(is_well_formed(&"0f".repeat(32)));
    }

    #[test]
    fn test_token_prefix() {
        assert_eq!(token_prefix("0123456789abcdef"), "01234567");
        assert_eq!(token_prefix("abc"), "abc");
    }
}
