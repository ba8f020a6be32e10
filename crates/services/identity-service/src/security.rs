//! Token, TOTP and backup-code primitives.
//!
//! TOTP follows RFC 6238 with HMAC-SHA256, a 30 second step and six digits.
//! Secrets travel base32 encoded (RFC 4648, no padding) so authenticator apps
//! can import them from the `otpauth://` URI.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use domain::{
    BACKUP_CODE_COUNT, BACKUP_CODE_LENGTH, REFRESH_TOKEN_BYTES, TOTP_DIGITS, TOTP_ISSUER,
    TOTP_SECRET_BYTES, TOTP_SKEW_STEPS, TOTP_STEP_SECONDS,
};

type HmacSha256 = Hmac<Sha256>;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Characters escaped in `otpauth://` label and issuer components
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@');

// =============================================================================
// Opaque tokens
// =============================================================================

/// Generate a random refresh token (hex encoded).
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest used to store tokens and backup codes at rest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Backup codes
// =============================================================================

/// Generate the plaintext backup codes shown once at setup.
pub fn generate_backup_codes() -> Vec<String> {
    (0..BACKUP_CODE_COUNT)
        .map(|_| {
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(BACKUP_CODE_LENGTH)
                .map(|b| char::from(b).to_ascii_uppercase())
                .collect()
        })
        .collect()
}

/// Hash a backup code. Case, whitespace and dashes are ignored.
pub fn hash_backup_code(code: &str) -> String {
    let normalized: String = code
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    hash_token(&normalized)
}

// =============================================================================
// TOTP
// =============================================================================

/// Generate a new base32 TOTP secret.
pub fn generate_totp_secret() -> String {
    let mut bytes = [0u8; TOTP_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base32_encode(&bytes)
}

/// Build the provisioning URI for authenticator apps.
pub fn otpauth_uri(account: &str, secret: &str) -> String {
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm=SHA256&digits={digits}&period={period}",
        issuer = utf8_percent_encode(TOTP_ISSUER, URI_COMPONENT),
        account = utf8_percent_encode(account, URI_COMPONENT),
        secret = secret,
        digits = TOTP_DIGITS,
        period = TOTP_STEP_SECONDS,
    )
}

/// Compute the code for a time step counter.
pub fn totp_code(secret: &[u8], counter: u64) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = binary % 10u32.pow(TOTP_DIGITS);
    Some(format!("{:0width$}", code, width = TOTP_DIGITS as usize))
}

/// Check a submitted code against the secret, allowing one step of drift.
pub fn verify_totp(secret: &str, code: &str, now: DateTime<Utc>) -> bool {
    let code = code.trim();
    if code.len() != TOTP_DIGITS as usize || !code.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let Some(key) = base32_decode(secret) else {
        return false;
    };

    let current = now.timestamp().div_euclid(TOTP_STEP_SECONDS);
    (-TOTP_SKEW_STEPS..=TOTP_SKEW_STEPS).any(|skew| {
        let step = current + skew;
        step >= 0
            && totp_code(&key, step as u64)
                .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(code.as_bytes())))
    })
}

// =============================================================================
// Base32
// =============================================================================

pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

pub fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for c in input.trim_end_matches('=').chars() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a as char == c.to_ascii_uppercase())? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_base32_known_vector() {
        assert_eq!(base32_encode(b"foobar"), "MZXW6YTBOI");
        assert_eq!(base32_decode("MZXW6YTBOI").unwrap(), b"foobar");
        assert_eq!(base32_decode("mzxw6ytboi").unwrap(), b"foobar");
        assert!(base32_decode("not base32!").is_none());
    }

    #[test]
    fn test_rfc6238_sha256_vector() {
        // RFC 6238 appendix B, SHA-256 seed, T = 59s
        let seed = b"12345678901234567890123456789012";
        let code = totp_code(seed, 1).unwrap();
        assert_eq!(code, "119246");
    }

    #[test]
    fn test_verify_totp_accepts_adjacent_step() {
        let secret = generate_totp_secret();
        let key = base32_decode(&secret).unwrap();
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let step = (now.timestamp() / TOTP_STEP_SECONDS) as u64;

        let current = totp_code(&key, step).unwrap();
        let previous = totp_code(&key, step - 1).unwrap();
        let stale = totp_code(&key, step - 3).unwrap();

        assert!(verify_totp(&secret, &current, now));
        assert!(verify_totp(&secret, &previous, now));
        if stale != current && stale != previous {
            assert!(!verify_totp(&secret, &stale, now));
        }
        assert!(!verify_totp(&secret, "12ab56", now));
    }

    #[test]
    fn test_refresh_token_shape() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert_ne!(token, generate_refresh_token());
        assert_eq!(hash_token(&token).len(), 64);
    }

    #[test]
    fn test_backup_codes() {
        let codes = generate_backup_codes();
        assert_eq!(codes.len(), BACKUP_CODE_COUNT);
        assert!(codes.iter().all(|c| c.len() == BACKUP_CODE_LENGTH));
        let code = &codes[0];
        assert_eq!(hash_backup_code(code), hash_backup_code(&code.to_lowercase()));
    }

    #[test]
    fn test_otpauth_uri() {
        let uri = otpauth_uri("jane.doe@uni.edu", "ABCDEF");
        assert!(uri.starts_with("otpauth://totp/University:jane.doe@uni.edu?secret=ABCDEF"));
        assert!(uri.contains("algorithm=SHA256"));

        let spaced = otpauth_uri("jane doe+1@uni.edu", "ABCDEF");
        assert!(spaced.contains(":jane%20doe%2B1@uni.edu?"));
    }
}
