//! Identity and credential types for the relay protocol.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::TypesError;

/// Number of random bytes in a device token.
pub const TOKEN_BYTES: usize = 32;

/// A client-generated identifier for a Mac instance.
///
/// Opaque to the relay (the Mac app uses a UUID). Stable across relay
/// restarts, so it is the primary key of the device table.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns true if the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.short())
    }
}

/// Server-issued secret that authorizes polling.
///
/// 32 random bytes rendered as URL-safe base64 without padding. A fresh
/// token is minted on every registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    /// Mint a new random token from the OS RNG.
    pub fn generate() -> Result<Self, TypesError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::getrandom(&mut bytes).map_err(|e| TypesError::Random(e.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap a token received over the wire.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a presented token.
    pub fn matches(&self, presented: &DeviceToken) -> bool {
        constant_time_eq(&self.0, &presented.0)
    }
}

impl fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceToken(..)")
    }
}

/// SHA-256 hex digest of a user PIN.
///
/// The relay never sees the PIN itself; it stores whatever digest the Mac
/// registered and compares it with what the phone presents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinHash(String);

impl PinHash {
    /// Hash a PIN the way the phone page and the Mac app do.
    pub fn from_pin(pin: &str) -> Self {
        let digest = Sha256::digest(pin.as_bytes());
        Self(hex::encode(digest))
    }

    /// Wrap a digest received over the wire. Not validated.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// The digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the digest is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Constant-time comparison against a presented digest.
    pub fn matches(&self, presented: &PinHash) -> bool {
        constant_time_eq(&self.0, &presented.0)
    }
}

impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinHash(..)")
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_43_base64_chars() {
        let token = DeviceToken::generate().unwrap();
        assert_eq!(token.as_str().len(), 43); // 32 bytes = 43 base64 chars (no padding)
        assert!(!token.as_str().contains('='));
    }

    #[test]
    fn tokens_are_unique() {
        let a = DeviceToken::generate().unwrap();
        let b = DeviceToken::generate().unwrap();
        assert_ne!(a, b);
        assert!(!a.matches(&b));
        assert!(a.matches(&a.clone()));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = DeviceToken::new("super-secret");
        assert!(!format!("{:?}", token).contains("super-secret"));
    }

    #[test]
    fn pin_hash_is_sha256_hex() {
        // sha256("1234")
        let hash = PinHash::from_pin("1234");
        assert_eq!(
            hash.as_str(),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn pin_hash_matches_requires_exact_value() {
        let stored = PinHash::from_pin("1234");
        assert!(stored.matches(&PinHash::from_pin("1234")));
        assert!(!stored.matches(&PinHash::from_pin("4321")));
        assert!(!stored.matches(&PinHash::new("")));
    }

    #[test]
    fn device_id_short_truncates() {
        let id = DeviceId::new("0f8fad5b-d9cb-469f-a165-70867728950e");
        assert_eq!(id.short(), "0f8fad5b");
        assert_eq!(DeviceId::new("abc").short(), "abc");
        assert_eq!(format!("{:?}", id), "DeviceId(0f8fad5b)");
    }

    #[test]
    fn device_id_blank() {
        assert!(DeviceId::new("   ").is_blank());
        assert!(!DeviceId::new("d1").is_blank());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&DeviceId::new("d1")).unwrap();
        assert_eq!(json, "\"d1\"");
        let token: DeviceToken = serde_json::from_str("\"t1\"").unwrap();
        assert_eq!(token.as_str(), "t1");
    }
}
