//! Local token parsing, integrity verification, and encoding.

use crate::error::{TokenError, TokenResult};
use crate::payload::LicensePayload;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of dot-separated segments in a local token.
pub const SEGMENT_COUNT: usize = 5;

/// Standard alphabet, padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A structurally valid local token whose integrity hash has been checked.
///
/// Holding a `LocalToken` says nothing about freshness or about `hash1`,
/// which the client cannot verify.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalToken {
    raw: String,
    segments: [String; SEGMENT_COUNT],
}

impl LocalToken {
    /// Parses a token and verifies its integrity hash.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NotFound`] for a blank token,
    /// [`TokenError::InvalidFormat`] unless there are exactly five segments, and
    /// [`TokenError::IntegrityCheckFailed`] if the payload hash does not match.
    pub fn parse(raw: &str) -> TokenResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TokenError::NotFound);
        }

        let parts: Vec<&str> = raw.split('.').collect();
        let segments: [String; SEGMENT_COUNT] = match parts.as_slice() {
            [random1, hash1, payload, hash2, random2] => [
                (*random1).to_string(),
                (*hash1).to_string(),
                (*payload).to_string(),
                (*hash2).to_string(),
                (*random2).to_string(),
            ],
            _ => return Err(TokenError::InvalidFormat),
        };

        if integrity_hash(&segments[1], &segments[2]) != segments[3] {
            return Err(TokenError::IntegrityCheckFailed);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Builds a token for `payload` with random padding segments.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if `hash1` contains a dot or the payload
    /// cannot be serialized.
    pub fn encode(hash1: &str, payload: &LicensePayload) -> TokenResult<Self> {
        let random1 = uuid::Uuid::new_v4().simple().to_string();
        let random2 = uuid::Uuid::new_v4().simple().to_string();
        Self::encode_with_padding(&random1, hash1, payload, &random2)
    }

    /// Builds a token with explicit padding segments.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if any segment contains a dot or the
    /// payload cannot be serialized.
    pub fn encode_with_padding(
        random1: &str,
        hash1: &str,
        payload: &LicensePayload,
        random2: &str,
    ) -> TokenResult<Self> {
        for (name, segment) in [("random1", random1), ("hash1", hash1), ("random2", random2)] {
            if segment.contains('.') {
                return Err(TokenError::Encode(format!("{name} must not contain '.'")));
            }
        }

        let json = serde_json::to_vec(payload).map_err(|e| TokenError::Encode(e.to_string()))?;
        let encoded = STANDARD.encode(json);
        let hash2 = integrity_hash(hash1, &encoded);
        let segments = [
            random1.to_string(),
            hash1.to_string(),
            encoded,
            hash2,
            random2.to_string(),
        ];

        Ok(Self {
            raw: segments.join("."),
            segments,
        })
    }

    /// Decodes the embedded payload.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Decode`] if the payload segment is not base64 of a
    /// JSON object. The object's field types are never a decode failure.
    pub fn decode_payload(&self) -> TokenResult<LicensePayload> {
        let bytes = LENIENT
            .decode(self.encoded_payload())
            .map_err(|e| TokenError::Decode(format!("invalid payload base64: {e}")))?;

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| TokenError::Decode(format!("invalid payload JSON: {e}")))?;

        match value {
            serde_json::Value::Object(fields) => Ok(LicensePayload::from(fields)),
            _ => Err(TokenError::Decode("payload is not a JSON object".to_string())),
        }
    }

    /// Returns the full token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Consumes the token, returning the full token string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.raw
    }

    /// Returns the server signature segment.
    #[must_use]
    pub fn hash1(&self) -> &str {
        &self.segments[1]
    }

    /// Returns the base64 payload segment.
    #[must_use]
    pub fn encoded_payload(&self) -> &str {
        &self.segments[2]
    }

    /// Returns the integrity hash segment.
    #[must_use]
    pub fn hash2(&self) -> &str {
        &self.segments[3]
    }

    /// Returns the two padding segments.
    #[must_use]
    pub fn padding(&self) -> (&str, &str) {
        (&self.segments[0], &self.segments[4])
    }

    /// A short, non-secret identifier for log lines.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let hash2 = self.hash2();
        &hash2[..hash2.len().min(12)]
    }
}

impl fmt::Debug for LocalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalToken")
            .field("id", &self.short_id())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for LocalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for LocalToken {
    type Err = TokenError;

    fn from_str(s: &str) -> TokenResult<Self> {
        Self::parse(s)
    }
}

/// Computes the integrity hash: lowercase hex SHA-256 of `hash1` followed by
/// the encoded payload.
#[must_use]
pub fn integrity_hash(hash1: &str, encoded_payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(hash1.as_bytes());
    hasher.update(encoded_payload.as_bytes());
    hex::encode(hasher.finalize())
}
