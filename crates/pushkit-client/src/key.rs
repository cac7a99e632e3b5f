//! VAPID key conversion
//!
//! The server hands the page its VAPID public key as unpadded base64url;
//! `pushManager.subscribe` wants the raw bytes.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};

use crate::PushError;

/// Standard alphabet, tolerant of non-zero trailing bits like `atob`
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Number of `=` needed to bring `len` to a multiple of four
pub fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Pad a base64url string and map it back onto the standard alphabet
pub fn to_standard_base64(base64_string: &str) -> String {
    let padding = "=".repeat(padding_for(base64_string.len()));
    format!("{}{}", base64_string, padding)
        .replace('-', "+")
        .replace('_', "/")
}

/// Decode a base64url VAPID key into raw bytes
pub fn url_base64_to_bytes(base64_string: &str) -> Result<Vec<u8>, PushError> {
    let base64 = to_standard_base64(base64_string);
    STANDARD_LENIENT
        .decode(base64.as_bytes())
        .map_err(|e| PushError::InvalidKey(e.to_string()))
}
