//! Decoding of inbound image payloads.
//!
//! Clients send images inline in JSON bodies, either as a data URL
//! (`data:image/png;base64,<data>`) or as a bare base64 string.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use super::AssetError;

/// Standard alphabet; trailing `=` padding is optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode an image payload into raw bytes.
///
/// Returns `Ok(None)` for an empty payload. Anything else must decode to at
/// least one byte and at most `max_size` bytes.
pub fn decode(payload: &str, max_size: u64) -> Result<Option<Vec<u8>>, AssetError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }

    let encoded = if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| AssetError::InvalidAsset("data URL has no payload".to_string()))?
    } else {
        payload
    };

    let bytes = LENIENT
        .decode(encoded.trim())
        .map_err(|e| AssetError::InvalidAsset(format!("image is not valid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(AssetError::InvalidAsset("image payload is empty".to_string()));
    }

    if bytes.len() as u64 > max_size {
        return Err(AssetError::TooLarge { max_size });
    }

    Ok(Some(bytes))
}
