//! Device frame decoding
//!
//! A frame is a JSON object with numeric `ax`, `ay`, `az`. Integers count as
//! numbers; extra fields are ignored. Anything else is a `DecodeError`.

use serde::Deserialize;
use thiserror::Error;

/// Decoded accelerometer frame
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ImuFrame {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
}

/// A frame that could not be turned into an `ImuFrame`
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not UTF-8 text
    #[error("frame is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Empty or whitespace-only payload
    #[error("empty frame")]
    Empty,

    /// Not JSON, missing a field, or a field of the wrong type
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode one raw frame
pub fn decode_frame(payload: &[u8]) -> Result<ImuFrame, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}
