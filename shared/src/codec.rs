//! Length-prefixed codec for the radio link
//!
//! Every payload crosses the radio link as one frame:
//! ```text
//! [ 4 bytes: length (u32, big-endian) ][ N bytes: JSON object ]
//! ```
//!
//! Serial modems and the simulated TCP link are both byte streams, so the
//! prefix is what preserves payload boundaries.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::Payload;

/// Maximum frame body (64 KiB); sensor readings are far smaller
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Payload too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    PayloadTooLarge(usize),

    #[error("Invalid frame length prefix: {0}")]
    InvalidLength(u32),

    #[error("Payload JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a payload into a length-prefixed frame
pub fn encode(payload: &Payload) -> Result<Bytes, CodecError> {
    let body = payload.to_vec()?;

    if body.len() > MAX_FRAME_SIZE as usize {
        return Err(CodecError::PayloadTooLarge(body.len()));
    }

    let mut buf = BytesMut::with_capacity(4 + body.len());
    buf.put_u32(body.len() as u32);
    buf.put_slice(&body);

    Ok(buf.freeze())
}

/// Try to decode one frame from the front of `buf`
///
/// Returns:
/// - `Ok(Some(payload))` if a complete frame was decoded and consumed
/// - `Ok(None)` if more data is needed (nothing is consumed)
/// - `Err(...)` if the data is invalid
pub fn decode(buf: &mut BytesMut) -> Result<Option<Payload>, CodecError> {
    if buf.len() < 4 {
        return Ok(None);
    }

    // Peek without consuming
    let frame_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);

    if frame_len > MAX_FRAME_SIZE {
        return Err(CodecError::InvalidLength(frame_len));
    }

    let total_len = 4 + frame_len as usize;
    if buf.len() < total_len {
        return Ok(None);
    }

    buf.advance(4);
    let body = buf.split_to(frame_len as usize);

    Ok(Some(Payload::from_slice(&body)?))
}

/// Streaming decoder for a radio byte stream
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Partial frame data being accumulated
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Add received bytes to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next frame from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete frames
    pub fn decode_next(&mut self) -> Result<Option<Payload>, CodecError> {
        decode(&mut self.buffer)
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> Payload {
        let mut payload = Payload::new();
        payload.insert("sensor", "soil-moisture");
        payload.insert("value", 41.5);
        payload
    }

    #[test]
    fn test_encode_then_decode() {
        let original = reading();
        let encoded = encode(&original).expect("encode failed");

        let len_prefix = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        assert_eq!(len_prefix as usize, encoded.len() - 4);

        let mut buf = BytesMut::from(&encoded[..]);
        let decoded = decode(&mut buf).expect("decode failed").expect("no frame");

        assert_eq!(decoded, original);
        assert!(buf.is_empty(), "buffer should be empty after decode");
    }

    #[test]
    fn test_partial_decode() {
        let encoded = encode(&reading()).expect("encode failed");

        let mut buf = BytesMut::from(&encoded[..5]);
        let result = decode(&mut buf).expect("decode should not fail on partial data");
        assert!(result.is_none(), "should return None for partial data");

        // Nothing consumed
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_frame_decoder_chunks() {
        let encoded = encode(&reading()).expect("encode failed");
        let mut decoder = FrameDecoder::new();

        decoder.extend(&encoded[..3]);
        assert!(decoder.decode_next().expect("decode error").is_none());

        decoder.extend(&encoded[3..]);
        let decoded = decoder
            .decode_next()
            .expect("decode error")
            .expect("should have frame");

        assert_eq!(decoded.get("sensor"), reading().get("sensor"));
        assert_eq!(decoder.buffer_len(), 0);
    }

    #[test]
    fn test_multiple_frames() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encode(&reading()).expect("encode failed"));
        decoder.extend(&encode(&Payload::new()).expect("encode failed"));

        assert!(decoder.decode_next().expect("decode error").is_some());
        assert!(decoder.decode_next().expect("decode error").is_some());
        assert!(decoder.decode_next().expect("decode error").is_none());
    }

    #[test]
    fn test_frame_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAX_FRAME_SIZE + 1);
        buf.put_bytes(0, 100);

        let result = decode(&mut buf);
        assert!(matches!(result, Err(CodecError::InvalidLength(_))));
    }

    #[test]
    fn test_frame_body_not_an_object() {
        let mut buf = BytesMut::new();
        buf.put_u32(3);
        buf.put_slice(b"[1]");

        assert!(matches!(decode(&mut buf), Err(CodecError::Json(_))));
    }
}
