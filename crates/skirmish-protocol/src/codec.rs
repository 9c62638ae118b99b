//! Codec trait and implementations for serializing messages.
//!
//! The rest of the stack only needs *something* implementing [`Codec`];
//! [`JsonCodec`] is the one the server and client use today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: a session clones its codec into the send loop while
///   the receive loop keeps using the original, and Tokio may run either
///   task on any worker thread.
/// - `'static`: the codec owns everything it needs, so it can be moved
///   into a spawned task.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value type rather than
/// fixed to [`Message`](crate::Message), so tests and tools can push any
/// serde type through the same codec. `decode` asks for
/// `DeserializeOwned`: the decoded value owns its data and the frame
/// buffer can be dropped straight away.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`). One message per
/// frame, readable in any WebSocket inspector.
///
/// ```rust
/// use skirmish_protocol::{Codec, JsonCodec, Message, MessageKind, PlayerNumber};
///
/// let codec = JsonCodec;
/// let msg = Message::to(PlayerNumber(1), MessageKind::Acknowledged);
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Message, MessageKind};

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<Message, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_unknown_kind_is_decode_error() {
        let raw = br#"{"context":"Broadcast","kind":{"type":"FlyToMoon"}}"#;
        let result: Result<Message, _> = JsonCodec.decode(raw);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encode_is_utf8_json() {
        let bytes = JsonCodec
            .encode(&Message::broadcast(MessageKind::Quit))
            .unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("\"Quit\""));
    }
}
