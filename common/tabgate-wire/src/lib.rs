//! The gateway's framing, shared by the browser stdio channel and every
//! client socket: a 4-byte little-endian length, then that many bytes of
//! UTF-8 JSON carrying a [`Message`] envelope.  The header format is the
//! browser's native-messaging convention and is not negotiable.
//!
//! The codec is stateless per direction.  Concurrent writes to one stream
//! must be serialized by the caller; the services in this crate give every
//! stream exactly one writer task.

use tabgate_api::message::{Message, MessageError};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub mod bus;
pub mod message;
pub mod resource;
pub mod service;

/// Reads one frame.  Returns `Ok(None)` on a clean end-of-stream (EOF at a
/// frame boundary); an EOF mid-header or mid-body is [`WireError::FrameTruncated`].
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Message>, WireError> {
    let mut header = [0u8; 4];
    let mut filled = 0usize;
    while filled < header.len() {
        let count = reader.read(&mut header[filled..]).await?;
        if count == 0 {
            if filled == 0 {
                return Ok(None);
            }

            return Err(WireError::FrameTruncated);
        }
        filled += count;
    }

    let length = u32::from_le_bytes(header) as usize;
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::FrameTruncated
        } else {
            WireError::Io(err)
        }
    })?;

    let message = Message::from_slice(&body)?;
    Ok(Some(message))
}

/// Writes one frame.  The header and body are emitted as a single write, so
/// the caller observes atomic frame emission.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Message,
) -> Result<(), WireError> {
    let body = message.to_vec()?;
    let mut frame = Vec::with_capacity(body.len() + 4);
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);

    writer.write_all(&frame).await?;
    writer.flush().await?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("frame truncated mid-header or mid-body")]
    FrameTruncated,
    #[error("malformed frame body: {0}")]
    FrameMalformed(serde_json::Error),
    #[error("unknown message variant: {0}")]
    UnknownVariant(String),
    #[error("frame io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// Decode failures poison one frame, not the stream.  Readers log them
    /// and keep going; anything else tears the connection down.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            WireError::FrameMalformed(_) | WireError::UnknownVariant(_)
        )
    }
}

impl From<MessageError> for WireError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Json(err) => WireError::FrameMalformed(err),
            MessageError::UnknownVariant(name) => WireError::UnknownVariant(name),
        }
    }
}
