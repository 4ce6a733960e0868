use bytes::Bytes;
use uuid::Uuid;

/// One AudioSocket message, either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Kind 0x00. The call is over; no payload.
    Hangup,
    /// Kind 0x01. Handshake message carrying the 16-byte call id.
    Id(Uuid),
    /// Kind 0x02. Silence keepalive; ignored by the session.
    Silence,
    /// Kind 0x10. Signed linear PCM payload.
    Audio(Bytes),
    /// Kind 0xff. Error report with a one-byte code; non-fatal.
    Error(u8),
}

impl Message {
    pub(super) const KIND_HANGUP: u8 = 0x00;
    pub(super) const KIND_ID: u8 = 0x01;
    pub(super) const KIND_SILENCE: u8 = 0x02;
    pub(super) const KIND_AUDIO: u8 = 0x10;
    pub(super) const KIND_ERROR: u8 = 0xff;
}
