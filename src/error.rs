use thiserror::Error;

/// Fault taxonomy for one call.
///
/// Content-level faults (a bad frame, a failed turn) are isolated to that
/// frame or turn by the session loop. Only connection-level faults
/// (`Handshake`, `TransportClosed`, `DeadlineExceeded`, `Io`) end a call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed audio payload: {0}")]
    MalformedAudio(String),

    #[error("unsupported frame: {0}")]
    UnsupportedFrame(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The peer closed the stream. Expected termination, not a failure.
    #[error("transport closed")]
    TransportClosed,

    #[error("call deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the terminations a healthy call is allowed to end with.
    pub fn is_expected_close(&self) -> bool {
        matches!(self, Error::TransportClosed | Error::DeadlineExceeded)
    }
}
