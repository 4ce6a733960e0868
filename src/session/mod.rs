//! Per-connection call lifecycle: handshake, read loop, turn dispatch, and
//! the reply audio path back to the caller.

use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{timeout_at, Duration, Instant};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::{AudioFrame, UtteranceSegmenter, Utterance};
use crate::error::{Error, Result};
use crate::pipeline::TurnPipeline;
use crate::transport::{AudioSocketCodec, Message, SLIN_CHUNK_SIZE};

/// One active call. Exclusively owned by its serving task; created on accept,
/// gone on hangup, transport error, deadline expiry, or handshake failure.
pub struct CallSession<T> {
    conn: Framed<T, AudioSocketCodec>,
    call_id: Uuid,
    segmenter: UtteranceSegmenter,
    pipeline: Arc<dyn TurnPipeline>,
    deadline: Instant,
}

impl<T> CallSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Performs the AudioSocket handshake: the first message on a new
    /// connection must carry the call id. The call deadline starts here.
    pub async fn accept(
        io: T,
        segmenter: UtteranceSegmenter,
        pipeline: Arc<dyn TurnPipeline>,
        max_duration: Duration,
    ) -> Result<Self> {
        let mut conn = Framed::new(io, AudioSocketCodec);
        let deadline = Instant::now() + max_duration;

        let call_id = match timeout_at(deadline, conn.next()).await {
            Err(_) => return Err(Error::Handshake("timed out waiting for call id".into())),
            Ok(None) => return Err(Error::Handshake("connection closed before call id".into())),
            Ok(Some(Err(e))) => return Err(Error::Handshake(e.to_string())),
            Ok(Some(Ok(Message::Id(id)))) => id,
            Ok(Some(Ok(other))) => {
                return Err(Error::Handshake(format!(
                    "expected id message, got {other:?}"
                )))
            }
        };

        Ok(Self {
            conn,
            call_id,
            segmenter,
            pipeline,
            deadline,
        })
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// Drives the call until a terminal condition. Content-level faults (one
    /// bad frame, one failed turn) are logged and skipped; only
    /// connection-level faults and the deadline end the loop.
    pub async fn run(mut self) -> Result<()> {
        info!(call = %self.call_id, "processing call");

        loop {
            let message = match timeout_at(self.deadline, self.conn.next()).await {
                Err(_) => {
                    info!(call = %self.call_id, "max call duration reached, closing");
                    return Err(Error::DeadlineExceeded);
                }
                Ok(None) => {
                    info!(call = %self.call_id, "transport closed by peer");
                    return Err(Error::TransportClosed);
                }
                // Framing is unrecoverable once the decoder loses position.
                Ok(Some(Err(e))) => return Err(Error::Io(e)),
                Ok(Some(Ok(message))) => message,
            };

            match message {
                Message::Hangup => {
                    info!(call = %self.call_id, "hangup received");
                    if self.segmenter.is_accumulating() {
                        debug!(call = %self.call_id, "discarding partial utterance at hangup");
                    }
                    return Ok(());
                }
                Message::Error(code) => {
                    warn!(call = %self.call_id, code, "error message from transport");
                }
                Message::Silence => {}
                Message::Id(id) => {
                    warn!(call = %self.call_id, unexpected = %id, "duplicate id message ignored");
                }
                Message::Audio(payload) => {
                    if payload.is_empty() {
                        debug!(call = %self.call_id, "empty audio payload skipped");
                        continue;
                    }
                    let frame = match AudioFrame::decode(&payload) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(call = %self.call_id, "skipping frame: {e}");
                            continue;
                        }
                    };
                    if let Some(utterance) = self.segmenter.push(frame) {
                        self.take_turn(utterance).await?;
                    }
                }
            }
        }
    }

    /// Runs one turn and streams its reply back, chunked to the transport
    /// frame size, before the read loop resumes. A failed turn is abandoned;
    /// the caller simply speaks again.
    async fn take_turn(&mut self, utterance: Utterance) -> Result<()> {
        info!(
            call = %self.call_id,
            frames = utterance.frame_count(),
            ms = utterance.duration_ms(),
            "dispatching utterance"
        );

        let mut result = match self.pipeline.take_turn(utterance).await {
            Ok(result) => result,
            Err(e) => {
                warn!(call = %self.call_id, "turn abandoned: {e}");
                return Ok(());
            }
        };

        let mut written = 0usize;
        while let Some(chunk) = result.audio.recv().await {
            for part in chunk.chunks(SLIN_CHUNK_SIZE) {
                self.conn
                    .send(Message::Audio(Bytes::copy_from_slice(part)))
                    .await?;
                written += 1;
            }
        }
        debug!(call = %self.call_id, frames = written, "reply audio streamed");
        Ok(())
    }
}
