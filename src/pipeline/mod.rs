//! One utterance's round trip: transcription, generation, synthesis.
//!
//! The pipeline is deliberately synchronous end-to-end: the owning call
//! session does not read caller audio while a turn is outstanding, so there
//! is never more than one in-flight turn per call.

mod bridge;
mod generate;
mod transcribe;

pub use bridge::{BridgeEvent, ControlMessage, SynthesisBridge};
pub use generate::GenerationClient;
pub use transcribe::TranscriptionClient;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::info;

use crate::audio::Utterance;
use crate::config::Config;
use crate::error::Result;

/// Output of one completed turn. The audio receiver yields reply chunks in
/// the order the synthesis bridge produced them and closes at end of audio.
pub struct TurnResult {
    pub transcript: String,
    pub reply: String,
    pub audio: mpsc::Receiver<Bytes>,
}

/// Seam between the call session and the collaborator round trip, so tests
/// can stub the whole pipeline without any network.
#[async_trait]
pub trait TurnPipeline: Send + Sync {
    async fn take_turn(&self, utterance: Utterance) -> Result<TurnResult>;
}

/// Production pipeline: HTTP transcription, Ollama generation, WebSocket
/// synthesis bridge. One shared HTTP client; per-call state lives elsewhere.
pub struct VoicePipeline {
    transcription: TranscriptionClient,
    generation: GenerationClient,
    bridge: SynthesisBridge,
}

impl VoicePipeline {
    pub fn new(config: Arc<Config>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            transcription: TranscriptionClient::new(http.clone(), &config),
            generation: GenerationClient::new(http, &config),
            bridge: SynthesisBridge::new(&config),
        }
    }
}

#[async_trait]
impl TurnPipeline for VoicePipeline {
    async fn take_turn(&self, utterance: Utterance) -> Result<TurnResult> {
        let transcript = self.transcription.transcribe(&utterance).await?;
        info!(frames = utterance.frame_count(), %transcript, "utterance transcribed");

        let reply = self.generation.generate(&transcript).await?;
        info!(%reply, "reply generated");

        let audio = self.bridge.stream_reply(&reply).await?;
        Ok(TurnResult {
            transcript,
            reply,
            audio,
        })
    }
}
