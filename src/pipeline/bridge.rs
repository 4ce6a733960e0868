use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct BridgeRequest<'a> {
    message: &'a str,
    language: &'a str,
    speed: f32,
}

/// Informational JSON received from the bridge while audio streams.
#[derive(Debug, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl ControlMessage {
    pub fn is_end_of_audio(&self) -> bool {
        self.kind.as_deref() == Some("end_of_audio")
    }
}

/// The bridge interleaves JSON control messages and raw audio on one duplex
/// channel; the distinction is decided once here, at the protocol boundary.
#[derive(Debug)]
pub enum BridgeEvent {
    Control(ControlMessage),
    Audio(Bytes),
}

impl BridgeEvent {
    fn from_ws(message: WsMessage) -> Option<Self> {
        match message {
            WsMessage::Text(text) => match serde_json::from_str(&text) {
                Ok(control) => Some(BridgeEvent::Control(control)),
                Err(e) => {
                    warn!("discarding non-JSON text frame from bridge: {e}");
                    None
                }
            },
            WsMessage::Binary(data) => Some(BridgeEvent::Audio(Bytes::from(data))),
            _ => None,
        }
    }
}

/// WebSocket client for the synthesis/bridge service: one request per turn,
/// then a stream of reply audio chunks terminated by an `end_of_audio`
/// control message.
pub struct SynthesisBridge {
    url: String,
    language: String,
    speed: f32,
}

impl SynthesisBridge {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.bridge_url.clone(),
            language: config.reply_language.clone(),
            speed: config.speech_speed,
        }
    }

    /// Connects, submits the reply text, and returns a receiver yielding the
    /// bridge's audio chunks in arrival order. The receiver closes when the
    /// bridge signals end of audio or the connection drops.
    pub async fn stream_reply(&self, text: &str) -> Result<mpsc::Receiver<Bytes>> {
        let (mut socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| Error::Synthesis(format!("bridge connect failed: {e}")))?;

        let request = BridgeRequest {
            message: text,
            language: &self.language,
            speed: self.speed,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        socket
            .send(WsMessage::Text(body))
            .await
            .map_err(|e| Error::Synthesis(format!("bridge send failed: {e}")))?;

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            while let Some(next) = socket.next().await {
                let message = match next {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("bridge stream error: {e}");
                        break;
                    }
                };
                if matches!(message, WsMessage::Close(_)) {
                    break;
                }
                match BridgeEvent::from_ws(message) {
                    Some(BridgeEvent::Control(control)) if control.is_end_of_audio() => {
                        debug!("bridge signalled end of audio");
                        break;
                    }
                    Some(BridgeEvent::Control(control)) => {
                        debug!(?control, "bridge control message");
                    }
                    Some(BridgeEvent::Audio(chunk)) => {
                        // Receiver dropped means the call is gone.
                        if tx.send(chunk).await.is_err() {
                            break;
                        }
                    }
                    None => {}
                }
            }
        });
        Ok(rx)
    }
}
