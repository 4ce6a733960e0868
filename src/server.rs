use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::audio::{UtteranceSegmenter, WebRtcDetector};
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::TurnPipeline;
use crate::session::CallSession;

/// AudioSocket listener. Accepts connections and hands each one to its own
/// task immediately; the accept loop never blocks on call processing, and no
/// call shares mutable state with another.
pub struct Server {
    config: Arc<Config>,
    pipeline: Arc<dyn TurnPipeline>,
}

impl Server {
    pub fn new(config: Arc<Config>, pipeline: Arc<dyn TurnPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        info!("listening for audiosocket connections on {}", self.config.listen_addr);

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("failed to accept connection: {e}");
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            let pipeline = Arc::clone(&self.pipeline);
            tokio::spawn(async move {
                let detector = match WebRtcDetector::new(config.sample_rate, config.vad_mode) {
                    Ok(detector) => detector,
                    Err(e) => {
                        warn!(%peer, "could not build vad for call: {e}");
                        return;
                    }
                };
                let segmenter =
                    UtteranceSegmenter::new(Box::new(detector), config.silence_threshold);

                let session = match CallSession::accept(
                    stream,
                    segmenter,
                    pipeline,
                    config.max_call_duration,
                )
                .await
                {
                    Ok(session) => session,
                    Err(e) => {
                        warn!(%peer, "{e}");
                        return;
                    }
                };

                let call_id = session.call_id();
                match session.run().await {
                    Ok(()) => info!(call = %call_id, "call finished"),
                    Err(e) if e.is_expected_close() => {
                        info!(call = %call_id, "call closed: {e}")
                    }
                    Err(e) => warn!(call = %call_id, "call failed: {e}"),
                }
            });
        }
    }
}
