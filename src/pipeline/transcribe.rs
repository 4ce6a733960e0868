use reqwest::Client;
use serde::Deserialize;

use crate::audio::Utterance;
use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Deserialize)]
struct TranscribeResponse {
    transcription: String,
}

/// Client for the transcription service: raw little-endian f32 samples in,
/// `{"transcription": "..."}` out. Any other response shape is an error and
/// the turn is abandoned; there is no retry.
pub struct TranscriptionClient {
    http: Client,
    url: String,
}

impl TranscriptionClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            url: config.transcribe_url.clone(),
        }
    }

    pub async fn transcribe(&self, utterance: &Utterance) -> Result<String> {
        let response = self
            .http
            .post(&self.url)
            .body(utterance.to_f32_le_bytes())
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Transcription(format!(
                "server returned {}",
                response.status()
            )));
        }

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;
        Ok(body.transcription)
    }
}
