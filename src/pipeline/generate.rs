use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-compatible generation server. One-shot, no
/// streaming; the persona directive rides along as the system field.
pub struct GenerationClient {
    http: Client,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl GenerationClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.generate_model.clone(),
            system_prompt: config.system_prompt.clone(),
        }
    }

    pub async fn generate(&self, transcript: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: transcript,
            system: &self.system_prompt,
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "server returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(body.response.trim().to_string())
    }
}
