use std::env;
use std::time::Duration;

/// Immutable process configuration, built once in `main` and shared by every
/// call session. Nothing here is mutated after startup; sessions receive it
/// behind an `Arc` so tests can construct their own isolated instances.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address the AudioSocket listener binds to.
    pub listen_addr: String,
    /// HTTP endpoint receiving raw f32-LE samples, returning `{"transcription": ...}`.
    pub transcribe_url: String,
    /// Base URL of the Ollama-compatible generation server.
    pub ollama_url: String,
    /// Model passed to the generation server.
    pub generate_model: String,
    /// Persona directive sent with every generation request.
    pub system_prompt: String,
    /// WebSocket URI of the synthesis bridge.
    pub bridge_url: String,
    /// Language tag forwarded to the synthesis bridge.
    pub reply_language: String,
    /// Speech rate forwarded to the synthesis bridge.
    pub speech_speed: f32,
    /// Hard cap on call length; the session closes when it elapses.
    pub max_call_duration: Duration,
    /// Narrowband slin rate expected on the wire.
    pub sample_rate: u32,
    /// webrtc-vad aggressiveness, 0 (quality) through 3 (very aggressive).
    pub vad_mode: u8,
    /// Consecutive silent frames tolerated inside an utterance before it is
    /// emitted. 6 frames of 20 ms each is 120 ms of trailing silence.
    pub silence_threshold: u32,
    /// Per-request timeout on the transcription and generation hops.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9092".into(),
            transcribe_url: "http://127.0.0.1:8002/complete_transcribe_r".into(),
            ollama_url: "http://127.0.0.1:11434".into(),
            generate_model: "gemma2:9b".into(),
            system_prompt: "You are a concise voice assistant. Answer in one or two \
                            sentences and at most 180 characters."
                .into(),
            bridge_url: "ws://127.0.0.1:8001/ws".into(),
            reply_language: "ru".into(),
            speech_speed: 1.0,
            max_call_duration: Duration::from_secs(120),
            sample_rate: 8000,
            vad_mode: 3,
            silence_threshold: 6,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Defaults overridden by `VOXGATE_*` environment variables where set.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        override_str("VOXGATE_LISTEN_ADDR", &mut cfg.listen_addr);
        override_str("VOXGATE_TRANSCRIBE_URL", &mut cfg.transcribe_url);
        override_str("VOXGATE_OLLAMA_URL", &mut cfg.ollama_url);
        override_str("VOXGATE_MODEL", &mut cfg.generate_model);
        override_str("VOXGATE_SYSTEM_PROMPT", &mut cfg.system_prompt);
        override_str("VOXGATE_BRIDGE_URL", &mut cfg.bridge_url);
        override_str("VOXGATE_REPLY_LANGUAGE", &mut cfg.reply_language);
        if let Some(v) = parse_env::<f32>("VOXGATE_SPEECH_SPEED") {
            cfg.speech_speed = v;
        }
        if let Some(v) = parse_env::<u64>("VOXGATE_MAX_CALL_SECS") {
            cfg.max_call_duration = Duration::from_secs(v);
        }
        if let Some(v) = parse_env::<u8>("VOXGATE_VAD_MODE") {
            cfg.vad_mode = v.min(3);
        }
        if let Some(v) = parse_env::<u32>("VOXGATE_SILENCE_THRESHOLD") {
            cfg.silence_threshold = v;
        }
        cfg
    }

    /// Samples per 20 ms frame at the configured rate.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate as usize * crate::transport::FRAME_MS) / 1000
    }
}

fn override_str(key: &str, slot: &mut String) {
    if let Ok(v) = env::var(key) {
        if !v.is_empty() {
            *slot = v;
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
