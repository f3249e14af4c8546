//! HTTP client for an Edge-style speech synthesis service.
//!
//! Sends SSML with a `<prosody>` element carrying the delta-formatted rate,
//! volume, and pitch strings, and writes the returned MP3 container bytes to
//! the requested path without inspecting them.

use super::{AudioSettings, SpeechSynthesizer, SynthesisError};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use std::path::Path;

/// Default synthesis endpoint (Microsoft Speech REST surface).
pub const DEFAULT_ENDPOINT: &str =
    "https://eastus.tts.speech.microsoft.com/cognitiveservices/v1";

/// Container format requested from the service.
const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// How much of an error body to carry into the error message.
const ERROR_BODY_LIMIT: usize = 256;

/// Network-backed synthesizer for one speech service endpoint.
pub struct EdgeSpeechClient {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EdgeSpeechClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeSpeechClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &AudioSettings,
        output_path: &Path,
    ) -> Result<(), SynthesisError> {
        let ssml = build_ssml(text, voice_id, settings);
        debug!(
            "requesting synthesis: voice={voice_id} rate={} volume={} pitch={} chars={}",
            settings.rate,
            settings.volume,
            settings.pitch,
            text.chars().count()
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .body(ssml);
        if let Some(key) = &self.api_key {
            request = request.header("Ocp-Apim-Subscription-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SynthesisError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Connection(e.to_string()))?;
        if audio.is_empty() {
            return Err(SynthesisError::Protocol(
                "service returned no audio".to_string(),
            ));
        }

        tokio::fs::write(output_path, &audio).await?;
        debug!("wrote {} bytes to {}", audio.len(), output_path.display());
        Ok(())
    }
}

/// Classify a non-success HTTP status into the synthesis taxonomy.
fn status_error(status: StatusCode, body: &str) -> SynthesisError {
    let body = body.trim();
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        format!("{status}: {snippet}")
    };
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SynthesisError::InvalidArgument(detail)
        }
        _ => SynthesisError::Protocol(detail),
    }
}

/// Build the SSML document for one chunk.
fn build_ssml(text: &str, voice_id: &str, settings: &AudioSettings) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{lang}'>\
         <voice name='{voice}'>\
         <prosody rate='{rate}' volume='{volume}' pitch='{pitch}'>{text}</prosody>\
         </voice>\
         </speak>",
        lang = voice_locale(voice_id),
        voice = escape_xml(voice_id),
        rate = settings.rate,
        volume = settings.volume,
        pitch = settings.pitch,
        text = escape_xml(text),
    )
}

/// Derive the `xml:lang` tag from a service voice id like
/// `pt-BR-AntonioNeural`.
fn voice_locale(voice_id: &str) -> String {
    let mut parts = voice_id.splitn(3, '-');
    match (parts.next(), parts.next()) {
        (Some(lang), Some(region)) if !lang.is_empty() && !region.is_empty() => {
            format!("{lang}-{region}")
        }
        _ => "en-US".to_string(),
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
