//! Gemini `generateContent` provider.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use stowaway_core::{DetectedItem, Result, VisionAnalyzer};

use crate::parse::parse_detections;
use crate::runtime::block_on;
use crate::types::{VisionConfig, VisionError};

const PROMPT: &str = "Identify every item in this image. Read labels (like 'Tylenol', \
'Neosporin', 'Band-aids') to be specific. Return a clean JSON array of items with 'name', \
'category' (e.g. Medicine, Electronics, Clothing, Kitchen), and estimated 'quantity' (number). \
Do not include generic background items (like 'table', 'floor'). Example output format: \
[{\"name\": \"Advil Liqui-Gels\", \"category\": \"Medicine\", \"quantity\": 1}, \
{\"name\": \"AA Batteries\", \"category\": \"Electronics\", \"quantity\": 4}] \
Return ONLY the JSON array. Do not use Markdown formatting.";

pub struct GeminiProvider {
    http: Client,
    config: VisionConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: VisionConfig) -> std::result::Result<Self, VisionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(VisionError::from)?;
        Ok(Self { http, config })
    }

    async fn generate(&self, image_jpeg: &[u8]) -> std::result::Result<String, VisionError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": PROMPT },
                    {
                        "inline_data": {
                            "mime_type": "image/jpeg",
                            "data": BASE64.encode(image_jpeg),
                        }
                    }
                ]
            }]
        });
        let response = self
            .http
            .post(self.config.generate_url())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(VisionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        let reply: GenerateResponse =
            serde_json::from_str(&text).map_err(|err| VisionError::Request {
                message: err.to_string(),
            })?;
        reply_text(reply).ok_or(VisionError::EmptyReply)
    }
}

fn reply_text(reply: GenerateResponse) -> Option<String> {
    let parts = reply.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl VisionAnalyzer for GeminiProvider {
    /// Model or transport failures are errors; a reply that parses to
    /// nothing is an empty detection list.
    fn analyze(&self, image_jpeg: &[u8]) -> Result<Vec<DetectedItem>> {
        let text = block_on(self.generate(image_jpeg))?;
        tracing::debug!(len = text.len(), "model reply");
        Ok(parse_detections(&text))
    }
}
