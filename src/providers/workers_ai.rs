use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::Value;

use crate::core::error::ProviderError;
use crate::core::message::ChatTurn;
use crate::core::provider::{ChatBackend, ImageBackend};

fn run_url(api_base: &str, account_id: &str, model: &str) -> String {
    format!(
        "{}/accounts/{}/ai/run/{}",
        api_base.trim_end_matches('/'),
        account_id,
        model
    )
}

/// Text model on the Workers AI run endpoint.
pub struct WorkersAiChat {
    client: Client,
    run_url: String,
    api_token: String,
}

impl WorkersAiChat {
    pub fn new(api_base: &str, account_id: &str, api_token: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            run_url: run_url(api_base, account_id, model),
            api_token: api_token.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for WorkersAiChat {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ProviderError> {
        let body = serde_json::json!({ "messages": turns });

        let resp = self
            .client
            .post(&self.run_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        let reply = payload["result"]["response"]
            .as_str()
            .or_else(|| payload["response"].as_str())
            .unwrap_or_default();
        Ok(reply.to_string())
    }
}

/// Image model on the Workers AI run endpoint.
pub struct WorkersAiImage {
    client: Client,
    run_url: String,
    api_token: String,
}

impl WorkersAiImage {
    pub fn new(api_base: &str, account_id: &str, api_token: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            run_url: run_url(api_base, account_id, model),
            api_token: api_token.to_string(),
        }
    }
}

#[async_trait]
impl ImageBackend for WorkersAiImage {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let body = serde_json::json!({ "prompt": prompt });

        let resp = self
            .client
            .post(&self.run_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        extract_image_bytes(&content_type, &bytes)
    }
}

/// JSON field probes, tried in order. Each names the envelope it handles.
const JSON_PROBES: &[(&str, fn(&Value) -> Option<&str>)] = &[
    ("result.image", |v| v["result"]["image"].as_str()),
    ("image", |v| v["image"].as_str()),
    ("b64_json", |v| v["b64_json"].as_str()),
    ("data[0].b64_json", |v| v["data"][0]["b64_json"].as_str()),
    ("artifacts[0].base64", |v| v["artifacts"][0]["base64"].as_str()),
];

/// Normalize whatever byte shape the image model returned into raw image
/// bytes. Models disagree here: some reply with a binary body, others wrap
/// base64 in one of several JSON envelopes. Probes run in a fixed order and
/// the first one that yields decodable bytes wins.
pub fn extract_image_bytes(content_type: &str, body: &[u8]) -> Result<Vec<u8>, ProviderError> {
    if content_type.starts_with("image/") || content_type == "application/octet-stream" {
        return Ok(body.to_vec());
    }
    if looks_like_image(body) {
        return Ok(body.to_vec());
    }

    if let Ok(payload) = serde_json::from_slice::<Value>(body) {
        for (name, probe) in JSON_PROBES {
            if let Some(encoded) = probe(&payload) {
                match decode_base64_field(encoded) {
                    Ok(bytes) => {
                        tracing::debug!(probe = name, "image bytes found");
                        return Ok(bytes);
                    }
                    Err(err) => {
                        tracing::debug!(probe = name, error = %err, "field present but not base64");
                    }
                }
            }
        }
        return Err(ProviderError::UnrecognizedShape(describe_json(&payload)));
    }

    Err(ProviderError::UnrecognizedShape(format!(
        "{} bytes with content type {:?}",
        body.len(),
        content_type
    )))
}

fn looks_like_image(body: &[u8]) -> bool {
    body.starts_with(b"\x89PNG\r\n\x1a\n") || body.starts_with(&[0xff, 0xd8, 0xff])
}

fn decode_base64_field(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    // Some envelopes carry a data URL instead of bare base64.
    let encoded = encoded
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(encoded);
    BASE64.decode(encoded.trim())
}

fn describe_json(payload: &Value) -> String {
    match payload {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
            format!("JSON object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("JSON array of {} items", items.len()),
        Value::String(_) => "bare JSON string".into(),
        other => format!("JSON value: {other}"),
    }
}
