use async_trait::async_trait;

use crate::config::AppSettings;

/// Instruction sent alongside the report image.
pub const ANALYSIS_PROMPT: &str = r#"ROLE: Clinical Data Scientist.
TASK: Identify biomarkers from this blood report image.
OUTPUT: Return ONLY a JSON object with keys:
- "biomarkers": array of {"parameter", "result", "range", "status"}, all strings, in the order they appear on the report
- "docsNote": simple English explanation
- "hindiSummary": 3 sentences in Hindi
- "actionableSteps": 3 lifestyle tips
- "nutritionPlan": 3 specific food recommendations based on the analysis
- "risk": red alert message if anything is life-threatening, else null
No markdown, no commentary."#;

/// Text-generation backend that turns a report image into raw text.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn request_analysis(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("GEMINI_API_KEY not set. Configure it in .env or settings.json.")]
    MissingApiKey,
    #[error("Gemini API request failed: {0}")]
    Transport(String),
    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("No text in Gemini response")]
    EmptyResponse,
}

impl GatewayError {
    /// Quota / rate-limit failure, as opposed to a generic failure.
    ///
    /// The HTTP status decides when there is one. Otherwise the error text
    /// is inspected, for backends that only report the limit in prose.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GatewayError::Api { status: 429, .. } => true,
            GatewayError::Api { body, .. } => mentions_rate_limit(body),
            GatewayError::Transport(message) => mentions_rate_limit(message),
            GatewayError::MissingApiKey | GatewayError::EmptyResponse => false,
        }
    }
}

fn mentions_rate_limit(text: &str) -> bool {
    let lowered = text.to_ascii_lowercase();
    lowered.contains("429") || lowered.contains("resource_exhausted") || lowered.contains("quota")
}

/// Google Gemini `generateContent` gateway.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGateway {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// A placeholder key counts as no key, so it is never sent upstream.
    pub fn from_settings(settings: &AppSettings) -> Self {
        let api_key = if settings.gemini_configured() {
            settings.gemini_api_key.as_str()
        } else {
            ""
        };
        Self::new(
            api_key,
            &settings.gemini_model,
            &settings.gemini_base_url,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn request_analysis(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": image_base64
                        }
                    },
                    { "text": prompt }
                ]
            }],
            "generationConfig": {
                "temperature": 0.1,
                "maxOutputTokens": 4096
            }
        });

        let response = self
            .client
            .post(format!("{}?key={}", self.endpoint(), self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, body });
        }

        let gemini_response: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to read Gemini response: {}", e)))?;

        response_text(&gemini_response).ok_or(GatewayError::EmptyResponse)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: &serde_json::Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    (!text.trim().is_empty()).then_some(text)
}
