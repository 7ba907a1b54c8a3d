use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{build_prompt, AnalysisError, Analyzer};
use crate::images::ImagePayload;
use crate::pr::PrDetails;

/// Gemini `generateContent` client.
///
/// Sends one request per review: the prompt as a text part followed by one
/// inline-data part per image.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiAnalyzer {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn request_body<'a>(prompt: &'a str, images: &'a [ImagePayload]) -> GenerateRequest<'a> {
    let mut parts = vec![Part::Text { text: prompt }];
    parts.extend(images.iter().map(|image| Part::InlineData {
        inline_data: InlineData {
            mime_type: image.mime_type,
            data: BASE64_STANDARD.encode(&image.data),
        },
    }));
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

fn response_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, pr = pr.number, images = images.len()))]
    async fn analyze(&self, pr: &PrDetails, images: &[ImagePayload]) -> Result<String, AnalysisError> {
        let prompt = build_prompt(pr);
        let body = request_body(&prompt, images);

        debug!(prompt_chars = prompt.len(), "sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let raw = response.text().await?;
        let parsed = match serde_json::from_str::<GenerateResponse>(&raw) {
            Ok(parsed) => parsed,
            Err(source) => return Err(AnalysisError::Decode { source, body: raw }),
        };
        let text = response_text(parsed).ok_or(AnalysisError::EmptyResponse(raw))?;
        debug!(chars = text.len(), "received analysis");
        Ok(text)
    }
}
