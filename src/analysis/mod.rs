pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::images::ImagePayload;
use crate::pr::PrDetails;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode Gemini response: {source}: {body}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },

    #[error("Gemini returned no text: {0}")]
    EmptyResponse(String),
}

/// A model that turns a pull request into a short review.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Human-readable name of the backing model (e.g., "gemini-2.0-flash")
    fn name(&self) -> &str;

    /// Review `pr`, attaching `images` as extra multimodal input when any are
    /// present. Returns the model's text, trimmed.
    async fn analyze(&self, pr: &PrDetails, images: &[ImagePayload]) -> Result<String, AnalysisError>;
}

/// Build the review instruction sent to the model.
///
/// The model is asked for exactly two lines; nothing downstream checks that
/// it complied.
pub fn build_prompt(pr: &PrDetails) -> String {
    format!(
        "You are a helpful code reviewer AI assistant. Analyze the following pull request and provide a concise, crisp response in exactly 2 lines.

Pull Request Title: {title}

Pull Request Description:
{description}

Repository: {repo}

Please provide:
1. A brief assessment of the PR (first line)
2. A specific suggestion or observation (second line)

Keep it short, professional, and actionable. Format as plain text, exactly 2 lines.",
        title = pr.title,
        description = pr.description,
        repo = pr.repo,
    )
}
