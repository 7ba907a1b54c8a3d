use colored::Colorize;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Prefix placed in front of every posted analysis.
pub const COMMENT_LABEL: &str = "🤖 **AI Analysis:**\n\n";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to post comment: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to post comment. Status: {status}, response: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

/// The comment GitHub created. Fields stay empty when the 201 response body
/// could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostedComment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommentBody {
    body: String,
}

/// Posts issue comments through the GitHub REST API.
pub struct CommentPublisher {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl CommentPublisher {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    /// Post `analysis` as a new comment on PR `number` of `repo`.
    ///
    /// Only `201 Created` counts as success. The request is sent once. The
    /// response body is only used for logging, so a 201 with an unreadable
    /// body is still a success.
    #[instrument(skip(self, analysis), fields(chars = analysis.len()))]
    pub async fn publish(
        &self,
        repo: &str,
        number: u64,
        analysis: &str,
    ) -> Result<PostedComment, PublishError> {
        let url = format!("{}/repos/{}/issues/{}/comments", self.api_url, repo, number);
        let body = CommentBody {
            body: format_comment_body(analysis),
        };

        debug!(url = %url, "posting comment");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "pr-ai-review")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "GitHub rejected the comment");
            return Err(PublishError::UnexpectedStatus { status, body });
        }

        let comment = match response.text().await {
            Ok(text) => serde_json::from_str::<PostedComment>(&text).unwrap_or_else(|e| {
                warn!(error = %e, "comment created but response body was not understood");
                PostedComment::default()
            }),
            Err(e) => {
                warn!(error = %e, "comment created but response body could not be read");
                PostedComment::default()
            }
        };
        debug!(id = ?comment.id, "comment created");
        Ok(comment)
    }
}

/// The markdown body of the posted comment.
pub fn format_comment_body(analysis: &str) -> String {
    format!("{COMMENT_LABEL}{analysis}")
}

/// Echo the generated analysis to stdout so it shows up in the action log.
pub fn print_analysis(analysis: &str) {
    print!("{}", render_analysis(analysis));
}

fn render_analysis(analysis: &str) -> String {
    let rule = "─".repeat(60);
    format!(
        "\n{}\n{}\n{analysis}\n{}\n\n",
        "Generated Analysis:".bold(),
        rule.dimmed(),
        rule.dimmed()
    )
}
