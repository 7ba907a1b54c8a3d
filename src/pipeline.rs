use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};

use crate::analysis::gemini::GeminiAnalyzer;
use crate::analysis::{AnalysisError, Analyzer};
use crate::comment::{self, CommentPublisher, PublishError};
use crate::config::Config;
use crate::images;
use crate::pr::{self, PrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Pr(#[from] PrError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub repo: String,
    pub pr_number: u64,
    pub images_found: usize,
    pub images_attached: usize,
    /// `None` when GitHub's 201 response carried no readable comment ID
    pub comment_id: Option<u64>,
}

/// Load the event, review the PR and post the review as a comment.
///
/// Stops at the first fatal error. Nothing touches the network until the
/// event has been confirmed to describe a pull request.
pub async fn run(config: &Config) -> Result<RunSummary, PipelineError> {
    info!(path = %config.event_path.display(), "loading GitHub context");
    let event = pr::load_event(&config.event_path)?;

    info!("extracting PR details");
    let details = pr::extract_details(&event)?;
    info!(
        pr = details.number,
        repo = %details.repo,
        url = %details.url,
        title = %details.title,
        "found pull request"
    );

    let urls = images::locate(&details.description);
    let payloads = if urls.is_empty() {
        Vec::new()
    } else {
        info!(found = urls.len(), limit = config.max_images, "found images in PR description");
        let client = images::client(config.image_timeout).map_err(PipelineError::Client)?;
        images::fetch_all(&client, &urls, config.max_images, images::MAX_IMAGE_BYTES)
            .instrument(info_span!("fetch_images"))
            .await
    };
    debug!(
        attached = ?payloads.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
        "image payloads ready"
    );

    let analyzer = GeminiAnalyzer::new(
        api_client(config.gemini_timeout)?,
        &config.gemini_base_url,
        &config.model,
        &config.gemini_api_key,
    );
    info!(model = analyzer.name(), "analyzing PR");
    let analysis = analyzer.analyze(&details, &payloads).await?;
    comment::print_analysis(&analysis);

    info!("posting comment on PR");
    let publisher = CommentPublisher::new(
        api_client(config.github_timeout)?,
        &config.github_api_url,
        &config.github_token,
    );
    let posted = publisher
        .publish(&details.repo, details.number, &analysis)
        .await?;
    info!(comment_id = ?posted.id, url = posted.html_url.as_deref().unwrap_or(""), "posted comment");

    Ok(RunSummary {
        repo: details.repo,
        pr_number: details.number,
        images_found: urls.len(),
        images_attached: payloads.len(),
        comment_id: posted.id,
    })
}

fn api_client(timeout: std::time::Duration) -> Result<reqwest::Client, PipelineError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(PipelineError::Client)
}
