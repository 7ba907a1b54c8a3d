use serde::Deserialize;

/// Pull request metadata extracted from the event document.
/// Built once by `extract_details()` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrDetails {
    /// PR title (empty if the event omits it)
    pub title: String,
    /// PR body; `null` or absent bodies become an empty string
    pub description: String,
    /// PR number (e.g., 42)
    pub number: u64,
    /// Web URL of the PR
    pub url: String,
    /// Repository identifier in `owner/name` form
    pub repo: String,
}

/// The subset of a `pull_request` event payload this tool reads.
///
/// Every field is optional at this layer so that the extractor, not serde,
/// decides which omissions are fatal.
#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestEvent {
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    #[serde(default)]
    pub repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestPayload {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryPayload {
    pub full_name: Option<String>,
}
