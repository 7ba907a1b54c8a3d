pub mod types;

pub use types::PrDetails;

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

use types::PullRequestEvent;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub event file not found at {path}: {source}")]
    EventFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse GitHub event file: {0}")]
    EventFileParse(#[from] serde_json::Error),

    #[error("This action can only run on pull_request events")]
    NotPullRequest,

    #[error("Event payload is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Event payload has a field of the wrong type: {0}")]
    InvalidField(#[source] serde_json::Error),

    #[error("Repository identifier `{0}` is not in owner/name form")]
    InvalidRepo(String),
}

/// Read and parse the event document at `path`.
#[instrument]
pub fn load_event(path: &Path) -> Result<Value, PrError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PrError::EventFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let event = serde_json::from_str(&contents)?;
    debug!(bytes = contents.len(), "loaded event document");
    Ok(event)
}

/// Pull the PR details out of a parsed event document.
///
/// A missing (or `null`) `pull_request` section means the workflow was
/// triggered by something other than a pull request and yields
/// `PrError::NotPullRequest`. Title and body default to empty; number,
/// URL and repository are required.
pub fn extract_details(event: &Value) -> Result<PrDetails, PrError> {
    let event = PullRequestEvent::deserialize_from(event)?;
    let pr = event.pull_request.ok_or(PrError::NotPullRequest)?;

    let number = pr.number.ok_or(PrError::MissingField("pull_request.number"))?;
    let url = pr
        .html_url
        .ok_or(PrError::MissingField("pull_request.html_url"))?;
    let repo = event
        .repository
        .and_then(|r| r.full_name)
        .ok_or(PrError::MissingField("repository.full_name"))?;

    if !is_owner_name(&repo) {
        return Err(PrError::InvalidRepo(repo));
    }

    Ok(PrDetails {
        title: pr.title.unwrap_or_default(),
        description: pr.body.unwrap_or_default(),
        number,
        url,
        repo,
    })
}

impl PullRequestEvent {
    fn deserialize_from(event: &Value) -> Result<Self, PrError> {
        // `pull_request: "oops"` and friends are as good as no PR at all
        if !event.get("pull_request").is_some_and(Value::is_object) {
            return Err(PrError::NotPullRequest);
        }
        Self::deserialize(event).map_err(PrError::InvalidField)
    }
}

fn is_owner_name(repo: &str) -> bool {
    match repo.split_once('/') {
        Some((owner, name)) => !owner.is_empty() && !name.is_empty() && !name.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn sample_event() -> Value {
        json!({
            "action": "opened",
            "pull_request": {
                "number": 42,
                "title": "Add feature X",
                "body": "desc ![img](https://x/y.png)",
                "html_url": "https://github.com/user/repo/pull/42"
            },
            "repository": { "full_name": "user/repo" }
        })
    }

    #[test]
    fn test_extract_details() {
        let details = extract_details(&sample_event()).unwrap();
        assert_eq!(details.title, "Add feature X");
        assert_eq!(details.description, "desc ![img](https://x/y.png)");
        assert_eq!(details.number, 42);
        assert_eq!(details.url, "https://github.com/user/repo/pull/42");
        assert_eq!(details.repo, "user/repo");
    }

    #[test]
    fn test_null_body_becomes_empty() {
        let mut event = sample_event();
        event["pull_request"]["body"] = Value::Null;
        event["pull_request"].as_object_mut().unwrap().remove("title");
        let details = extract_details(&event).unwrap();
        assert_eq!(details.description, "");
        assert_eq!(details.title, "");
    }

    #[test]
    fn test_non_pr_event() {
        let event = json!({"ref": "refs/heads/main", "repository": {"full_name": "a/b"}});
        assert!(matches!(extract_details(&event), Err(PrError::NotPullRequest)));

        let event = json!({"pull_request": null, "repository": {"full_name": "a/b"}});
        assert!(matches!(extract_details(&event), Err(PrError::NotPullRequest)));
    }

    #[test]
    fn test_required_fields() {
        let mut event = sample_event();
        event["pull_request"].as_object_mut().unwrap().remove("number");
        assert!(matches!(
            extract_details(&event),
            Err(PrError::MissingField("pull_request.number"))
        ));

        let mut event = sample_event();
        event.as_object_mut().unwrap().remove("repository");
        assert!(matches!(
            extract_details(&event),
            Err(PrError::MissingField("repository.full_name"))
        ));

        let mut event = sample_event();
        event["pull_request"]["html_url"] = Value::Null;
        assert!(matches!(
            extract_details(&event),
            Err(PrError::MissingField("pull_request.html_url"))
        ));
    }

    #[test]
    fn test_wrongly_typed_fields() {
        let mut event = sample_event();
        event["pull_request"]["number"] = json!("42");
        assert!(matches!(extract_details(&event), Err(PrError::InvalidField(_))));

        let mut event = sample_event();
        event["repository"] = json!("user/repo");
        let err = extract_details(&event).unwrap_err();
        assert!(matches!(err, PrError::InvalidField(_)));
        assert!(err.to_string().starts_with("Event payload has a field of the wrong type"));
    }

    #[test]
    fn test_repo_must_be_owner_name() {
        for bad in ["repo", "/repo", "user/", "a/b/c"] {
            let mut event = sample_event();
            event["repository"]["full_name"] = json!(bad);
            assert!(
                matches!(extract_details(&event), Err(PrError::InvalidRepo(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_event_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", sample_event()).unwrap();
        let event = load_event(file.path()).unwrap();
        assert_eq!(event["pull_request"]["number"], 42);
    }

    #[test]
    fn test_load_event_missing_file() {
        let err = load_event(Path::new("/no/such/event.json")).unwrap_err();
        assert!(matches!(err, PrError::EventFileRead { .. }));
    }

    #[test]
    fn test_load_event_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            load_event(file.path()),
            Err(PrError::EventFileParse(_))
        ));
    }
}
