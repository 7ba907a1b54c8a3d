mod analysis;
mod comment;
mod config;
mod images;
mod pipeline;
mod pr;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR AI Review — reads the pull_request event of a GitHub Actions run, asks
/// Gemini for a two-line review and posts it as a comment on the PR.
#[derive(Parser, Debug)]
#[command(name = "pr-ai-review", version, about)]
struct Cli {
    /// GitHub token used to post the comment (falls back to GITHUB_TOKEN)
    github_token: Option<String>,

    /// Gemini API key (falls back to GEMINI_API_KEY)
    gemini_api_key: Option<String>,

    /// Optional TOML file with model and endpoint overrides
    /// (defaults to ./.pr-ai-review.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let _main_span = info_span!("pr_ai_review").entered();

    ExitCode::from(exit_status(run(cli).await))
}

async fn run(cli: Cli) -> Result<pipeline::RunSummary, Box<dyn std::error::Error>> {
    info!("loading configuration");
    let overrides = config::CliOverrides {
        github_token: cli.github_token,
        gemini_api_key: cli.gemini_api_key,
    };
    let config = config::Config::load(overrides, cli.config.as_deref())?;

    Ok(pipeline::run(&config).await?)
}

/// Log the outcome of a run and turn it into the process exit status:
/// 0 once the comment is posted, 1 on any fatal error.
fn exit_status(result: Result<pipeline::RunSummary, Box<dyn std::error::Error>>) -> u8 {
    match result {
        Ok(summary) => {
            info!(
                pr = summary.pr_number,
                repo = %summary.repo,
                images_found = summary.images_found,
                images_attached = summary.images_attached,
                comment_id = ?summary.comment_id,
                "PR analysis and comment completed"
            );
            0
        }
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("ERROR: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::pipeline::{PipelineError, RunSummary};
    use crate::pr::PrError;

    #[test]
    fn test_exit_status_success() {
        let summary = RunSummary {
            repo: "user/repo".to_string(),
            pr_number: 42,
            images_found: 1,
            images_attached: 1,
            comment_id: Some(7),
        };
        assert_eq!(exit_status(Ok(summary)), 0);
    }

    #[test]
    fn test_exit_status_failures() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(ConfigError::MissingVar("GITHUB_TOKEN")),
            Box::new(PipelineError::Pr(PrError::NotPullRequest)),
            Box::new(PipelineError::Pr(PrError::MissingField("pull_request.number"))),
        ];
        for e in errors {
            assert_eq!(exit_status(Err(e)), 1);
        }
    }
}
