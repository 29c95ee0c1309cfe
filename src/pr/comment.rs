use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

use super::gh::GhRunner;
use super::types::PrUrl;
use super::PrError;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Error posting review: failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error posting review: {0}")]
    Command(#[from] PrError),

    #[error("Error posting review: failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Path of the transient comment body for a PR.
pub fn body_file_path(scratch_dir: &Path, pr_number: u64) -> PathBuf {
    scratch_dir.join(format!("review_{pr_number}.md"))
}

/// Post the review as a PR comment via `gh pr comment --body-file`.
///
/// The body file is removed only after a successful post; on failure it is
/// left in `scratch_dir`.
#[instrument(skip(gh, review), fields(pr = %pr_url, review_bytes = review.len()))]
pub async fn post_review<G>(
    gh: &G,
    pr_url: &PrUrl,
    review: &str,
    scratch_dir: &Path,
) -> Result<(), PostError>
where
    G: GhRunner + ?Sized,
{
    let body_file = body_file_path(scratch_dir, pr_url.pr_number);
    tokio::fs::write(&body_file, review)
        .await
        .map_err(|source| PostError::Write {
            path: body_file.clone(),
            source,
        })?;
    debug!(path = %body_file.display(), "wrote comment body");

    let number = pr_url.pr_number.to_string();
    let slug = pr_url.slug();
    let body_arg = body_file.to_string_lossy();
    gh.run(&[
        "pr",
        "comment",
        &number,
        "--repo",
        &slug,
        "--body-file",
        &body_arg,
    ])
    .await?;

    tokio::fs::remove_file(&body_file)
        .await
        .map_err(|source| PostError::Cleanup {
            path: body_file.clone(),
            source,
        })?;
    debug!("removed comment body");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::tests::{failed, ScriptedGh};

    fn pr_url() -> PrUrl {
        PrUrl {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            pr_number: 42,
        }
    }

    #[test]
    fn test_body_file_path() {
        let path = body_file_path(Path::new(".cache"), 42);
        assert_eq!(path, PathBuf::from(".cache/review_42.md"));
    }

    #[tokio::test]
    async fn test_post_review_invokes_gh_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let gh = ScriptedGh::new(vec![Ok(String::new())]);

        post_review(&gh, &pr_url(), "Looks good.", dir.path())
            .await
            .unwrap();

        let body_file = body_file_path(dir.path(), 42);
        let calls = gh.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            [
                "pr",
                "comment",
                "42",
                "--repo",
                "acme/widgets",
                "--body-file",
                body_file.to_str().unwrap(),
            ]
        );
        assert!(!body_file.exists());
    }

    #[tokio::test]
    async fn test_post_review_failure_keeps_body_file() {
        let dir = tempfile::tempdir().unwrap();
        let gh = ScriptedGh::new(vec![Err(failed("gh pr comment 42"))]);

        let err = post_review(&gh, &pr_url(), "Needs work.", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::Command(PrError::CommandFailed { .. })));

        let body_file = body_file_path(dir.path(), 42);
        assert_eq!(std::fs::read_to_string(body_file).unwrap(), "Needs work.");
    }

    #[tokio::test]
    async fn test_post_review_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let gh = ScriptedGh::new(vec![]);

        let err = post_review(&gh, &pr_url(), "text", &missing)
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::Write { .. }));
        assert!(gh.calls().is_empty());
    }
}
