pub mod comment;
pub mod gh;
pub mod types;

pub use comment::post_review;
pub use gh::{GhCli, GhRunner};
pub use types::{ChangedFile, PrUrl, PullRequest};

use serde::Deserialize;
use std::process::ExitStatus;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum PrError {
    #[error("Invalid GitHub PR URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error running gh command `{command}` ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to parse gh output: {0}")]
    Json(#[from] serde_json::Error),
}

const GITHUB_PREFIX: &str = "https://github.com/";

/// Parse a GitHub PR URL into its component parts.
///
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
/// The input is matched as written (no URL normalization). Like a prefix
/// match on `https://github\.com/([^/]+)/([^/]+)/pull/(\d+)`, anything after
/// the leading digits of the number is ignored.
pub fn parse_pr_url(url: &str) -> Result<PrUrl, PrError> {
    let invalid = || PrError::InvalidUrl(url.to_string());

    let rest = url.strip_prefix(GITHUB_PREFIX).ok_or_else(invalid)?;
    let mut parts = rest.splitn(4, '/');

    let (Some(owner), Some(repo), Some("pull"), Some(tail)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let digits_end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    let number = &tail[..digits_end];

    if owner.is_empty() || repo.is_empty() || number.is_empty() {
        return Err(invalid());
    }

    let pr_number = number.parse::<u64>().map_err(|_| invalid())?;

    Ok(PrUrl {
        owner: owner.to_string(),
        repo: repo.to_string(),
        pr_number,
    })
}

#[derive(Deserialize)]
struct Author {
    login: String,
}

#[derive(Deserialize)]
struct PrMetadata {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    url: String,
    author: Author,
}

#[derive(Deserialize)]
struct FilesResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct FileEntry {
    path: Option<String>,
    filename: Option<String>,
    #[serde(default)]
    additions: usize,
    #[serde(default)]
    deletions: usize,
}

/// Fetch a complete PullRequest (metadata, diff and changed files) through `gh`.
///
/// Any failing query aborts the fetch; there is no partial result.
#[instrument(skip(gh), fields(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.pr_number))]
pub async fn fetch_pull_request<G>(gh: &G, pr_url: &PrUrl) -> Result<PullRequest, PrError>
where
    G: GhRunner + ?Sized,
{
    let number = pr_url.pr_number.to_string();
    let slug = pr_url.slug();

    debug!("fetching PR metadata");
    let metadata_json = gh
        .run(&[
            "pr",
            "view",
            &number,
            "--repo",
            &slug,
            "--json",
            "title,body,number,url,author",
        ])
        .await?;
    let metadata: PrMetadata = serde_json::from_str(&metadata_json)?;
    debug!(title = %metadata.title, "received PR metadata");

    debug!("fetching PR diff");
    let diff = gh.run(&["pr", "diff", &number, "--repo", &slug]).await?;
    debug!(diff_bytes = diff.len(), "received PR diff");

    debug!("fetching changed files");
    let files_json = gh
        .run(&["pr", "view", &number, "--repo", &slug, "--json", "files"])
        .await?;
    let files_response: FilesResponse = serde_json::from_str(&files_json)?;

    let files: Vec<ChangedFile> = files_response
        .files
        .into_iter()
        .map(|entry| ChangedFile {
            path: entry
                .path
                .or(entry.filename)
                .unwrap_or_else(|| "unknown".to_string()),
            additions: entry.additions,
            deletions: entry.deletions,
        })
        .collect();
    debug!(files = files.len(), "received changed files");

    Ok(PullRequest {
        number: metadata.number,
        title: metadata.title,
        body: metadata.body.unwrap_or_default(),
        url: metadata.url,
        author: metadata.author.login,
        diff,
        files,
    })
}
