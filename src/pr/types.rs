/// Metadata, diff and changed files of a pull request as reported by `gh`.
/// Note: Not Deserialize; PullRequest is assembled from three separate
/// `gh` queries (metadata JSON, raw diff, files JSON).
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR description, empty when the author left none
    pub body: String,
    /// Canonical PR URL
    pub url: String,
    /// Author's GitHub login
    pub author: String,
    /// Unified diff text, trimmed of surrounding whitespace
    pub diff: String,
    /// Changed files in the order `gh` lists them
    pub files: Vec<ChangedFile>,
}

/// A single file touched by the PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// File path (e.g., "src/auth/config.rs")
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

impl PullRequest {
    /// `owner/repo` derived from the PR URL.
    pub fn repository(&self) -> &str {
        let base = self.url.split("/pull/").next().unwrap_or_default();
        base.strip_prefix("https://github.com/").unwrap_or(base)
    }

    pub fn additions(&self) -> usize {
        self.files.iter().map(|f| f.additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.files.iter().map(|f| f.deletions).sum()
    }
}

/// Represents the parsed components of a GitHub PR URL.
/// Extracted by parse_pr_url() in pr/mod.rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

impl PrUrl {
    /// Value for `gh --repo`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for PrUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.pr_number)
    }
}
