//! Issue data model shared by every Triage crate.
//!
//! An [`IssueRecord`] is the normalized, immutable view of one issue fetched
//! from the host API. Records are request-scoped: they are fetched fresh for
//! every request and never cached.

use crate::error::RepoIdError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosts accepted when a repository is given as a URL.
const ACCEPTED_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Repository identity in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// Owner or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoId {
    /// Create a repository identity from its two segments.
    pub fn new(owner: &str, name: &str) -> Result<Self, RepoIdError> {
        validate_segment(owner)?;
        validate_segment(name)?;
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse `owner/name` or a repository URL such as
    /// `https://github.com/owner/name` (trailing path segments like
    /// `/issues/12` are ignored).
    pub fn parse(input: &str) -> Result<Self, RepoIdError> {
        let trimmed = input.trim().trim_end_matches('/');

        if let Some(rest) = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
        {
            let (host, path) = rest
                .split_once('/')
                .ok_or_else(|| RepoIdError::InvalidFormat(input.to_string()))?;
            if !ACCEPTED_HOSTS.contains(&host.to_ascii_lowercase().as_str()) {
                return Err(RepoIdError::UnsupportedHost(host.to_string()));
            }
            let mut segments = path.split('/');
            let owner = segments.next().unwrap_or_default();
            let name = segments.next().unwrap_or_default();
            return Self::new(owner, name.trim_end_matches(".git"));
        }

        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() != 2 {
            return Err(RepoIdError::InvalidFormat(input.to_string()));
        }
        Self::new(parts[0], parts[1])
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Case-insensitive key; the host treats repository names that way.
    pub fn cache_key(&self) -> String {
        self.full_name().to_ascii_lowercase()
    }

    /// Whether `full_name` (any case) names this repository.
    pub fn matches(&self, full_name: &str) -> bool {
        self.full_name().eq_ignore_ascii_case(full_name.trim())
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = RepoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_segment(segment: &str) -> Result<(), RepoIdError> {
    if segment.is_empty() {
        return Err(RepoIdError::EmptySegment);
    }
    if let Some(c) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(RepoIdError::InvalidCharacter(c));
    }
    Ok(())
}

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comment on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Login of the comment author
    pub author: String,
    /// Markdown body
    pub body: String,
    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

impl IssueComment {
    pub fn new(author: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            created_at,
        }
    }
}

/// An issue as fetched from the host API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Repository the issue belongs to
    pub repo: RepoId,

    /// Issue number within the repository
    pub number: u64,

    pub title: String,

    /// Body text, possibly truncated (see `body_truncated`)
    pub body: String,

    /// Whether `body` was cut to fit the fetch budget
    #[serde(default)]
    pub body_truncated: bool,

    pub state: IssueState,

    /// Login of the issue author
    pub author: String,

    /// Existing label names
    #[serde(default)]
    pub labels: Vec<String>,

    /// Fetched comments in chronological order
    #[serde(default)]
    pub comments: Vec<IssueComment>,

    /// Total comments reported by the host (may exceed `comments.len()`)
    #[serde(default)]
    pub comment_count: u32,

    pub created_at: DateTime<Utc>,

    /// Browser URL of the issue
    pub html_url: String,
}

impl IssueRecord {
    /// Create a minimal open issue with an empty body.
    pub fn new(repo: RepoId, number: u64, title: impl Into<String>) -> Self {
        let html_url = format!("https://github.com/{}/issues/{}", repo.full_name(), number);
        Self {
            repo,
            number,
            title: title.into(),
            body: String::new(),
            body_truncated: false,
            state: IssueState::Open,
            author: "unknown".to_string(),
            labels: Vec::new(),
            comments: Vec::new(),
            comment_count: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            html_url,
        }
    }

    /// Set the body (builder pattern).
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the state (builder pattern).
    pub fn with_state(mut self, state: IssueState) -> Self {
        self.state = state;
        self
    }

    /// Add a label (builder pattern).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Append a comment (builder pattern).
    pub fn with_comment(mut self, comment: IssueComment) -> Self {
        self.comments.push(comment);
        self.comment_count = self.comment_count.max(self.comments.len() as u32);
        self
    }

    /// Cut the body to at most `max_chars` characters, recording whether
    /// anything was removed.
    pub fn truncate_body(&mut self, max_chars: usize) {
        let (body, truncated) = truncate_chars(&self.body, max_chars);
        if truncated {
            self.body = body;
            self.body_truncated = true;
        }
    }

    /// Every text fragment that can carry cross-issue references: title,
    /// body, then comments in order.
    pub fn text_fragments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str())
            .chain(std::iter::once(self.body.as_str()))
            .chain(self.comments.iter().map(|c| c.body.as_str()))
    }
}

/// Truncate `text` to `max_chars` characters on a char boundary.
///
/// Returns the (possibly shortened) text and whether truncation happened.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_owner_name() {
        let repo = RepoId::parse("rust-lang/rust").unwrap();
        assert_eq!(repo.owner, "rust-lang");
        assert_eq!(repo.name, "rust");
        assert_eq!(repo.full_name(), "rust-lang/rust");
    }

    #[test]
    fn test_parse_url_variants() {
        for input in [
            "https://github.com/facebook/react",
            "https://github.com/facebook/react/",
            "http://github.com/facebook/react/issues/12",
            "https://github.com/facebook/react.git",
            "  https://www.github.com/facebook/react  ",
        ] {
            let repo = RepoId::parse(input).unwrap();
            assert_eq!(repo.full_name(), "facebook/react", "input: {input}");
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            RepoId::parse("no-slash"),
            Err(RepoIdError::InvalidFormat(_))
        ));
        assert!(matches!(
            RepoId::parse("too/many/slashes"),
            Err(RepoIdError::InvalidFormat(_))
        ));
        assert!(matches!(
            RepoId::parse("https://gitlab.com/a/b"),
            Err(RepoIdError::UnsupportedHost(_))
        ));
        assert!(matches!(RepoId::parse("/repo"), Err(RepoIdError::EmptySegment)));
        assert!(matches!(
            RepoId::parse("own er/repo"),
            Err(RepoIdError::InvalidCharacter(' '))
        ));
    }

    #[test]
    fn test_cache_key_is_case_insensitive() {
        let a = RepoId::parse("Facebook/React").unwrap();
        let b = RepoId::parse("facebook/react").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert!(a.matches("FACEBOOK/react"));
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let (text, truncated) = truncate_chars("héllo wörld", 4);
        assert_eq!(text, "héll");
        assert!(truncated);

        let (text, truncated) = truncate_chars("short", 10);
        assert_eq!(text, "short");
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_body_sets_flag() {
        let repo = RepoId::parse("a/b").unwrap();
        let mut issue = IssueRecord::new(repo, 1, "t").with_body("x".repeat(20));
        issue.truncate_body(10);
        assert_eq!(issue.body.len(), 10);
        assert!(issue.body_truncated);
    }

    #[test]
    fn test_text_fragments_order() {
        let repo = RepoId::parse("a/b").unwrap();
        let issue = IssueRecord::new(repo, 1, "title")
            .with_body("body")
            .with_comment(IssueComment::new("u", "c1", Utc::now()));
        let fragments: Vec<&str> = issue.text_fragments().collect();
        assert_eq!(fragments, vec!["title", "body", "c1"]);
        assert_eq!(issue.comment_count, 1);
    }
}
