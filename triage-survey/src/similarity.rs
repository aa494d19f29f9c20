//! Similarity ranking for duplicate detection and cross-repository search.
//!
//! Scores come from a pluggable [`SimilarityScorer`]:
//! - [`LexicalScorer`] is deterministic and makes no external calls
//! - [`LlmScorer`] asks the text generator for a 0-100 rating
//!
//! Scores are continuous in `[0, 1]`; [`SimilarityBand`] is only a
//! presentation of them.

use crate::error::{TriageError, TriageResult};
use crate::source::IssueSource;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};
use triage_graph::{IssueRecord, IssueState, RepoId, truncate_chars};
use triage_llm::LLMProvider;

/// Default score a duplicate must reach.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Recently updated issues listed as duplicate candidates.
pub const RECENT_ISSUES_LIMIT: u8 = 50;

/// Candidates scored per duplicate request.
pub const MAX_DUPLICATE_CANDIDATES: usize = 20;

/// Duplicates returned at most.
pub const MAX_DUPLICATES: usize = 5;

/// Search results requested in cross-repository mode.
pub const SEARCH_LIMIT: u8 = 20;

/// Similar issues returned at most.
pub const MAX_SIMILAR: usize = 10;

/// Candidates scored concurrently.
const SCORING_CONCURRENCY: usize = 5;

/// Keywords used in a search query.
const MAX_KEYWORDS: usize = 5;

/// Body characters considered for search keywords.
const KEYWORD_BODY_CHARS: usize = 200;

/// Body characters shown to the generator per issue.
const LLM_BODY_CHARS: usize = 500;

/// Body characters tokenized by the lexical scorer.
const LEXICAL_BODY_CHARS: usize = 4_000;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "it", "to", "in", "for", "on", "with", "as", "by", "at", "from",
];

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("keyword pattern is valid"));

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]{2,}").expect("term pattern is valid"));

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern is valid"));

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Presentation band of a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    VeryLikelyDuplicate,
    LikelyDuplicate,
    PossiblyRelated,
    Low,
}

impl SimilarityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            SimilarityBand::VeryLikelyDuplicate
        } else if score >= 0.70 {
            SimilarityBand::LikelyDuplicate
        } else if score >= 0.50 {
            SimilarityBand::PossiblyRelated
        } else {
            SimilarityBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SimilarityBand::VeryLikelyDuplicate => "Very likely duplicate",
            SimilarityBand::LikelyDuplicate => "Likely duplicate",
            SimilarityBand::PossiblyRelated => "Possibly related",
            SimilarityBand::Low => "Low similarity",
        }
    }
}

/// A scored candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityCandidate {
    /// Owning repository, set for cross-repository results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub html_url: String,
    pub score: f64,
    pub band: SimilarityBand,
}

impl SimilarityCandidate {
    fn new(issue: &IssueRecord, score: f64, with_repo: bool) -> Self {
        let score = score.clamp(0.0, 1.0);
        Self {
            repo: with_repo.then(|| issue.repo.full_name()),
            number: issue.number,
            title: issue.title.clone(),
            state: issue.state,
            html_url: issue.html_url.clone(),
            score,
            band: SimilarityBand::from_score(score),
        }
    }
}

/// Scores how alike two issues are.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    fn name(&self) -> &str;

    /// A score in `[0, 1]`, or `None` when this candidate cannot be scored.
    async fn score(&self, source: &IssueRecord, candidate: &IssueRecord) -> Option<f64>;
}

/// Cosine similarity of term-frequency vectors. Title terms count double.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    fn vector(issue: &IssueRecord) -> HashMap<String, f64> {
        let mut terms = HashMap::new();
        let (body, _) = truncate_chars(&issue.body, LEXICAL_BODY_CHARS);
        for (text, weight) in [(issue.title.as_str(), 2.0), (body.as_str(), 1.0)] {
            let lower = text.to_lowercase();
            for term in TERM_RE.find_iter(&lower) {
                if !is_stop_word(term.as_str()) {
                    *terms.entry(term.as_str().to_string()).or_insert(0.0) += weight;
                }
            }
        }
        terms
    }

    pub fn similarity(a: &IssueRecord, b: &IssueRecord) -> f64 {
        let (va, vb) = (Self::vector(a), Self::vector(b));
        let dot: f64 = va
            .iter()
            .filter_map(|(term, wa)| vb.get(term).map(|wb| wa * wb))
            .sum();
        let norm = |v: &HashMap<String, f64>| v.values().map(|w| w * w).sum::<f64>().sqrt();
        let denominator = norm(&va) * norm(&vb);
        if denominator == 0.0 {
            0.0
        } else {
            (dot / denominator).clamp(0.0, 1.0)
        }
    }
}

#[async_trait]
impl SimilarityScorer for LexicalScorer {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn score(&self, source: &IssueRecord, candidate: &IssueRecord) -> Option<f64> {
        Some(Self::similarity(source, candidate))
    }
}

const LLM_SCORER_SYSTEM: &str = "You compare GitHub issues and judge whether they describe the same thing.";

/// Asks the generator for a 0-100 similarity rating.
pub struct LlmScorer {
    provider: Arc<dyn LLMProvider>,
}

impl LlmScorer {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    fn describe(issue: &IssueRecord) -> String {
        let (body, _) = truncate_chars(&issue.body, LLM_BODY_CHARS);
        format!("Title: {}\nBody: {}", issue.title, body)
    }

    fn build_prompt(source: &IssueRecord, candidate: &IssueRecord) -> String {
        format!(
            "Compare these two GitHub issues and rate their semantic similarity from 0 to 100.\n\n\
             Issue 1:\n{}\n\n\
             Issue 2:\n{}\n\n\
             Consider:\n\
             - Are they reporting the same problem?\n\
             - Are they requesting the same feature?\n\
             - Do they have similar root causes?\n\n\
             Return ONLY a number from 0 to 100. No explanation.",
            Self::describe(source),
            Self::describe(candidate),
        )
    }

    /// Read the first integer of a reply as a 0-100 rating.
    pub fn parse_rating(reply: &str) -> Option<f64> {
        let rating: u32 = NUMBER_RE.find(reply)?.as_str().parse().ok()?;
        (rating <= 100).then(|| f64::from(rating) / 100.0)
    }
}

#[async_trait]
impl SimilarityScorer for LlmScorer {
    fn name(&self) -> &str {
        "llm"
    }

    async fn score(&self, source: &IssueRecord, candidate: &IssueRecord) -> Option<f64> {
        let prompt = Self::build_prompt(source, candidate);
        match self.provider.prompt(LLM_SCORER_SYSTEM, &prompt).await {
            Ok(reply) => {
                let score = Self::parse_rating(&reply);
                if score.is_none() {
                    warn!(candidate = candidate.number, reply = %reply.trim(), "unusable similarity rating, skipping");
                }
                score
            }
            Err(e) => {
                warn!(candidate = candidate.number, error = %e, "similarity scoring failed, skipping");
                None
            }
        }
    }
}

/// Search keywords: the first few distinct non-stop words of three or more
/// letters from the title and the start of the body.
pub fn extract_keywords(issue: &IssueRecord) -> Vec<String> {
    let (body, _) = truncate_chars(&issue.body, KEYWORD_BODY_CHARS);
    let text = format!("{} {}", issue.title, body).to_lowercase();

    let mut seen = HashSet::new();
    KEYWORD_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|w| !is_stop_word(w))
        .filter(|w| seen.insert(*w))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

fn rank(candidates: &mut [SimilarityCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.number.cmp(&b.number)));
}

/// Ranks candidates against a source issue.
pub struct SimilarityRanker {
    source: Arc<dyn IssueSource>,
    scorer: Arc<dyn SimilarityScorer>,
}

impl SimilarityRanker {
    pub fn new(source: Arc<dyn IssueSource>, scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self { source, scorer }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    async fn score_all(&self, source_issue: &IssueRecord, candidates: Vec<IssueRecord>) -> Vec<(IssueRecord, f64)> {
        stream::iter(candidates)
            .map(|candidate| async move {
                let score = self.scorer.score(source_issue, &candidate).await;
                score.map(|s| (candidate, s))
            })
            .buffered(SCORING_CONCURRENCY)
            .filter_map(|scored| async move { scored })
            .collect()
            .await
    }

    /// Same-repository duplicates of `source_issue` among `candidates`.
    ///
    /// At most [`MAX_DUPLICATE_CANDIDATES`] candidates are scored; results
    /// below `threshold` are omitted and at most [`MAX_DUPLICATES`] returned.
    pub async fn find_duplicates(
        &self,
        source_issue: &IssueRecord,
        candidates: Vec<IssueRecord>,
        threshold: f64,
    ) -> Vec<SimilarityCandidate> {
        let candidates: Vec<IssueRecord> = candidates
            .into_iter()
            .filter(|c| c.number != source_issue.number)
            .take(MAX_DUPLICATE_CANDIDATES)
            .collect();
        let considered = candidates.len();

        let mut results: Vec<SimilarityCandidate> = self
            .score_all(source_issue, candidates)
            .await
            .into_iter()
            .filter(|(_, score)| *score >= threshold)
            .map(|(issue, score)| SimilarityCandidate::new(&issue, score, false))
            .collect();
        rank(&mut results);
        results.truncate(MAX_DUPLICATES);

        info!(
            issue = source_issue.number,
            scorer = self.scorer.name(),
            considered,
            matches = results.len(),
            "duplicate search complete"
        );
        results
    }

    /// Fetch an issue and rank the repository's recent issues against it.
    pub async fn duplicates_for(
        &self,
        repo: &RepoId,
        number: u64,
        threshold: f64,
    ) -> TriageResult<(IssueRecord, Vec<SimilarityCandidate>)> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TriageError::InvalidInput(format!(
                "threshold must be between 0 and 1, got {threshold}"
            )));
        }

        let source_issue = self.source.fetch_issue(repo, number).await?;
        let recent = self.source.list_recent_issues(repo, RECENT_ISSUES_LIMIT).await?;
        let duplicates = self.find_duplicates(&source_issue, recent, threshold).await;
        Ok((source_issue, duplicates))
    }

    /// Issues in other repositories resembling `source_issue`.
    ///
    /// Results from `exclude_repo` and the source issue itself are dropped.
    /// No threshold applies; at most [`MAX_SIMILAR`] are returned.
    pub async fn find_similar(
        &self,
        source_issue: &IssueRecord,
        exclude_repo: Option<&RepoId>,
    ) -> TriageResult<Vec<SimilarityCandidate>> {
        let keywords = extract_keywords(source_issue);
        if keywords.is_empty() {
            debug!(issue = source_issue.number, "no usable keywords, skipping search");
            return Ok(Vec::new());
        }

        let query = format!("{} is:issue", keywords.join(" "));
        let found = self.source.search_issues(&query, SEARCH_LIMIT).await?;

        let candidates: Vec<IssueRecord> = found
            .into_iter()
            .filter(|c| {
                !(c.number == source_issue.number && c.repo.matches(&source_issue.repo.full_name()))
            })
            .filter(|c| !exclude_repo.is_some_and(|ex| ex.matches(&c.repo.full_name())))
            .collect();

        let mut results: Vec<SimilarityCandidate> = self
            .score_all(source_issue, candidates)
            .await
            .into_iter()
            .map(|(issue, score)| SimilarityCandidate::new(&issue, score, true))
            .collect();
        rank(&mut results);
        results.truncate(MAX_SIMILAR);

        info!(
            issue = source_issue.number,
            query = %query,
            matches = results.len(),
            "cross-repository search complete"
        );
        Ok(results)
    }

    /// Fetch an issue and search other repositories for similar ones.
    pub async fn similar_for(
        &self,
        repo: &RepoId,
        number: u64,
        exclude_same_repo: bool,
    ) -> TriageResult<(IssueRecord, Vec<SimilarityCandidate>)> {
        let source_issue = self.source.fetch_issue(repo, number).await?;
        let exclude = exclude_same_repo.then_some(repo);
        let similar = self.find_similar(&source_issue, exclude).await?;
        Ok((source_issue, similar))
    }
}
