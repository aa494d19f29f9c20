//! Prompt construction for issue analysis.
//!
//! A prompt has four fixed-order parts:
//! 1. [`PERSONA`] as the system prompt
//! 2. two exemplar exchanges from [`exemplars`], passed as history
//! 3. [`SCHEMA_CONTRACT`] leading the final user message
//! 4. the issue rendered by [`render_issue`] within a [`PromptBudget`]

use crate::provider::Message;
use triage_graph::{IssueComment, IssueRecord, truncate_chars};

/// Fixed reviewer persona and scoring rubric.
pub const PERSONA: &str = "\
You are a Senior Technical Product Manager triaging GitHub issues for an \
engineering team. Your analysis decides what gets worked on next, so be \
concrete and calibrated.

Priority scale (integer 1-5):
- 5 Critical: production crashes, security vulnerabilities, data loss, issues blocking many users
- 4 High: major bugs in core functionality, significant performance regressions
- 3 Medium: non-critical bugs, moderate UX problems, features with clear value
- 2 Low: minor improvements, nice-to-haves, edge cases affecting few users
- 1 Minimal: typos, cosmetic issues, low-impact documentation fixes

Issue types:
- bug: something is broken or behaves unexpectedly
- feature_request: new functionality or an enhancement
- documentation: missing, wrong or unclear docs
- question: the author needs help or clarification
- other: anything else

Confidence (0.0-1.0): 0.9 and above when classification and priority are \
obvious, 0.7-0.89 with some ambiguity, 0.5-0.69 with limited context, below \
0.5 when the issue is vague or contradictory.

Draft response: two to four sentences a maintainer could post as-is. Thank \
the author, acknowledge the problem, state the next step.";

/// Output contract placed ahead of every issue.
pub const SCHEMA_CONTRACT: &str = r#"Respond with ONLY a JSON object. No markdown, no commentary.
{
    "summary": "string, one sentence",
    "type": "bug | feature_request | documentation | question | other",
    "priority_score": "integer 1-5",
    "priority_justification": "string",
    "suggested_labels": ["2-5 distinct label names"],
    "potential_impact": "string",
    "confidence_score": "number 0.0-1.0",
    "draft_response": "string"
}"#;

const CRITICAL_EXEMPLAR_ISSUE: &str = r#"Analyze this GitHub issue:

Title: App crashes on login when using SSO
Body: After the latest update (v2.3.1), clicking "Sign in with Google" crashes the app on both iOS and Android. Several enterprise customers rely on SSO and cannot access the app at all.

Comments:
- user_jane: "Same here. Our team of 50 people is completely blocked."
- user_mike: "Confirmed on iOS 17.1. Stack trace shows a null pointer in AuthManager."
- maintainer_alex: "Looking into this urgently."

Labels: []
State: open"#;

const CRITICAL_EXEMPLAR_ANSWER: &str = r#"{"summary": "The app crashes when users sign in with Google SSO, locking enterprise customers out entirely.", "type": "bug", "priority_score": 5, "priority_justification": "Production crash in the core authentication flow that blocks multiple enterprise teams from using the product.", "suggested_labels": ["bug", "critical", "authentication", "SSO", "regression"], "potential_impact": "Severe: teams of 50+ users cannot access the application, risking churn.", "confidence_score": 0.95, "draft_response": "Thank you for reporting this. We've reproduced the SSO crash in AuthManager and escalated it to our highest priority. We'll post updates here and aim to ship a fix within 24 hours."}"#;

const MINOR_EXEMPLAR_ISSUE: &str = r#"Analyze this GitHub issue:

Title: Add dark mode support
Body: It would be great if the app supported dark mode. My eyes hurt when using the app at night.

Comments:
- user_bob: "+1, would love this"
- user_alice: "Yes please! iOS has had system-wide dark mode for years."

Labels: ["enhancement"]
State: open"#;

const MINOR_EXEMPLAR_ANSWER: &str = r#"{"summary": "A user requests dark mode to reduce eye strain at night.", "type": "feature_request", "priority_score": 2, "priority_justification": "Popular quality-of-life request that blocks no functionality but needs broad UI work.", "suggested_labels": ["enhancement", "UI/UX", "accessibility", "good-first-issue"], "potential_impact": "Low to moderate: improves comfort for night-time users with no functional change.", "confidence_score": 0.92, "draft_response": "Thanks for the suggestion! Dark mode is a popular request and we've added it to the backlog. We can't commit to a timeline yet but will update this issue as plans firm up."}"#;

/// The two fixed exemplar exchanges: a priority-5 crash and a priority-2
/// feature request.
pub fn exemplars() -> Vec<Message> {
    vec![
        Message::user(CRITICAL_EXEMPLAR_ISSUE),
        Message::assistant(CRITICAL_EXEMPLAR_ANSWER),
        Message::user(MINOR_EXEMPLAR_ISSUE),
        Message::assistant(MINOR_EXEMPLAR_ANSWER),
    ]
}

/// Size limits applied when rendering an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBudget {
    /// Body characters kept before truncation
    pub body_chars: usize,
    /// Comments included at most
    pub max_comments: usize,
    /// How many of those are the most recent ones
    pub recent_comments: usize,
    /// Characters kept per comment
    pub comment_chars: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            body_chars: 8_000,
            max_comments: 5,
            recent_comments: 3,
            comment_chars: 500,
        }
    }
}

/// An issue rendered for the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedIssue {
    pub text: String,
    /// The body was cut, at fetch time or by the body budget
    pub truncated: bool,
}

/// Pick the comments worth showing: the most recent ones, then the longest
/// of the rest, returned in chronological order.
pub fn select_comments<'a>(comments: &'a [IssueComment], budget: &PromptBudget) -> Vec<&'a IssueComment> {
    let mut by_time: Vec<&IssueComment> = comments.iter().collect();
    by_time.sort_by_key(|c| c.created_at);

    if by_time.len() <= budget.max_comments {
        return by_time;
    }

    let recent_count = budget.recent_comments.min(budget.max_comments);
    let split = by_time.len() - recent_count;
    let (older, recent) = by_time.split_at(split);

    let mut longest: Vec<(usize, &IssueComment)> = older.iter().copied().enumerate().collect();
    // Longest first; earlier comment wins a tie
    longest.sort_by(|(ia, a), (ib, b)| {
        b.body.chars().count().cmp(&a.body.chars().count()).then(ia.cmp(ib))
    });
    longest.truncate(budget.max_comments - recent_count);
    longest.sort_by_key(|(i, _)| *i);

    longest
        .into_iter()
        .map(|(_, c)| c)
        .chain(recent.iter().copied())
        .collect()
}

/// Serialize an issue into the prompt's issue section.
pub fn render_issue(issue: &IssueRecord, budget: &PromptBudget) -> RenderedIssue {
    let (body, cut) = truncate_chars(issue.body.trim(), budget.body_chars);
    let truncated = cut || issue.body_truncated;
    let body = if body.is_empty() {
        "(No description provided)".to_string()
    } else {
        body
    };

    let selected = select_comments(&issue.comments, budget);
    let comments_text = if selected.is_empty() {
        "(No comments)".to_string()
    } else {
        selected
            .iter()
            .map(|c| {
                let (text, clipped) = truncate_chars(c.body.trim(), budget.comment_chars);
                let ellipsis = if clipped { "..." } else { "" };
                format!("- {}: \"{}{}\"", c.author, text, ellipsis)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let total_comments = (issue.comment_count as usize).max(issue.comments.len());
    let omitted = total_comments.saturating_sub(selected.len());
    let omitted_note = if omitted > 0 {
        format!("\n({} more comments not shown)", omitted)
    } else {
        String::new()
    };

    let labels = issue
        .labels
        .iter()
        .map(|l| format!("\"{}\"", l))
        .collect::<Vec<_>>()
        .join(", ");

    let truncation_note = if truncated {
        "\n\n[Note: the issue body was truncated due to length]"
    } else {
        ""
    };

    let text = format!(
        "Analyze this GitHub issue:\n\n\
         Title: {title}\n\
         Body: {body}\n\n\
         Comments:\n{comments_text}{omitted_note}\n\n\
         Labels: [{labels}]\n\
         State: {state}\n\
         Author: {author}\n\
         URL: {url}{truncation_note}",
        title = issue.title.trim(),
        state = issue.state,
        author = issue.author,
        url = issue.html_url,
    );

    RenderedIssue { text, truncated }
}

/// Final user message: schema contract followed by the issue.
pub fn build_user_prompt(rendered: &RenderedIssue) -> String {
    format!("{}\n\n{}", SCHEMA_CONTRACT, rendered.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::ResponseRepairParser;
    use crate::analysis::IssueType;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use triage_graph::RepoId;

    fn comment(author: &str, body: &str, minute: i64) -> IssueComment {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        IssueComment::new(author, body, base + Duration::minutes(minute))
    }

    fn issue() -> IssueRecord {
        IssueRecord::new(RepoId::parse("acme/app").unwrap(), 7, "Export fails")
    }

    #[test]
    fn test_exemplars_span_priority_extremes() {
        let messages = exemplars();
        assert_eq!(messages.len(), 4);

        let parser = ResponseRepairParser;
        let critical = parser.parse(&messages[1].content).unwrap();
        let minor = parser.parse(&messages[3].content).unwrap();
        assert_eq!((critical.issue_type, critical.priority_score), (IssueType::Bug, 5));
        assert_eq!(
            (minor.issue_type, minor.priority_score),
            (IssueType::FeatureRequest, 2)
        );
    }

    #[test]
    fn test_select_comments_recent_plus_longest() {
        let comments = vec![
            comment("a", "short", 0),
            comment("b", &"long ".repeat(40), 1),
            comment("c", "tiny", 2),
            comment("d", &"medium ".repeat(10), 3),
            comment("e", "r1", 4),
            comment("f", "r2", 5),
            comment("g", "r3", 6),
        ];
        let picked: Vec<&str> = select_comments(&comments, &PromptBudget::default())
            .iter()
            .map(|c| c.author.as_str())
            .collect();
        assert_eq!(picked, vec!["b", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_select_comments_sorts_chronologically() {
        let comments = vec![comment("late", "x", 10), comment("early", "y", 1)];
        let picked: Vec<&str> = select_comments(&comments, &PromptBudget::default())
            .iter()
            .map(|c| c.author.as_str())
            .collect();
        assert_eq!(picked, vec!["early", "late"]);
    }

    #[test]
    fn test_render_truncates_body() {
        let record = issue().with_body("x".repeat(9_000));
        let rendered = render_issue(&record, &PromptBudget::default());
        assert!(rendered.truncated);
        assert!(rendered.text.contains("[Note: the issue body was truncated"));
        assert!(!rendered.text.contains(&"x".repeat(8_001)));
    }

    #[test]
    fn test_render_keeps_fetch_truncation_flag() {
        let mut record = issue().with_body("short");
        record.body_truncated = true;
        assert!(render_issue(&record, &PromptBudget::default()).truncated);
    }

    #[test]
    fn test_render_empty_issue() {
        let rendered = render_issue(&issue(), &PromptBudget::default());
        assert!(!rendered.truncated);
        assert!(rendered.text.contains("Body: (No description provided)"));
        assert!(rendered.text.contains("(No comments)"));
        assert!(rendered.text.contains("Labels: []"));
        assert!(rendered.text.contains("URL: https://github.com/acme/app/issues/7"));
    }

    #[test]
    fn test_render_clips_comments_and_counts_omitted() {
        let mut record = issue()
            .with_label("bug")
            .with_comment(comment("u", &"y".repeat(600), 0));
        record.comment_count = 12;
        let rendered = render_issue(&record, &PromptBudget::default());
        assert!(rendered.text.contains(&format!("- u: \"{}...\"", "y".repeat(500))));
        assert!(rendered.text.contains("(11 more comments not shown)"));
        assert!(rendered.text.contains("Labels: [\"bug\"]"));
    }

    #[test]
    fn test_user_prompt_order() {
        let prompt = build_user_prompt(&render_issue(&issue(), &PromptBudget::default()));
        let schema = prompt.find("Respond with ONLY a JSON object").unwrap();
        let issue = prompt.find("Analyze this GitHub issue").unwrap();
        assert!(schema < issue);
    }
}
