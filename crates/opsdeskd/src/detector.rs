//! Heuristic issue detector.
//!
//! Pure classifier over free text: decides whether the text describes a
//! problem and, if so, how important the resulting ticket should be. The
//! keyword and pattern tables are configuration data; swapping in an
//! equivalent curated list does not change the contract.

use crate::memory::MemoryLog;
use opsdesk_shared::ticket::Importance;
use regex::Regex;
use serde_json::json;

/// Keywords that indicate text worth a ticket
const ISSUE_KEYWORDS: &[&str] = &[
    "error",
    "bug",
    "crash",
    "fail",
    "broken",
    "not working",
    "help",
    "problem",
    "issue",
    "fatal",
    "exception",
    "down",
    "doesn't work",
    "malfunction",
    "glitch",
    "fault",
    "defect",
    "urgent",
    "emergency",
    "critical",
    "fix",
    "repair",
    "unresponsive",
    "freeze",
    "hang",
    "timeout",
];

/// Error-like phrasings caught even without a keyword hit
const ERROR_PATTERNS: &[&str] = &[
    r"error\s*:\s*.*",
    r"exception\s*:\s*.*",
    r"failed\s*to\s*.*",
    r"cannot\s*.*",
    r"unable\s*to\s*.*",
];

/// Indicators that escalate a detected issue straight to critical
const CRITICAL_INDICATORS: &[&str] = &[
    "urgent",
    "critical",
    "emergency",
    "fatal",
    "immediately",
    "security",
    "breach",
    "data loss",
];

/// Indicators for elevated (but not critical) importance
const ELEVATED_INDICATORS: &[&str] = &[
    "important",
    "significant",
    "moderate",
    "soon",
    "affecting",
    "performance",
];

/// Synthesized issue text keeps at most this many characters of the input
const ISSUE_TEXT_MAX_CHARS: usize = 200;

/// A detected issue ready for ticket creation
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedIssue {
    pub issue: String,
    pub importance: Importance,
}

/// Keyword/regex classifier with its own invocation log
pub struct IssueDetector {
    patterns: Vec<Regex>,
    memory: MemoryLog,
}

impl IssueDetector {
    pub fn new() -> Self {
        let patterns = ERROR_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
            .collect();
        Self {
            patterns,
            memory: MemoryLog::new(),
        }
    }

    /// Whether the text contains any issue indicator
    pub fn detect(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();

        if ISSUE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(&lowered))
    }

    /// Importance of a detected issue.
    ///
    /// Critical indicators win over elevated ones; anything else defaults to
    /// `Medium`. `Low` is unreachable from this path: detection already
    /// fired, so the severity table bottoms out at the medium default. This
    /// matches the explicit-creation form where `Low` remains selectable.
    pub fn classify_importance(&self, text: &str) -> Importance {
        let lowered = text.to_lowercase();

        if CRITICAL_INDICATORS.iter().any(|ind| lowered.contains(ind)) {
            return Importance::Critical;
        }
        if ELEVATED_INDICATORS.iter().any(|ind| lowered.contains(ind)) {
            return Importance::High;
        }
        Importance::Medium
    }

    /// Detect and classify in one pass, recording a memory entry on a hit
    pub fn process(&self, text: &str) -> Option<DetectedIssue> {
        if !self.detect(text) {
            return None;
        }

        let importance = self.classify_importance(text);
        let issue = synthesize_issue_text(text);
        self.memory.push(json!({
            "type": "issue_detected",
            "issue": issue,
            "importance": importance,
        }));

        Some(DetectedIssue { issue, importance })
    }

    pub fn memory_depth(&self) -> usize {
        self.memory.depth()
    }
}

impl Default for IssueDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// `"Auto-detected issue: "` + the first 200 characters, `...` appended iff
/// the input was longer. Character counts, not bytes.
fn synthesize_issue_text(text: &str) -> String {
    let prefix: String = text.chars().take(ISSUE_TEXT_MAX_CHARS).collect();
    let ellipsis = if text.chars().count() > ISSUE_TEXT_MAX_CHARS {
        "..."
    } else {
        ""
    };
    format!("Auto-detected issue: {}{}", prefix, ellipsis)
}
