//! Commit message classification.
//!
//! Maps a free-text commit message onto a closed set of categories. Rules are
//! tried in a fixed priority order and the first match wins, so a message that
//! matches several rules is decided by priority, not by the number of matches.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category of a commit, derived from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitCategory {
    Feature,
    Fix,
    Docs,
    Refactor,
    Test,
    Style,
    Chore,
    General,
}

impl CommitCategory {
    /// All categories, in classification priority order (`General` last).
    pub const ALL: [CommitCategory; 8] = [
        CommitCategory::Feature,
        CommitCategory::Fix,
        CommitCategory::Docs,
        CommitCategory::Refactor,
        CommitCategory::Test,
        CommitCategory::Style,
        CommitCategory::Chore,
        CommitCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitCategory::Feature => "feature",
            CommitCategory::Fix => "fix",
            CommitCategory::Docs => "docs",
            CommitCategory::Refactor => "refactor",
            CommitCategory::Test => "test",
            CommitCategory::Style => "style",
            CommitCategory::Chore => "chore",
            CommitCategory::General => "general",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CommitCategory::Feature => "✨",
            CommitCategory::Fix => "🐛",
            CommitCategory::Docs => "📚",
            CommitCategory::Refactor => "♻️",
            CommitCategory::Test => "🧪",
            CommitCategory::Style => "💄",
            CommitCategory::Chore => "🔧",
            CommitCategory::General => "💻",
        }
    }

    /// Hashtag and mention block appended to template posts.
    pub fn hashtags(&self) -> &'static str {
        match self {
            CommitCategory::Feature => {
                "#NewFeature #Development #Coding #GitHub @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::Fix => {
                "#BugFix #Development #Coding #GitHub @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::Docs => {
                "#Documentation #GitHub #OpenSource @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::Refactor => {
                "#Refactoring #CleanCode #Development #GitHub @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::Test => {
                "#Testing #QualityAssurance #Development #GitHub @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::Style => {
                "#CodeStyle #Development #GitHub @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::Chore => {
                "#Maintenance #Development #GitHub @ropats16 @arweaveindia @onlyarweave"
            }
            CommitCategory::General => {
                "#Coding #Development #GitHub #OpenSource @ropats16 @arweaveindia @onlyarweave"
            }
        }
    }
}

impl fmt::Display for CommitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority-ordered rules. Each pattern runs against the lower-cased message
/// and combines a conventional-commit type token (`feat:`, `fix(scope):`, ...)
/// with a plain-language keyword.
///
/// Type tokens match at any word boundary, not only at the start of the
/// message, so priority decides between tokens: `refactor: feat: x` is a
/// feature and `docs: explain the fix: flag` is a fix.
static RULES: LazyLock<Vec<(CommitCategory, Regex)>> = LazyLock::new(|| {
    [
        (CommitCategory::Feature, r"\b(?:feat|feature)[(:]|new feature"),
        (CommitCategory::Fix, r"\bfix[(:]|bug ?fix"),
        (CommitCategory::Docs, r"\bdocs?[(:]|documentation"),
        (CommitCategory::Refactor, r"\brefactor"),
        (CommitCategory::Test, r"\btest"),
        (CommitCategory::Style, r"\bstyle"),
        (CommitCategory::Chore, r"\bchore"),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        let regex = Regex::new(pattern).expect("classifier patterns are valid");
        (category, regex)
    })
    .collect()
});

/// Classifies a commit message.
///
/// ```
/// use pushpost::compose::{classify, CommitCategory};
///
/// assert_eq!(classify("feat: dark mode"), CommitCategory::Feature);
/// assert_eq!(classify("Fix(parser): handle EOF"), CommitCategory::Fix);
/// assert_eq!(classify("bump version"), CommitCategory::General);
/// ```
pub fn classify(message: &str) -> CommitCategory {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(_, regex)| regex.is_match(&lower))
        .map(|(category, _)| *category)
        .unwrap_or(CommitCategory::General)
}
