//! Deterministic template posts, used when text generation fails.
//!
//! Lengths are counted in characters (Unicode scalar values) and truncation
//! never splits a character.

use rand::Rng;

use super::classify::CommitCategory;

/// Hard cap for any post handed to the publisher.
pub const MAX_POST_CHARS: usize = 280;

/// Hard cap for batch template posts.
pub const MAX_BATCH_CHARS: usize = 240;

/// Commit messages longer than this are shortened in single-commit posts.
const SINGLE_MESSAGE_CHARS: usize = 100;

/// Latest-message cap in batch posts.
const BATCH_MESSAGE_CHARS: usize = 80;

const ELLIPSIS: &str = "...";

/// Batch templates. `{latest}` is the newest message, `{more}` the
/// "and N more" clause (empty when there is a single commit).
const BATCH_TEMPLATES: [&str; 4] = [
    "🚀 Just shipped: \"{latest}\"{more}\n\nBuilding in public, one commit at a time. #BuildInPublic #DevLife",
    "⚡ Fresh commits landed! Latest: \"{latest}\"{more}\n\nKeep shipping. #Coding #GitHub",
    "🛠️ Progress update: \"{latest}\"{more}\n\nSmall steps, steady gains. #100DaysOfCode #OpenSource",
    "✨ Another push in the books: \"{latest}\"{more}\n\n#Developer #GitHub #Coding",
];

const EMPTY_BATCH_POST: &str = "🚀 Busy day at the keyboard. More updates soon! #Coding #GitHub";

/// Everything the single-commit template needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub repository: String,
    pub message: String,
    pub author: String,
    pub category: CommitCategory,
    pub changed_files: usize,
    pub additions: u64,
    pub deletions: u64,
}

/// Shortens `text` to `max` characters, replacing the tail with `...` when cut.
///
/// Text of at most `max` characters is returned unchanged.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Template post for one commit.
///
/// ```text
/// 🐛 Just pushed to my-repo!
///
/// "fix: null pointer"
///
/// 📊 3 files, +10/-2 lines
///
/// #BugFix #Development ...
/// ```
pub fn fallback_single(summary: &CommitSummary) -> String {
    let message = truncate_with_ellipsis(summary.message.trim(), SINGLE_MESSAGE_CHARS);

    let post = format!(
        "{emoji} Just pushed to {repo}!\n\n\"{message}\"\n\n📊 {files} files, +{adds}/-{dels} lines\n\n{tags}",
        emoji = summary.category.emoji(),
        repo = summary.repository,
        files = summary.changed_files,
        adds = summary.additions,
        dels = summary.deletions,
        tags = summary.category.hashtags(),
    );

    truncate_with_ellipsis(&post, MAX_POST_CHARS)
}

/// Template post summarizing a batch of queued commits (oldest first).
///
/// The template is picked with `rng`; pass a seeded generator for
/// reproducible output.
pub fn fallback_batch<R: Rng>(messages: &[String], rng: &mut R) -> String {
    let Some(latest) = messages.last() else {
        return EMPTY_BATCH_POST.to_string();
    };

    let latest = truncate_with_ellipsis(latest.trim(), BATCH_MESSAGE_CHARS);
    let more = match messages.len() - 1 {
        0 => String::new(),
        1 => " and 1 more commit".to_string(),
        n => format!(" and {} more commits", n),
    };

    let template = BATCH_TEMPLATES[rng.gen_range(0..BATCH_TEMPLATES.len())];
    // {latest} goes in last so braces inside a commit message are left alone.
    let post = template
        .replace("{more}", &more)
        .replace("{latest}", &latest);

    truncate_with_ellipsis(&post, MAX_BATCH_CHARS)
}
