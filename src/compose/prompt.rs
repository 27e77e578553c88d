//! Instruction prompts for the text generator.
//!
//! Character budgets in the prompts are requests, not guarantees; the composer
//! clamps whatever comes back.

use std::fmt::Write;

use crate::types::ToneProfile;

use super::fallback::CommitSummary;

/// Length requested for single-commit posts.
pub const SINGLE_PROMPT_BUDGET: usize = 240;

/// Length requested for batch posts.
pub const BATCH_PROMPT_BUDGET: usize = 230;

/// Line every single-commit post must end with.
pub const SIGNATURE_LINE: &str = "- powered by Tweeti\n#Coding #GitHub @arweaveIndia";

/// Builds the prompt for a post about one commit.
pub fn single_commit_prompt(summary: &CommitSummary) -> String {
    format!(
        r#"You write high-performing developer posts for X (Twitter).

Write ONE post about the commit below.

RULES
- Under {budget} characters
- Sound like a human developer, punchy and a little witty
- Use strong verbs: shipped, crushed, crafted, upgraded, unleashed
- Use emojis to separate sections
- List the technical highlights as short checkmark lines
- End with exactly these two lines:
{signature}

COMMIT
Project: {repository}
Message: "{message}"
Author: {author}
Type: {category}
Changes: {files} files, +{additions}/-{deletions} lines

EXAMPLE OF THE STYLE
📦 Refactored: the dashboard was a monster.
Split it into clean, modular components.

✅ 20% faster load
✅ Much easier to maintain
✅ Dev sanity restored

Next up: reusable analytics blocks.

Reply with the post text only."#,
        budget = SINGLE_PROMPT_BUDGET,
        signature = SIGNATURE_LINE,
        repository = summary.repository,
        message = summary.message.trim(),
        author = summary.author,
        category = summary.category,
        files = summary.changed_files,
        additions = summary.additions,
        deletions = summary.deletions,
    )
}

/// Expands a tone profile into instruction clauses, in a stable order.
pub fn tone_clauses(tone: &ToneProfile) -> Vec<String> {
    let mut clauses = vec![
        format!("Tone: {}", tone.tone.join(", ")),
        format!("Style: {}", tone.style.join(", ")),
        format!("Audience: {}", tone.audience),
        format!("Formality: {}", tone.formality),
        format!("Brand voice: {}, feeling {}", tone.brand_voice, tone.emotional_tone),
        format!("Hashtags: {}", tone.hashtag_style),
    ];

    if let Some(keywords) = tone.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
        clauses.push(format!("Work in these keywords naturally: {}", keywords.trim()));
    }
    if let Some(cta) = tone.call_to_action {
        clauses.push(cta.clause().to_string());
    }

    clauses
}

/// Builds the prompt for one post summarizing several commits (oldest first).
pub fn batch_prompt(messages: &[String], tone: &ToneProfile) -> String {
    let mut commits = String::new();
    for (i, message) in messages.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(commits, "{}. {}", i + 1, message.trim());
    }

    let mut voice = String::new();
    for clause in tone_clauses(tone) {
        let _ = writeln!(voice, "- {}", clause);
    }

    format!(
        r#"You are a developer sharing progress on X (Twitter).

Summarize the recent commits below into ONE post.

VOICE
{voice}
RULES
- Under {budget} characters
- Focus on what changed and why it matters, not on commit counts
- No more than three hashtags
- Reply with the post text only

RECENT COMMITS (oldest first)
{commits}
EXAMPLES
🚀 Auth flow got a glow-up: passwordless login is live and sessions survive restarts. Fewer clicks, happier users. #BuildInPublic

🐛 Squashed the bug that ate uploads over 10MB, then added tests so it stays squashed. Ship it. #DevLife

📚 New docs for the plugin API, with real examples this time. What should we document next?"#,
        voice = voice,
        budget = BATCH_PROMPT_BUDGET,
        commits = commits,
    )
}
