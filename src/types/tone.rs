//! Per-user tone profile that steers post generation.
//!
//! The profile is a typed record with an explicit default for every field.
//! Incoming settings are validated and normalized once, at the write boundary
//! ([`ToneSettings::normalize`]); readers can rely on a complete profile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Maximum length (in characters) of the free-text `keywords` field.
pub const MAX_KEYWORDS_CHARS: usize = 200;

/// Maximum length (in characters) of every other free-text field.
pub const MAX_FIELD_CHARS: usize = 100;

/// Errors raised while normalizing incoming tone settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToneError {
    #[error("unknown call to action: {0}")]
    UnknownCallToAction(String),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// The closing nudge a post should end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallToAction {
    Engagement,
    Follow,
    Visit,
    Feedback,
    Share,
}

impl CallToAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallToAction::Engagement => "engagement",
            CallToAction::Follow => "follow",
            CallToAction::Visit => "visit",
            CallToAction::Feedback => "feedback",
            CallToAction::Share => "share",
        }
    }

    /// Instruction clause handed to the text generator.
    pub fn clause(&self) -> &'static str {
        match self {
            CallToAction::Engagement => "End with a question that invites replies",
            CallToAction::Follow => "Encourage readers to follow along for more updates",
            CallToAction::Visit => "Invite readers to check out the repository",
            CallToAction::Feedback => "Ask readers what they think of the change",
            CallToAction::Share => "Encourage readers to share the post with other developers",
        }
    }
}

impl fmt::Display for CallToAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallToAction {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engagement" => Ok(CallToAction::Engagement),
            "follow" => Ok(CallToAction::Follow),
            "visit" => Ok(CallToAction::Visit),
            "feedback" => Ok(CallToAction::Feedback),
            "share" => Ok(CallToAction::Share),
            _ => Err(ToneError::UnknownCallToAction(s.to_string())),
        }
    }
}

/// Stylistic preferences for one user.
///
/// Serialized in camelCase; this is both the stored JSON shape and the shape
/// returned by `/set_tone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneProfile {
    #[serde(deserialize_with = "string_or_list")]
    pub tone: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub style: Vec<String>,
    pub audience: String,
    pub formality: String,
    pub length: String,
    pub keywords: Option<String>,
    pub brand_voice: String,
    pub emotional_tone: String,
    pub content_type: String,
    pub call_to_action: Option<CallToAction>,
    pub target_engagement: String,
    pub industry: String,
    pub hashtag_style: String,
}

impl Default for ToneProfile {
    fn default() -> Self {
        ToneProfile {
            tone: vec!["professional".to_string()],
            style: vec!["informative".to_string()],
            audience: "developers".to_string(),
            formality: "casual".to_string(),
            length: "medium".to_string(),
            keywords: None,
            brand_voice: "authentic".to_string(),
            emotional_tone: "enthusiastic".to_string(),
            content_type: "update".to_string(),
            call_to_action: None,
            target_engagement: "awareness".to_string(),
            industry: "technology".to_string(),
            hashtag_style: "minimal".to_string(),
        }
    }
}

impl ToneProfile {
    /// Returns a copy with `keywords` cleared.
    ///
    /// Keywords are a one-shot hint: they apply to the next sweep only.
    pub fn without_keywords(&self) -> Self {
        ToneProfile {
            keywords: None,
            ..self.clone()
        }
    }
}

/// Either a single string or a list of strings.
///
/// Older clients send `"tone": "witty"`, newer ones `"tone": ["witty", "bold"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringList::One(s) => vec![s],
            StringList::Many(v) => v,
        }
    }
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    StringList::deserialize(deserializer).map(StringList::into_vec)
}

/// Raw tone settings as submitted to `/set_tone`.
///
/// Every field is optional; anything missing or blank takes the profile default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneSettings {
    pub style: Option<StringList>,
    pub tone: Option<StringList>,
    pub audience: Option<String>,
    pub formality: Option<String>,
    pub length: Option<String>,
    pub keywords: Option<String>,
    pub brand_voice: Option<String>,
    pub emotional_tone: Option<String>,
    pub content_type: Option<String>,
    pub call_to_action: Option<String>,
    pub target_engagement: Option<String>,
    pub industry: Option<String>,
    pub hashtag_style: Option<String>,
}

impl ToneSettings {
    /// Validates the settings and fills in defaults.
    ///
    /// List fields are trimmed, lower-cased and de-duplicated (first occurrence
    /// wins). Blank strings take the default. `keywords` keeps its case.
    pub fn normalize(self) -> Result<ToneProfile, ToneError> {
        let defaults = ToneProfile::default();

        let call_to_action = match self.call_to_action.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("none") => None,
            Some(s) => Some(s.parse()?),
        };

        let keywords = match self.keywords.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(k) if k.chars().count() > MAX_KEYWORDS_CHARS => {
                return Err(ToneError::TooLong {
                    field: "keywords",
                    max: MAX_KEYWORDS_CHARS,
                });
            }
            Some(k) => Some(k.to_string()),
        };

        Ok(ToneProfile {
            tone: normalize_list("tone", self.tone, defaults.tone)?,
            style: normalize_list("style", self.style, defaults.style)?,
            audience: normalize_field("audience", self.audience, defaults.audience)?,
            formality: normalize_field("formality", self.formality, defaults.formality)?,
            length: normalize_field("length", self.length, defaults.length)?,
            keywords,
            brand_voice: normalize_field("brandVoice", self.brand_voice, defaults.brand_voice)?,
            emotional_tone: normalize_field(
                "emotionalTone",
                self.emotional_tone,
                defaults.emotional_tone,
            )?,
            content_type: normalize_field("contentType", self.content_type, defaults.content_type)?,
            call_to_action,
            target_engagement: normalize_field(
                "targetEngagement",
                self.target_engagement,
                defaults.target_engagement,
            )?,
            industry: normalize_field("industry", self.industry, defaults.industry)?,
            hashtag_style: normalize_field(
                "hashtagStyle",
                self.hashtag_style,
                defaults.hashtag_style,
            )?,
        })
    }
}

fn normalize_field(
    field: &'static str,
    value: Option<String>,
    default: String,
) -> Result<String, ToneError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return Ok(default);
    }
    if value.chars().count() > MAX_FIELD_CHARS {
        return Err(ToneError::TooLong {
            field,
            max: MAX_FIELD_CHARS,
        });
    }
    Ok(value)
}

fn normalize_list(
    field: &'static str,
    value: Option<StringList>,
    default: Vec<String>,
) -> Result<Vec<String>, ToneError> {
    let Some(value) = value else {
        return Ok(default);
    };

    let mut out: Vec<String> = Vec::new();
    for item in value.into_vec() {
        let item = item.trim().to_lowercase();
        if item.is_empty() || out.contains(&item) {
            continue;
        }
        if item.chars().count() > MAX_FIELD_CHARS {
            return Err(ToneError::TooLong {
                field,
                max: MAX_FIELD_CHARS,
            });
        }
        out.push(item);
    }

    if out.is_empty() { Ok(default) } else { Ok(out) }
}
