use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::History;

/// One completed round: the question shown, the options offered and the
/// zero-based index the user picked
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Choice {
    pub question_text: String,
    pub options: Vec<String>,
    pub selected: usize,
}

impl Choice {
    pub fn new(question_text: impl Into<String>, options: Vec<String>, selected: usize) -> Self {
        Self {
            question_text: question_text.into(),
            options,
            selected,
        }
    }

    /// Label of the selected option, if the index is in range
    pub fn selected_label(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }
}

/// A value in the final ranking
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RankedValue {
    pub name: String,
    pub description: String,
}

/// Ranked values, most important first
pub type RankedValues = Vec<RankedValue>;

/// Reply shape for the next-options prompt
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OptionList {
    pub options: Vec<String>,
}

/// Everything recorded during one run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
    pub choices: History,
    pub final_ranking: Option<RankedValues>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            started_at: Utc::now(),
            choices: History::new(),
            final_ranking: None,
        }
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Clone)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl GeminiRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

// Gemini generateContent response format
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Text of the first candidate's first text part, parts concatenated
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorWrapper {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    pub message: Option<String>,
    pub status: Option<String>,
}
