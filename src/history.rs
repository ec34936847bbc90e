use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuesFinderError};
use crate::models::Choice;

/// Append-only record of the rounds played so far, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    choices: Vec<Choice>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, choice: Choice) {
        self.choices.push(choice);
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Labels the user picked in each round, in history order.
///
/// Fails on the first choice whose `selected` index is out of range.
pub fn selected_labels(history: &[Choice]) -> Result<Vec<String>> {
    history
        .iter()
        .enumerate()
        .map(|(position, choice)| {
            choice
                .selected_label()
                .map(str::to_string)
                .ok_or(ValuesFinderError::InvalidChoice {
                    position,
                    selected: choice.selected,
                    options: choice.options.len(),
                })
        })
        .collect()
}

/// Wrap values as an indented JSON array inside a ```json fence
pub fn format_as_json_block(values: &[String]) -> Result<String> {
    let data = serde_json::to_string_pretty(values)?;
    Ok(format!("```json\n{data}\n```"))
}

/// Build the `Data` payload for the prompt templates
pub fn encode_history(history: &[Choice]) -> Result<String> {
    let labels = selected_labels(history)?;
    format_as_json_block(&labels)
}
