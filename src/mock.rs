use async_trait::async_trait;

use crate::ValuesClient;
use crate::error::{Result, ValuesFinderError};
use crate::models::{Choice, RankedValue, RankedValues};

/// Hardcoded client for running the console loop without a model
#[derive(Debug, Clone, Default)]
pub struct MockValuesClient {
    pub should_fail: bool,
}

impl MockValuesClient {
    pub fn failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl ValuesClient for MockValuesClient {
    async fn generate_options(&self, _history: &[Choice]) -> Result<Vec<String>> {
        if self.should_fail {
            return Err(ValuesFinderError::Generation(
                "mock error: failed to generate options".to_string(),
            ));
        }
        Ok(vec![
            "Being creative".to_string(),
            "Being disciplined".to_string(),
        ])
    }

    async fn generate_final_values(&self, _history: &[Choice]) -> Result<RankedValues> {
        if self.should_fail {
            return Err(ValuesFinderError::Generation(
                "mock error: failed to generate final values".to_string(),
            ));
        }
        Ok(vec![
            RankedValue {
                name: "Creativity".to_string(),
                description: "You value expressing yourself and thinking outside the box. It's a core part of who you are.".to_string(),
            },
            RankedValue {
                name: "Discipline".to_string(),
                description: "You appreciate structure and the power of consistency to achieve long-term goals.".to_string(),
            },
            RankedValue {
                name: "Growth".to_string(),
                description: "You believe in continuous learning and personal development as a path to fulfillment.".to_string(),
            },
        ])
    }
}
