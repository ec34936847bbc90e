use std::sync::Arc;

use crate::error::Result;
use crate::extract::parse_ranked_values;
use crate::history::encode_history;
use crate::models::{Choice, RankedValues};
use crate::prompt::{PromptPayload, PromptRenderer};
use crate::transport::TextGenerator;

/// Turns the full choice history into a ranked list of values
pub struct RankingPipeline {
    tx: Arc<dyn TextGenerator>,
    template: String,
    renderer: PromptRenderer,
}

impl RankingPipeline {
    pub fn new(tx: Arc<dyn TextGenerator>, template: String) -> Self {
        Self {
            tx,
            template,
            renderer: PromptRenderer::new(),
        }
    }

    pub fn render_prompt(&self, history: &[Choice]) -> Result<String> {
        let payload = PromptPayload::new(encode_history(history)?);
        self.renderer.render(&self.template, &payload)
    }

    pub async fn generate_final_values(&self, history: &[Choice]) -> Result<RankedValues> {
        let prompt = self.render_prompt(history)?;
        tracing::info!("Ranking values from {} choices", history.len());
        tracing::debug!("Ranking prompt:\n{}", prompt);

        let reply = self.tx.generate_text(&prompt).await?;
        tracing::debug!("Ranking reply:\n{}", reply);

        let values = parse_ranked_values(&reply)?;
        tracing::info!("Model ranked {} values", values.len());
        Ok(values)
    }
}
