use std::sync::Arc;

use crate::error::Result;
use crate::extract::parse_options;
use crate::history::encode_history;
use crate::models::Choice;
use crate::prompt::{PromptPayload, PromptRenderer};
use crate::transport::TextGenerator;

/// Asks the model for the next set of options given the choices so far
pub struct OptionsPipeline {
    tx: Arc<dyn TextGenerator>,
    template: String,
    renderer: PromptRenderer,
}

impl OptionsPipeline {
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

    pub async fn generate_options(&self, history: &[Choice]) -> Result<Vec<String>> {
        let prompt = self.render_prompt(history)?;
        tracing::info!("Generating options after {} previous choices", history.len());
        tracing::debug!("Options prompt:\n{}", prompt);

        let reply = self.tx.generate_text(&prompt).await?;
        tracing::debug!("Options reply:\n{}", reply);

        let options = parse_options(&reply)?;
        tracing::info!("Model proposed {} options", options.len());
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValuesFinderError;
    use crate::prompt::PromptTemplates;
    use crate::transport::{MockTextGenerator, StaticTransport};

    fn history() -> Vec<Choice> {
        vec![
            Choice::new(
                "Which feels more important to you right now:",
                vec!["Freedom".to_string(), "Security".to_string()],
                0,
            ),
            Choice::new(
                "Which feels more important to you right now:",
                vec!["Family".to_string(), "Career".to_string()],
                1,
            ),
        ]
    }

    #[tokio::test]
    async fn test_generate_options_fenced_reply() {
        let tx = Arc::new(StaticTransport::replying(
            "```json\n{\"options\": [\"Being creative\", \"Being disciplined\"]}\n```",
        ));
        let pipeline = OptionsPipeline::new(tx.clone(), PromptTemplates::builtin().options);

        let options = pipeline.generate_options(&history()).await.unwrap();
        assert_eq!(options, vec!["Being creative", "Being disciplined"]);

        let prompts = tx.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"Freedom\""));
        assert!(prompts[0].contains("\"Career\""));
        assert!(!prompts[0].contains("\"Security\""));
    }

    #[tokio::test]
    async fn test_prompt_carries_selected_labels_only() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate_text()
            .withf(|prompt| {
                prompt.to_string() == "Chosen: ```json\n[\n  \"Freedom\",\n  \"Career\"\n]\n```"
            })
            .times(1)
            .returning(|_| Ok(r#"{"options": ["Adventure", "Stability"]}"#.to_string()));

        let pipeline = OptionsPipeline::new(Arc::new(mock), "Chosen: {{ Data }}".to_string());
        let options = pipeline.generate_options(&history()).await.unwrap();
        assert_eq!(options, vec!["Adventure", "Stability"]);
    }

    #[tokio::test]
    async fn test_malformed_reply_fails() {
        let tx = Arc::new(StaticTransport::replying("not json at all"));
        let pipeline = OptionsPipeline::new(tx, PromptTemplates::builtin().options);
        assert!(matches!(
            pipeline.generate_options(&history()).await,
            Err(ValuesFinderError::ResponseFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let tx = Arc::new(StaticTransport::failing("network unreachable"));
        let pipeline = OptionsPipeline::new(tx, PromptTemplates::builtin().options);
        assert!(matches!(
            pipeline.generate_options(&history()).await,
            Err(ValuesFinderError::Generation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_history_never_reaches_model() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate_text().times(0);

        let mut broken = history();
        broken[1].selected = 2;
        let pipeline = OptionsPipeline::new(Arc::new(mock), PromptTemplates::builtin().options);
        assert!(matches!(
            pipeline.generate_options(&broken).await,
            Err(ValuesFinderError::InvalidChoice { position: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_template_error_propagates() {
        let tx = Arc::new(StaticTransport::replying(r#"{"options": ["a", "b"]}"#));
        let pipeline = OptionsPipeline::new(tx.clone(), "{{ Data }} {{ Missing }}".to_string());
        assert!(matches!(
            pipeline.generate_options(&history()).await,
            Err(ValuesFinderError::Template(_))
        ));
        assert!(tx.prompts().is_empty());
    }
}
