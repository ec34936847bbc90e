pub mod config;
pub mod error;
pub mod extract;
pub mod history;
pub mod mock;
pub mod models;
pub mod options;
pub mod prompt;
pub mod ranking;
pub mod session;
pub mod transport;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, LlmProvider};
use crate::error::Result;
use crate::mock::MockValuesClient;
use crate::models::{Choice, RankedValues};
use crate::options::OptionsPipeline;
use crate::prompt::PromptTemplates;
use crate::ranking::RankingPipeline;
use crate::transport::{GeminiTransport, TextGenerator};

/// Produces the options for each round and the final ranking
#[async_trait]
pub trait ValuesClient: Send + Sync {
    async fn generate_options(&self, history: &[Choice]) -> Result<Vec<String>>;
    async fn generate_final_values(&self, history: &[Choice]) -> Result<RankedValues>;
}

/// Both pipelines over one shared text generator
pub struct ValuesService {
    options: OptionsPipeline,
    ranking: RankingPipeline,
}

impl ValuesService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(GeminiTransport::new(
            cfg.gemini.api_key.clone(),
            cfg.gemini.model.clone(),
        )?);
        let templates = PromptTemplates::load(&cfg.prompts)?;
        tracing::info!("Using Gemini model {}", cfg.gemini.model);
        Ok(Self::with_transport(transport, templates))
    }

    pub fn with_transport(tx: Arc<dyn TextGenerator>, templates: PromptTemplates) -> Self {
        Self {
            options: OptionsPipeline::new(Arc::clone(&tx), templates.options),
            ranking: RankingPipeline::new(tx, templates.rank),
        }
    }
}

#[async_trait]
impl ValuesClient for ValuesService {
    async fn generate_options(&self, history: &[Choice]) -> Result<Vec<String>> {
        self.options.generate_options(history).await
    }

    async fn generate_final_values(&self, history: &[Choice]) -> Result<RankedValues> {
        self.ranking.generate_final_values(history).await
    }
}

/// Build the client selected by `llm.provider`
pub fn client_from_config(cfg: &Config) -> Result<Box<dyn ValuesClient>> {
    match cfg.llm.provider {
        LlmProvider::Gemini => Ok(Box::new(ValuesService::new(cfg)?)),
        LlmProvider::Mock => {
            tracing::warn!("Using the mock values client; no model will be called");
            Ok(Box::new(MockValuesClient::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValuesFinderError;
    use crate::transport::StaticTransport;

    #[tokio::test]
    async fn test_service_shares_one_transport() {
        let tx = Arc::new(StaticTransport::replying("not json at all"));
        let service = ValuesService::with_transport(tx.clone(), PromptTemplates::builtin());
        let history = vec![Choice::new(
            "Which feels more important to you right now:",
            vec!["Honesty".to_string(), "Kindness".to_string()],
            1,
        )];

        assert!(matches!(
            service.generate_options(&history).await,
            Err(ValuesFinderError::ResponseFormat { .. })
        ));
        assert!(matches!(
            service.generate_final_values(&history).await,
            Err(ValuesFinderError::ResponseFormat { .. })
        ));
        assert_eq!(tx.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_client_from_config_mock() {
        let mut cfg = Config::default();
        cfg.llm.provider = LlmProvider::Mock;
        let client = client_from_config(&cfg).unwrap();
        let options = client.generate_options(&[]).await.unwrap();
        assert_eq!(options, vec!["Being creative", "Being disciplined"]);
    }

    #[test]
    fn test_client_from_config_gemini_requires_key() {
        let cfg = Config::default();
        assert!(matches!(
            client_from_config(&cfg),
            Err(ValuesFinderError::Config(_))
        ));

        let mut cfg = Config::default();
        cfg.gemini.api_key = "test-key".to_string();
        assert!(client_from_config(&cfg).is_ok());
    }
}
