use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::PromptConfig;
use crate::error::{Result, ValuesFinderError};

const OPTIONS_PROMPT: &str = include_str!("../doc/options_prompt.md");
const RANK_PROMPT: &str = include_str!("../doc/rank_prompt.md");

/// Data substituted into the prompt templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptPayload {
    #[serde(rename = "Data")]
    pub data: String,
}

impl PromptPayload {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

/// Renders Jinja-style templates. Referencing a field the payload doesn't
/// carry is an error rather than an empty string.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }

    /// Fail early on syntax errors
    pub fn check(&self, template: &str) -> Result<()> {
        let env = Environment::new();
        env.template_from_str(template)?;
        Ok(())
    }

    pub fn render<S: Serialize>(&self, template: &str, payload: &S) -> Result<String> {
        Ok(self.env.render_str(template, payload)?)
    }
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// The two named prompts used by the pipelines
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub options: String,
    pub rank: String,
}

impl PromptTemplates {
    /// Templates compiled into the binary
    pub fn builtin() -> Self {
        Self {
            options: OPTIONS_PROMPT.to_string(),
            rank: RANK_PROMPT.to_string(),
        }
    }

    /// Load configured template files, falling back to the built-in ones.
    /// Both templates are syntax checked.
    pub fn load(cfg: &PromptConfig) -> Result<Self> {
        let options = match &cfg.options_template {
            Some(path) => read_template(path)?,
            None => OPTIONS_PROMPT.to_string(),
        };
        let rank = match &cfg.rank_template {
            Some(path) => read_template(path)?,
            None => RANK_PROMPT.to_string(),
        };

        let renderer = PromptRenderer::new();
        renderer.check(&options)?;
        renderer.check(&rank)?;
        Ok(Self { options, rank })
    }
}

fn read_template(path: &Path) -> Result<String> {
    tracing::debug!("Reading prompt template from {}", path.display());
    fs::read_to_string(path).map_err(|e| {
        ValuesFinderError::Config(format!(
            "failed to read prompt template {}: {e}",
            path.display()
        ))
    })
}
