//! Prompt templates for Contrail.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub enhancer: EnhancerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for retrieval-augmented answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System message for answer generation.
    pub system: String,
    /// User message when context was retrieved. Variables: `question`, `context`.
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about airline passenger experiences using reviews written by travellers.

Guidelines:
- Ground your answer in the provided reviews
- Mention the airline, seat type or route when they matter to the answer
- If the reviews disagree, say so and summarize both sides
- Be concise"#
                .to_string(),

            user: r#"Context information is below.

---------------------
{{context}}
---------------------

Given the context information and no prior knowledge, answer the query.

Follow these rules:

1. If the answer is not in the context, just say that you don't know.
2. Avoid statements like "Based on the context..." or "The provided information...".

Query: {{question}}

Answer:"#
                .to_string(),
        }
    }
}

/// Prompt for smart-mode query rewriting and filter extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerPrompts {
    /// User message. Variables: `query`.
    pub user: String,
}

impl Default for EnhancerPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are a search query optimizer for a database of airline passenger reviews.

Analyze the user's query and:
1. Rewrite it as a clear, specific search query that captures what the user wants to read about.
2. Extract any metadata filters the user mentions.

Available filters:
- Airline: the airline's name as written in reviews (e.g. "Delta Air Lines", "Singapore Airlines")
- Minimum rating: overall rating from 1 to 10
- Seat type: one of "Economy Class", "Premium Economy", "Business Class", "First Class"

User query: {{query}}

Respond with exactly these four lines, in this order, and nothing else.
Use NONE for any filter the query does not mention.
ENHANCED: <rewritten search query>
AIRLINE: <airline name or NONE>
MIN_RATING: <number or NONE>
SEAT_TYPE: <seat type or NONE>"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let enhancer_path = custom_path.join("enhancer.toml");
            if enhancer_path.exists() {
                let content = std::fs::read_to_string(&enhancer_path)?;
                prompts.enhancer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
