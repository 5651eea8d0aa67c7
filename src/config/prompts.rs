//! Prompt templates for Svar.

use serde::{Deserialize, Serialize};

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub chat: ChatPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for RAG response generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about a single source document or video transcript.

Guidelines:
- Answer questions using only the provided excerpts
- If the excerpts don't contain relevant information, say so clearly
- Be concise but thorough in your responses
- When multiple excerpts are relevant, synthesize information across them"#
                .to_string(),

            user: r#"Question: {{question}}

Relevant excerpts from the source:

{{context}}

Please answer the question based on the above excerpts."#
                .to_string(),
        }
    }
}

/// Prompts for direct chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant. Answer the user's question directly and concisely."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load the default prompts with optional custom variables from config.
    pub fn load(
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.system.is_empty());
        assert!(!prompts.chat.system.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Question: {{question}}\n\n{{context}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("question".to_string(), "Why?".to_string());
        vars.insert("context".to_string(), "Because.".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Question: Why?\n\nBecause.");
    }
}
