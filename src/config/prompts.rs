//! Prompt template and persona loading
//!
//! A prompt is a system instruction, followed by the conversation so far,
//! followed by the new user input. The system instruction comes from the
//! built-in persona unless a persona file overrides it.
//!
//! # Example Persona File
//!
//! ```toml
//! [persona]
//! name = "Travel Planner"
//! description = "Helps plan trips"
//!
//! [system_prompt]
//! content = """
//! You are a friendly travel planner...
//! """
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::conversation::Message;

/// A persona/prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Persona metadata
    pub persona: PersonaInfo,

    /// The system prompt
    pub system_prompt: SystemPrompt,
}

/// Persona metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInfo {
    /// Display name of the persona
    pub name: String,

    /// Brief description
    #[serde(default)]
    pub description: String,
}

/// System prompt content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPrompt {
    pub content: String,
}

/// A prompt ready to hand to a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    /// History followed by the new user turn
    pub turns: Vec<Message>,
}

impl PromptTemplate {
    /// Load a template from a TOML file
    pub async fn load_from_file(path: &Path) -> Result<Self, PromptError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PromptError::IoError(e.to_string()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, PromptError> {
        toml::from_str(content).map_err(|e| PromptError::ParseError(e.to_string()))
    }

    /// Fill the history placeholder and append the new input
    pub fn render(&self, history: &[Message], input: &str) -> RenderedPrompt {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.extend_from_slice(history);
        turns.push(Message::user(input));

        RenderedPrompt {
            system: self.system_prompt.content.trim().to_string(),
            turns,
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            persona: PersonaInfo {
                name: builtin::NAME.to_string(),
                description: String::new(),
            },
            system_prompt: SystemPrompt {
                content: builtin::DEFAULT.to_string(),
            },
        }
    }
}

/// Errors from prompt loading
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Built-in persona that doesn't require a file
pub mod builtin {
    pub const NAME: &str = "Gemi";

    pub const DEFAULT: &str = "You are a helpful, friendly AI assistant named Gemi.";
}
