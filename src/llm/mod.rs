//! Chat model access.
//!
//! The enhancer, the RAG engine and the `ping` command all talk to a model
//! through [`ChatModel`], so tests can substitute a scripted model.

mod openai;

pub use openai::OpenAIChat;

use crate::error::Result;
use async_trait::async_trait;

/// A chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send an optional system message and a user message, returning the reply text.
    async fn call(&self, system: Option<&str>, user: &str) -> Result<String>;

    /// Model identifier, for display.
    fn name(&self) -> &str;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ChatModel;
    use crate::error::{ContrailError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a fixed reply (or failure) and records every prompt it was given.
    pub struct ScriptedChat {
        reply: Option<String>,
        pub calls: Mutex<Vec<(Option<String>, String)>>,
    }

    impl ScriptedChat {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn last_user_prompt(&self) -> Option<String> {
            self.calls.lock().unwrap().last().map(|(_, user)| user.clone())
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedChat {
        async fn call(&self, system: Option<&str>, user: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.map(str::to_string), user.to_string()));
            self.reply
                .clone()
                .ok_or_else(|| ContrailError::Model("model unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }
}
