use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::error::EngineError;
use crate::core::intent::{self, Intent};
use crate::core::message::{ChatTurn, MessageRole};
use crate::core::prompt;
use crate::core::provider::{ChatBackend, ImageBackend};
use crate::core::session::Session;
use crate::render;
use crate::storage::SessionStore;

/// How many recent messages accompany a conversational turn as context.
const CONTEXT_WINDOW: usize = 10;

/// Reply used when the text backend has nothing usable to say.
const FALLBACK_REPLY: &str =
    "I'm not sure what to say to that. Try asking me to draw something!";

/// What a completed turn hands back to the caller.
#[derive(Debug, Clone)]
pub struct TurnResponse {
    pub text: String,
    /// Rendered ASCII art, present when this turn generated or edited a piece.
    pub art: Option<String>,
}

/// The turn orchestrator: owns the session store and both model backends,
/// and drives one user turn from classification through persistence.
/// Backend failures never surface as errors from [`Engine::submit_turn`];
/// they become apologetic reply text so the conversation keeps its shape.
pub struct Engine {
    store: SessionStore,
    chat: Arc<dyn ChatBackend>,
    image: Arc<dyn ImageBackend>,
    columns: u32,
}

impl Engine {
    pub fn new(
        store: SessionStore,
        chat: Arc<dyn ChatBackend>,
        image: Arc<dyn ImageBackend>,
        columns: u32,
    ) -> Self {
        Self {
            store,
            chat,
            image,
            columns,
        }
    }

    /// Run one conversation turn: persist the user message, classify it,
    /// take the matching path, persist the assistant reply, and return both
    /// the reply and any rendered art.
    pub async fn submit_turn(
        &self,
        session_key: &str,
        message: &str,
    ) -> Result<TurnResponse, EngineError> {
        let session_key = session_key.trim();
        let message = message.trim();
        if session_key.is_empty() {
            return Err(EngineError::InvalidInput("session key must not be empty".into()));
        }
        if message.is_empty() {
            return Err(EngineError::InvalidInput("message must not be empty".into()));
        }

        let session = self
            .store
            .append(session_key, MessageRole::User, message)
            .await?;
        let intent = intent::classify(message, session.last_art_prompt.is_some());
        debug!(?intent, key = session_key, "turn classified");

        let (reply, art) = match intent {
            Intent::Conversational => (self.chat_reply(&session).await, None),
            Intent::NewGeneration => {
                let art_prompt = prompt::new_generation_prompt(message);
                self.generate_and_confirm(session_key, &art_prompt, false)
                    .await?
            }
            Intent::EditRequest => {
                // classify only yields EditRequest when a prior prompt exists
                let prior = session.last_art_prompt.clone().unwrap_or_default();
                let art_prompt = self
                    .rewrite_prompt(&prior, message, session.user_name.as_deref())
                    .await;
                self.generate_and_confirm(session_key, &art_prompt, true)
                    .await?
            }
        };

        self.store
            .append(session_key, MessageRole::Assistant, &reply)
            .await?;
        Ok(TurnResponse { text: reply, art })
    }

    /// Sessionless generation: one prompt in, one rendering out. Nothing is
    /// persisted, and failures surface as real errors rather than chat text.
    pub async fn generate_direct(
        &self,
        art_prompt: &str,
        columns: u32,
    ) -> Result<String, EngineError> {
        let art_prompt = art_prompt.trim();
        if art_prompt.is_empty() {
            return Err(EngineError::InvalidInput("prompt must not be empty".into()));
        }
        info!(prompt = art_prompt, columns, "direct generation");
        let bytes = self.image.generate(art_prompt).await?;
        Ok(render::to_text(&bytes, columns)?)
    }

    /// Current session snapshot.
    pub async fn history(&self, session_key: &str) -> Result<Session, EngineError> {
        Ok(self.store.read(session_key).await?)
    }

    /// Append a message without running the turn pipeline. Lets a front end
    /// mirror turns it produced itself.
    pub async fn append_raw(
        &self,
        session_key: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Session, EngineError> {
        Ok(self.store.append(session_key, role, content).await?)
    }

    /// Update session metadata. Only a provided prompt causes a write.
    pub async fn update_metadata(
        &self,
        session_key: &str,
        last_prompt: Option<&str>,
    ) -> Result<(), EngineError> {
        if let Some(art_prompt) = last_prompt {
            self.store.set_last_prompt(session_key, art_prompt).await?;
        }
        Ok(())
    }

    /// Reset the session to an empty one.
    pub async fn clear_session(&self, session_key: &str) -> Result<(), EngineError> {
        Ok(self.store.clear(session_key).await?)
    }

    async fn chat_reply(&self, session: &Session) -> String {
        let mut turns = Vec::with_capacity(CONTEXT_WINDOW + 1);
        turns.push(ChatTurn::system(chat_instruction(
            session.user_name.as_deref(),
        )));
        for msg in session.recent(CONTEXT_WINDOW) {
            turns.push(ChatTurn {
                role: msg.role,
                content: msg.content.clone(),
            });
        }

        let reply = match self.chat.complete(&turns).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat backend failed");
                String::new()
            }
        };
        let reply = reply.trim();
        if reply.is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            reply.to_string()
        }
    }

    async fn rewrite_prompt(
        &self,
        prior: &str,
        request: &str,
        user_name: Option<&str>,
    ) -> String {
        let exchange = prompt::edit_exchange(prior, request, user_name);
        match self.chat.complete(&exchange).await {
            Ok(reply) => match prompt::clean_chat_reply(&reply) {
                Some(rewritten) => rewritten,
                None => prompt::fallback_edit_prompt(prior, request),
            },
            Err(e) => {
                warn!(error = %e, "prompt rewrite failed, using deterministic fallback");
                prompt::fallback_edit_prompt(prior, request)
            }
        }
    }

    async fn generate_and_confirm(
        &self,
        session_key: &str,
        art_prompt: &str,
        edited: bool,
    ) -> Result<(String, Option<String>), EngineError> {
        match self.render_artwork(art_prompt).await {
            Ok(art) => {
                self.store.set_last_prompt(session_key, art_prompt).await?;
                let text = if edited {
                    format!("I've updated the art: \"{art_prompt}\".")
                } else {
                    format!("Here is your ASCII art of \"{art_prompt}\".")
                };
                Ok((text, Some(art)))
            }
            Err(e) => {
                warn!(error = %e, prompt = art_prompt, "artwork generation failed");
                Ok((format!("Sorry, I couldn't create that artwork: {e}"), None))
            }
        }
    }

    async fn render_artwork(&self, art_prompt: &str) -> Result<String, EngineError> {
        info!(prompt = art_prompt, "generating image");
        let bytes = self.image.generate(art_prompt).await?;
        Ok(render::to_text(&bytes, self.columns)?)
    }
}

fn chat_instruction(user_name: Option<&str>) -> String {
    let mut text = String::from(
        "You are a friendly assistant for an ASCII art studio. You chat with the \
         user, and their art requests are handled separately by the studio. Keep \
         replies short and conversational.",
    );
    if let Some(name) = user_name {
        text.push_str(&format!(" The user's name is {name}."));
    }
    text
}
