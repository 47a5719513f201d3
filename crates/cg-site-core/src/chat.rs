//! Rule-based chat assistant for signed-in visitors.

use cg_api_types::{ChatMessage, ChatSender};
use cg_backend::Backend;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEffect {
    None,
    EasterEgg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub effect: ChatEffect,
}

type Predicate = fn(&str) -> bool;
type Response = fn(&str) -> String;

struct Rule {
    matches: Predicate,
    respond: Response,
    effect: ChatEffect,
}

const FALLBACK_REPLY: &str = "I'm not sure about that. But I'm just a cat, not a supercomputer! 😸";

// Checked in order against the lowercased input; the first hit answers.
const RULES: &[Rule] = &[
    Rule {
        matches: |text| text.contains("hello") || text.contains("hi"),
        respond: |username| format!("Meow, {username}! How can I assist your cyber‑operations today?"),
        effect: ChatEffect::None,
    },
    Rule {
        matches: |text| text.contains("product") || text.contains("asset"),
        respond: |_| "We have many digital assets. You can browse them in the Database section.".to_owned(),
        effect: ChatEffect::None,
    },
    Rule {
        matches: |text| text.contains("price") || text.contains("cost"),
        respond: |_| "Prices vary. Check the product details in the store.".to_owned(),
        effect: ChatEffect::None,
    },
    Rule {
        matches: |text| text.contains("who are you"),
        respond: |_| "I am your holographic cat assistant, embedded in the Cyber‑Grid.".to_owned(),
        effect: ChatEffect::None,
    },
    Rule {
        matches: |text| text.contains("easter egg") || text.contains("secret"),
        respond: |_| "You found me! Try the Konami code for a surprise.".to_owned(),
        effect: ChatEffect::EasterEgg,
    },
];

/// Pick the reply for `input`, addressing the visitor as `username`.
pub fn reply_for(input: &str, username: &str) -> BotReply {
    let lower = input.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| BotReply {
            text: (rule.respond)(username),
            effect: rule.effect,
        })
        .unwrap_or_else(|| BotReply {
            text: FALLBACK_REPLY.to_owned(),
            effect: ChatEffect::None,
        })
}

/// Transcript plus persistence. Failed backend calls are logged and the
/// conversation carries on locally.
#[derive(Clone)]
pub struct ChatAssistant {
    backend: Rc<dyn Backend>,
    session: SessionManager,
    transcript: Rc<RefCell<Vec<ChatMessage>>>,
}

impl ChatAssistant {
    pub fn new(backend: Rc<dyn Backend>, session: SessionManager) -> Self {
        Self {
            backend,
            session,
            transcript: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.borrow().clone()
    }

    /// Replace the transcript with the signed-in visitor's stored history.
    pub async fn load_history(&self) -> Vec<ChatMessage> {
        let Some(session) = self.session.current() else {
            self.transcript.borrow_mut().clear();
            return Vec::new();
        };
        match self.backend.chat_history(&session.token, &session.user.id).await {
            Ok(history) => {
                debug!(target: "cg::chat", messages = history.len(), "chat history loaded");
                *self.transcript.borrow_mut() = history.clone();
                history
            }
            Err(err) => {
                warn!(target: "cg::chat", "chat history unavailable: {}", err);
                self.transcript()
            }
        }
    }

    /// Turn raw input into a user message. Blank input yields nothing.
    pub fn accept(&self, raw: &str) -> Option<ChatMessage> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(ChatMessage {
            sender: ChatSender::User,
            message: text.to_owned(),
        })
    }

    pub fn reply_to(&self, text: &str) -> BotReply {
        let username = self
            .session
            .current()
            .map(|s| s.user.username)
            .unwrap_or_default();
        reply_for(text, &username)
    }

    /// Append to the transcript and persist.
    pub async fn record(&self, message: ChatMessage) {
        self.transcript.borrow_mut().push(message.clone());
        let Some(token) = self.session.token() else {
            return;
        };
        if let Err(err) = self.backend.post_chat(&token, &message).await {
            warn!(target: "cg::chat", sender = message.sender.as_str(), "failed to store chat message: {}", err);
        }
    }

    pub fn bot_message(reply: &BotReply) -> ChatMessage {
        ChatMessage {
            sender: ChatSender::Bot,
            message: reply.text.clone(),
        }
    }
}
