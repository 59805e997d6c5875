//! Conversation session state
//!
//! A `Session` owns the append-only history, the draft, and the `pending`
//! flag. It performs no I/O: `begin_exchange` hands back the payload to send,
//! and `finish_exchange` records whatever came back. `ChatController` drives
//! both around a spawned request.

use crate::client::ExchangeError;
use crate::draft::Draft;
use crate::state::ChatMessage;

/// Seeded assistant turn shown when the room opens.
pub const DEFAULT_GREETING: &str = "おめでとうございます。\n昨日あっためでたいことを無理やり1つ教えてください！\n\nあと、差支えない範囲で最近のあなたの脳内教えてください。";

/// Assistant turn substituted whenever a real reply cannot be obtained.
pub const FALLBACK_REPLY: &str =
    "あー、ちょっと通信がうまくいかなかったっすね。もう一回言ってもらえます？";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    history: Vec<ChatMessage>,
    draft: Draft,
    pending: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            history: vec![ChatMessage::assistant(greeting)],
            draft: Draft::default(),
            pending: false,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Mutable access for the input widget. History stays out of reach.
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft.set(text);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether the send affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.pending && !self.draft.is_blank()
    }

    /// Accept `text` as the next user turn.
    ///
    /// Returns the outbound payload, or `None` when the submission is ignored
    /// (blank text or an exchange already in flight). On acceptance the user
    /// turn is appended, the draft cleared and `pending` set, in that order.
    pub(crate) fn begin_exchange(&mut self, text: &str) -> Option<Vec<ChatMessage>> {
        if text.trim().is_empty() || self.pending {
            return None;
        }

        let user_message = ChatMessage::user(text);
        let payload = outbound_messages(&self.history, &user_message);

        self.history.push(user_message);
        self.draft.clear();
        self.pending = true;

        Some(payload)
    }

    /// Record the outcome of the outstanding exchange and release `pending`.
    ///
    /// Returns the appended assistant turn, or `None` if nothing was pending.
    pub(crate) fn finish_exchange(
        &mut self,
        outcome: Result<String, ExchangeError>,
    ) -> Option<&ChatMessage> {
        if !self.pending {
            tracing::debug!("ignoring exchange outcome with nothing pending");
            return None;
        }

        let reply = match outcome {
            Ok(text) => {
                tracing::info!(chars = text.chars().count(), "assistant reply received");
                ChatMessage::assistant(text)
            }
            Err(err) => {
                tracing::warn!(error = %err, "exchange failed, using fallback reply");
                ChatMessage::assistant(FALLBACK_REPLY)
            }
        };

        self.history.push(reply);
        self.pending = false;
        self.history.last()
    }
}

/// Messages to send for a new user turn.
///
/// Drops an assistant turn sitting at index 0 of `prior` (the greeting),
/// keeps every other turn in order, then appends `user_message`. The check is
/// positional; history is append-only, so only the seed can ever match.
pub fn outbound_messages(prior: &[ChatMessage], user_message: &ChatMessage) -> Vec<ChatMessage> {
    prior
        .iter()
        .enumerate()
        .filter(|(i, m)| !(m.is_assistant() && *i == 0))
        .map(|(_, m)| m.clone())
        .chain(std::iter::once(user_message.clone()))
        .collect()
}
