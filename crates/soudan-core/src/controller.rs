//! Conversation session controller
//!
//! Runs at most one exchange at a time on a spawned task. The UI loop calls
//! `poll_exchange` on every event; tests and one-shot callers `settle`.

use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};

use crate::client::{ChatTransport, ExchangeError};
use crate::session::Session;
use crate::state::ChatMessage;

type ExchangeTask = JoinHandle<Result<String, ExchangeError>>;

pub struct ChatController {
    session: Session,
    transport: Arc<dyn ChatTransport>,
    exchange: Option<ExchangeTask>,
}

impl ChatController {
    pub fn new(session: Session, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            session,
            transport,
            exchange: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_pending(&self) -> bool {
        self.session.is_pending()
    }

    /// Submit `text` as a user turn and start the exchange.
    ///
    /// Returns `false` without touching anything when the text is blank or an
    /// exchange is already in flight. Must be called inside a tokio runtime.
    pub fn submit(&mut self, text: &str) -> bool {
        let Some(payload) = self.session.begin_exchange(text) else {
            tracing::debug!(pending = self.session.is_pending(), "submission ignored");
            return false;
        };

        tracing::debug!(messages = payload.len(), "starting exchange");
        let transport = Arc::clone(&self.transport);
        self.exchange = Some(tokio::spawn(async move { transport.exchange(payload).await }));
        true
    }

    /// Submit whatever is in the draft.
    pub fn submit_draft(&mut self) -> bool {
        let text = self.session.draft().text().to_string();
        self.submit(&text)
    }

    /// Apply the exchange outcome if the task has finished, without waiting.
    pub async fn poll_exchange(&mut self) -> Option<&ChatMessage> {
        if !self.exchange.as_ref()?.is_finished() {
            return None;
        }
        self.settle().await
    }

    /// Wait for the outstanding exchange, if any, and apply its outcome.
    pub async fn settle(&mut self) -> Option<&ChatMessage> {
        let task = self.exchange.take()?;
        let joined = task.await;
        self.session.finish_exchange(flatten(joined))
    }
}

fn flatten(joined: Result<Result<String, ExchangeError>, JoinError>) -> Result<String, ExchangeError> {
    match joined {
        Ok(outcome) => outcome,
        Err(err) => Err(ExchangeError::Aborted(err.to_string())),
    }
}
