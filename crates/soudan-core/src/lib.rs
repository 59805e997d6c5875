pub mod client;
pub mod config;
pub mod controller;
pub mod draft;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatClient, ChatTransport, ExchangeError};
pub use config::Config;
pub use controller::ChatController;
pub use draft::Draft;
pub use session::{Session, DEFAULT_GREETING, FALLBACK_REPLY};
pub use state::{ChatMessage, ChatRole};
