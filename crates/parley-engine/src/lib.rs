//! parley-engine: Headless core of the parley chat widget
//!
//! This crate provides everything except the screen:
//! - Session identity and durable key-value storage
//! - Message model and sanitized HTML rendering (Markdown, code, sources)
//! - The send lifecycle state machine and the `/chat` HTTP client
//! - Light/dark theme preference and widget configuration

pub mod client;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod render;
pub mod session;
pub mod storage;
pub mod theme;
pub mod transcript;
pub mod widget;

// Re-export commonly used types
pub use client::{ChatClient, ChatRequest, ChatResponse, RequestError, SESSION_HEADER};
pub use config::{ConfigError, WidgetConfig, CONFIG_FILE};
pub use message::{Message, Phase, Role, Step};
pub use orchestrator::{transition, Effect, SendEvent, SendState};
pub use render::{RenderOptions, Renderer};
pub use session::{clear_session_id, generate_session_id, get_or_create_session_id, SESSION_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, STORE_FILE};
pub use theme::{ThemeController, ThemePreference, THEME_KEY};
pub use transcript::{Entry, EntryKind, Transcript};
pub use widget::{ChatWidget, PendingSend, SendOutcome, SENDING_LABEL, SEND_LABEL};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
