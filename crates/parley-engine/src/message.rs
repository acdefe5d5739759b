//! Chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user.
    User,
    /// Reply produced by the backend.
    Bot,
}

impl Role {
    /// CSS class distinguishing the two roles.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// Phase of a thinking-log step.
///
/// Unknown status strings from the backend fold into [`Phase::Analyzing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Planning,
    Searching,
    Finalizing,
    #[serde(other)]
    Analyzing,
}

impl Phase {
    /// Capitalized label used in step captions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Searching => "Searching",
            Self::Analyzing => "Analyzing",
            Self::Finalizing => "Finalizing",
        }
    }

    /// Icon shown next to the step.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Planning => "🧠",
            Self::Searching => "🔍",
            Self::Analyzing => "📊",
            Self::Finalizing => "✅",
        }
    }

    /// Lowercase identifier, used for color classes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Searching => "searching",
            Self::Analyzing => "analyzing",
            Self::Finalizing => "finalizing",
        }
    }
}

/// One entry of the thinking log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step number as reported by the backend.
    #[serde(rename = "step")]
    pub number: u32,
    /// Phase of the step.
    #[serde(rename = "status")]
    pub phase: Phase,
    /// Human readable description.
    #[serde(rename = "message")]
    pub description: String,
}

impl Step {
    /// Create a new step.
    pub fn new(number: u32, phase: Phase, description: impl Into<String>) -> Self {
        Self {
            number,
            phase,
            description: description.into(),
        }
    }

    /// Caption in the form `Step N — Phase`.
    pub fn caption(&self) -> String {
        format!("Step {} \u{2014} {}", self.number, self.phase.label())
    }
}

/// A single transcript message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the author.
    pub role: Role,
    /// Message text (Markdown for bot replies).
    pub text: String,
    /// Source URLs, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Intermediate steps, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_log: Vec<Step>,
    /// When the message entered the transcript.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: Vec::new(),
            step_log: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a bot message.
    pub fn bot(text: impl Into<String>, sources: Vec<String>, step_log: Vec<Step>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            sources,
            step_log,
            timestamp: Utc::now(),
        }
    }
}
