//! Backend-to-UI events and error modeling for the desktop GUI.

use client_core::Outcome;

pub enum UiEvent {
    Info(String),
    Outcome(Outcome),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Configuration,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    General,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Configuration => "Configuration",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid server url")
            || message_lower.contains("invalid value")
            || message_lower.contains("settings file")
        {
            UiErrorCategory::Configuration
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
            || message_lower.contains("http client")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_line(&self) -> String {
        format!("{} error: {}", err_label(self.category), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_worker_disconnect_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "Backend worker disconnected; restart the application",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(err.status_line().starts_with("Transport error: "));
    }

    #[test]
    fn classifies_bad_server_url_as_configuration() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "invalid server url 'localhost:3000': relative URL without a base",
        );
        assert_eq!(err.category(), UiErrorCategory::Configuration);
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }

    #[test]
    fn falls_back_to_unknown() {
        let err = UiError::from_message(UiErrorContext::General, "something odd");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert_eq!(err.message(), "something odd");
    }
}
