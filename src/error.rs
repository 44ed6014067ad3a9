//! Unified error types for the launcher.

use std::fmt;

use crate::types::{PaneState, Strategy};

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// A control-port call failed or returned a non-success status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The multiplexer client process could not be spawned or awaited.
    Spawn { program: String, message: String },
    /// The multiplexer ran but reported failure.
    Command { context: String, details: String },
    /// The port refused the call without running anything.
    Rejected(String),
}

impl TransportError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { program, message } => write!(f, "failed to run {program}: {message}"),
            Self::Command { context, details } => write!(f, "{context}: {details}"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// EscapingError
// ---------------------------------------------------------------------------

/// The payload cannot be represented as one quoted literal argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapingError {
    /// NUL bytes cannot travel inside a process argument.
    NulByte { offset: usize },
    /// The escaped argument is larger than the configured ceiling.
    TooLong { escaped: usize, ceiling: usize },
}

impl fmt::Display for EscapingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NulByte { offset } => write!(f, "payload contains a NUL byte at offset {offset}"),
            Self::TooLong { escaped, ceiling } => write!(
                f,
                "escaped payload is {escaped} bytes, above the {ceiling} byte argument ceiling"
            ),
        }
    }
}

impl std::error::Error for EscapingError {}

// ---------------------------------------------------------------------------
// StrategyError
// ---------------------------------------------------------------------------

/// Why one delivery strategy gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    Transport(TransportError),
    Escaping(EscapingError),
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Escaping(e) => write!(f, "escaping: {e}"),
        }
    }
}

impl std::error::Error for StrategyError {}

impl From<TransportError> for StrategyError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<EscapingError> for StrategyError {
    fn from(e: EscapingError) -> Self {
        Self::Escaping(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration and project records.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ---------------------------------------------------------------------------
// LaunchError
// ---------------------------------------------------------------------------

/// Top-level error type for pane and session launches.
#[derive(Debug)]
pub enum LaunchError {
    Config(ConfigError),
    /// The session could not be (re)created; nothing else can proceed.
    Session(TransportError),
    /// A pane lifecycle step failed at the control port.
    Transport(TransportError),
    /// Every strategy in the delivery plan failed.
    DeliveryExhausted {
        attempts: Vec<(Strategy, StrategyError)>,
    },
    /// A pane was asked to move backwards or skip a lifecycle step.
    InvalidTransition { from: PaneState, to: PaneState },
    /// Two launch specs address the same pane.
    DuplicatePane {
        index: usize,
        first: String,
        second: String,
    },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Session(e) => write!(f, "session: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::DeliveryExhausted { attempts } => {
                write!(f, "delivery failed after {} strategies", attempts.len())?;
                if let Some((strategy, err)) = attempts.last() {
                    write!(f, " (last: {strategy}: {err})")?;
                }
                Ok(())
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "invalid pane transition {from} -> {to}")
            }
            Self::DuplicatePane {
                index,
                first,
                second,
            } => write!(f, "pane {index} is claimed by both {first} and {second}"),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<ConfigError> for LaunchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<TransportError> for LaunchError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let e = TransportError::Command {
            context: "failed to send keys to tmux pane".into(),
            details: "can't find pane: 7".into(),
        };
        assert_eq!(
            e.to_string(),
            "failed to send keys to tmux pane: can't find pane: 7"
        );
        assert_eq!(
            TransportError::rejected("pane 3 offline").to_string(),
            "rejected: pane 3 offline"
        );
    }

    #[test]
    fn escaping_error_display() {
        let e = EscapingError::TooLong {
            escaped: 20_000,
            ceiling: 16_384,
        };
        assert_eq!(
            e.to_string(),
            "escaped payload is 20000 bytes, above the 16384 byte argument ceiling"
        );
    }

    #[test]
    fn strategy_error_wraps_sources() {
        let e = StrategyError::from(EscapingError::NulByte { offset: 4 });
        assert!(e.to_string().starts_with("escaping:"), "got: {e}");
        let e = StrategyError::from(TransportError::rejected("nope"));
        assert!(e.to_string().starts_with("transport:"), "got: {e}");
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn delivery_exhausted_mentions_last_attempt() {
        let e = LaunchError::DeliveryExhausted {
            attempts: vec![
                (
                    Strategy::Atomic,
                    StrategyError::from(TransportError::rejected("first")),
                ),
                (
                    Strategy::Chunked,
                    StrategyError::from(TransportError::rejected("second")),
                ),
            ],
        };
        let text = e.to_string();
        assert!(text.contains("after 2 strategies"), "got: {text}");
        assert!(text.contains("chunked"), "got: {text}");
        assert!(text.contains("second"), "got: {text}");
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let e = LaunchError::InvalidTransition {
            from: PaneState::Confirmed,
            to: PaneState::Cleared,
        };
        assert_eq!(e.to_string(), "invalid pane transition confirmed -> cleared");
    }

    #[test]
    fn duplicate_pane_names_both_labels() {
        let e = LaunchError::DuplicatePane {
            index: 2,
            first: "api".into(),
            second: "docs".into(),
        };
        assert_eq!(e.to_string(), "pane 2 is claimed by both api and docs");
    }
}
