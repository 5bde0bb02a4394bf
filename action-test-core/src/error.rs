//! Harness failures and run progress

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Result delivered to the completion callback.
///
/// `Ok(())` means every expected mutation and action was seen in order.
pub type Outcome = Result<(), HarnessError>;

/// Which instrumented callback an event came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `commit`
    Mutation,
    /// `dispatch`
    Action,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Mutation => f.write_str("mutation"),
            Channel::Action => f.write_str("action"),
        }
    }
}

/// How far a run got through its expectations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub mutations: usize,
    pub expected_mutations: usize,
    pub actions: usize,
    pub expected_actions: usize,
}

impl Progress {
    /// True once both counters have reached their targets.
    pub fn is_satisfied(&self) -> bool {
        self.mutations >= self.expected_mutations && self.actions >= self.expected_actions
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mutations {}/{}, actions {}/{}",
            self.mutations, self.expected_mutations, self.actions, self.expected_actions
        )
    }
}

/// Why a harness run failed.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{channel} #{index}: expected type {expected:?}, got {actual:?}")]
    TypeMismatch {
        channel: Channel,
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("{channel} #{index} ({kind}): expected payload {expected}, got {actual}")]
    PayloadMismatch {
        channel: Channel,
        index: usize,
        kind: String,
        expected: Value,
        actual: Value,
    },

    #[error("unexpected {channel} {kind:?}: only {expected} expected")]
    Overrun {
        channel: Channel,
        kind: String,
        expected: usize,
    },

    #[error("{channel} {kind:?}: payload could not be serialized: {source}")]
    InvalidPayload {
        channel: Channel,
        kind: String,
        source: serde_json::Error,
    },

    #[error("action returned before all expectations were met ({progress})")]
    Incomplete { progress: Progress },

    #[error("no completion after {elapsed:?} ({progress})")]
    TimedOut {
        elapsed: Duration,
        progress: Progress,
    },

    #[error("invalid test options: {0}")]
    Options(#[source] serde_json::Error),
}

impl HarnessError {
    /// The channel the failing event came through, if the failure came from one.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            HarnessError::TypeMismatch { channel, .. }
            | HarnessError::PayloadMismatch { channel, .. }
            | HarnessError::Overrun { channel, .. }
            | HarnessError::InvalidPayload { channel, .. } => Some(*channel),
            HarnessError::Incomplete { .. }
            | HarnessError::TimedOut { .. }
            | HarnessError::Options(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_mismatch_message_names_both_types() {
        let err = HarnessError::TypeMismatch {
            channel: Channel::Mutation,
            index: 0,
            expected: "SET_Y".into(),
            actual: "SET_X".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"mutation #0: expected type "SET_Y", got "SET_X""#
        );
        assert_eq!(err.channel(), Some(Channel::Mutation));
    }

    #[test]
    fn test_payload_mismatch_message() {
        let err = HarnessError::PayloadMismatch {
            channel: Channel::Action,
            index: 2,
            kind: "load".into(),
            expected: json!({ "id": 1 }),
            actual: json!({ "id": 2 }),
        };
        assert_eq!(
            err.to_string(),
            r#"action #2 (load): expected payload {"id":1}, got {"id":2}"#
        );
    }

    #[test]
    fn test_progress() {
        let mut progress = Progress {
            mutations: 1,
            expected_mutations: 2,
            actions: 0,
            expected_actions: 0,
        };
        assert!(!progress.is_satisfied());
        assert_eq!(progress.to_string(), "mutations 1/2, actions 0/0");

        progress.mutations = 2;
        assert!(progress.is_satisfied());
        assert!(Progress::default().is_satisfied());
    }

    #[test]
    fn test_options_error_has_no_channel() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let err = HarnessError::Options(source);
        assert!(err.channel().is_none());
        assert!(err.to_string().starts_with("invalid test options"));
    }
}
