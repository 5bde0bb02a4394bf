//! Expected mutation and action entries

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of an expected mutation or action sequence.
///
/// Serializes as `{"type": "...", "payload": ...}` so expectation lists can be
/// kept as JSON fixtures. The payload is optional; when absent, an event that
/// carries a payload is compared against `null`.
///
/// # Example
///
/// ```
/// use action_test_core::Expected;
/// use serde_json::json;
///
/// let plain = Expected::new("RESET");
/// assert_eq!(plain.payload, None);
///
/// let with = Expected::new("SET_COUNT").with_payload(json!(3));
/// assert_eq!(with.to_string(), "SET_COUNT(3)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expected {
    /// Mutation or action type, compared with strict string equality
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload, compared structurally when the event carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Expected {
    /// Create an expectation without a payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Attach the expected payload.
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// The payload an event is compared against.
    pub(crate) fn payload_or_null(&self) -> &Value {
        self.payload.as_ref().unwrap_or(&Value::Null)
    }
}

impl From<&str> for Expected {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for Expected {
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "{}({})", self.kind, payload),
            None => f.write_str(&self.kind),
        }
    }
}

/// Build an expected mutation entry.
///
/// The payload, if any, uses `serde_json::json!` syntax.
///
/// # Example
///
/// ```
/// use action_test_core::mutation;
///
/// let m = mutation!("SET_USER", { "id": 7, "roles": ["admin"] });
/// assert_eq!(m.kind, "SET_USER");
/// assert!(m.payload.is_some());
/// ```
#[macro_export]
macro_rules! mutation {
    ($kind:expr) => {
        $crate::Expected::new($kind)
    };
    ($kind:expr, $($payload:tt)+) => {
        $crate::Expected::new($kind).with_payload($crate::__private::json!($($payload)+))
    };
}

/// Build an expected dispatched-action entry.
///
/// Same syntax as [`mutation!`].
///
/// # Example
///
/// ```
/// use action_test_core::action;
///
/// let a = action!("fetchUser", 7);
/// assert_eq!(a.to_string(), "fetchUser(7)");
/// ```
#[macro_export]
macro_rules! action {
    ($kind:expr) => {
        $crate::Expected::new($kind)
    };
    ($kind:expr, $($payload:tt)+) => {
        $crate::Expected::new($kind).with_payload($crate::__private::json!($($payload)+))
    };
}
